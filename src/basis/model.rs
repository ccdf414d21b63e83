use crate::data::ChannelRange;
use crate::error::{BasisError, LibraryError};
use crate::types::{ChannelVector, SpectraMatrix};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Principal-component description of the background spectra of one detector setup
///
/// Immutable once built. `mean` and every row of `components` span the active channels
/// `ilo..ihi` of the full spectrum, components are orthonormal and ordered by decreasing
/// singular value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "BasisModelRecord", try_from = "BasisModelRecord")]
pub struct BasisModel {
    mean: ChannelVector,
    components: SpectraMatrix,
    singular_values: Array1<f64>,
    range: ChannelRange,
}

impl BasisModel {
    pub fn new(
        mean: ChannelVector,
        components: SpectraMatrix,
        singular_values: Array1<f64>,
        range: ChannelRange,
    ) -> Result<Self, BasisError> {
        if mean.len() != range.len() {
            return Err(BasisError::ShapeMismatch(format!(
                "mean has {} channels, range {}..{} has {}",
                mean.len(),
                range.ilo,
                range.ihi,
                range.len()
            )));
        }
        if components.ncols() != mean.len() {
            return Err(BasisError::ShapeMismatch(format!(
                "components have {} channels, mean has {}",
                components.ncols(),
                mean.len()
            )));
        }
        if components.nrows() != singular_values.len() {
            return Err(BasisError::ShapeMismatch(format!(
                "{} components but {} singular values",
                components.nrows(),
                singular_values.len()
            )));
        }
        if components.nrows() == 0 {
            return Err(BasisError::ZeroComponents);
        }
        Ok(Self {
            mean,
            components,
            singular_values,
            range,
        })
    }

    #[inline]
    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }

    /// Components as rows, ncomponents × nchannels
    #[inline]
    pub fn components(&self) -> ArrayView2<'_, f64> {
        self.components.view()
    }

    #[inline]
    pub fn singular_values(&self) -> ArrayView1<'_, f64> {
        self.singular_values.view()
    }

    #[inline]
    pub fn range(&self) -> ChannelRange {
        self.range
    }

    #[inline]
    pub fn ncomponents(&self) -> usize {
        self.components.nrows()
    }

    #[inline]
    pub fn nchannels(&self) -> usize {
        self.mean.len()
    }

    /// Reads a model stored by [BasisModel::save], validating every invariant
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| LibraryError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LibraryError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|source| LibraryError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// On-disk layout of [BasisModel]
#[derive(Serialize, Deserialize)]
#[serde(rename = "BasisModel")]
struct BasisModelRecord {
    mean: Vec<f64>,
    components: Vec<Vec<f64>>,
    values: Vec<f64>,
    ilo: usize,
    ihi: usize,
}

impl From<BasisModel> for BasisModelRecord {
    fn from(m: BasisModel) -> Self {
        Self {
            mean: m.mean.to_vec(),
            components: m.components.rows().into_iter().map(|r| r.to_vec()).collect(),
            values: m.singular_values.to_vec(),
            ilo: m.range.ilo,
            ihi: m.range.ihi,
        }
    }
}

impl TryFrom<BasisModelRecord> for BasisModel {
    type Error = BasisError;

    fn try_from(r: BasisModelRecord) -> Result<Self, Self::Error> {
        if r.ilo >= r.ihi {
            return Err(BasisError::InvalidRecord(format!(
                "empty channel range {}..{}",
                r.ilo, r.ihi
            )));
        }
        let nchannels = r.mean.len();
        let ncomponents = r.components.len();
        if let Some(row) = r.components.iter().find(|row| row.len() != nchannels) {
            return Err(BasisError::InvalidRecord(format!(
                "component of length {} for {} channels",
                row.len(),
                nchannels
            )));
        }
        let components =
            Array2::from_shape_vec((ncomponents, nchannels), r.components.concat())
                .map_err(|e| BasisError::InvalidRecord(e.to_string()))?;
        Self::new(
            r.mean.into(),
            components,
            r.values.into(),
            ChannelRange::new(r.ilo, r.ihi),
        )
    }
}
