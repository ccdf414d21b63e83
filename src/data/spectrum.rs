use crate::basis::BasisKey;
use crate::error::SpectrumError;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Header fields of a spectral file
///
/// Only `telescope` and `instrument` take part in the fit itself, the scaling keys are carried
/// for the table model export.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpectrumHeader {
    pub telescope: String,
    #[serde(default)]
    pub instrument: Option<String>,
    #[serde(default = "SpectrumHeader::default_scale")]
    pub exposure: f64,
    #[serde(default = "SpectrumHeader::default_scale")]
    pub area_scale: f64,
    #[serde(default = "SpectrumHeader::default_scale")]
    pub back_scale: f64,
}

impl SpectrumHeader {
    pub fn new(telescope: impl Into<String>, instrument: Option<String>) -> Self {
        Self {
            telescope: telescope.into(),
            instrument,
            exposure: Self::default_scale(),
            area_scale: Self::default_scale(),
            back_scale: Self::default_scale(),
        }
    }

    #[inline]
    pub fn default_scale() -> f64 {
        1.0
    }
}

/// Observed counts of one spectrum, one non-negative integer per detector channel
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpectrumSample {
    pub counts: Vec<u64>,
    pub header: SpectrumHeader,
}

impl SpectrumSample {
    pub fn new(counts: Vec<u64>, header: SpectrumHeader) -> Self {
        Self { counts, header }
    }

    #[inline]
    pub fn nchannels(&self) -> usize {
        self.counts.len()
    }

    pub fn key(&self) -> BasisKey {
        BasisKey::new(
            &self.header.telescope,
            self.header.instrument.as_deref(),
            self.nchannels(),
        )
    }

    /// Counts of the channels `ilo..ihi` as reals
    pub fn active_counts(&self, ilo: usize, ihi: usize) -> Result<Array1<f64>, SpectrumError> {
        if ihi > self.nchannels() || ilo >= ihi {
            return Err(SpectrumError::OutsideChannelRange {
                ihi,
                nchannels: self.nchannels(),
            });
        }
        Ok(self.counts[ilo..ihi].iter().map(|&c| c as f64).collect())
    }

    /// Reads a sample serialized as JSON
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self, SpectrumError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Reads a sample, choosing the format by file extension
    ///
    /// `.json` is always available, OGIP spectral files (`.pha`, `.pi`, `.fits`, `.fit`)
    /// require the `fits` Cargo feature.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SpectrumError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Self::from_json(path),
            #[cfg(feature = "fits")]
            Some("pha" | "pi" | "fits" | "fit") => Self::from_fits(path),
            _ => Err(SpectrumError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::arr1;
    use std::io::Write;

    fn sample() -> SpectrumSample {
        SpectrumSample::new(
            vec![0, 1, 2, 3, 4],
            SpectrumHeader::new("Chandra", Some("ACIS".to_owned())),
        )
    }

    #[test]
    fn active_counts_slice() {
        let counts = sample().active_counts(1, 4).unwrap();
        assert_eq!(counts, arr1(&[1.0, 2.0, 3.0]));
    }

    #[test]
    fn active_counts_out_of_range() {
        let err = sample().active_counts(1, 6).unwrap_err();
        assert!(matches!(
            err,
            SpectrumError::OutsideChannelRange {
                ihi: 6,
                nchannels: 5
            }
        ));
    }

    #[test]
    fn key_from_header() {
        assert_eq!(sample().key().file_stems()[0], "chandra_acis_5");
    }

    #[test]
    fn json_defaults_scaling_keys() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"counts": [1, 2], "header": {{"telescope": "SWIFT", "exposure": 10.0}}}}"#
        )
        .unwrap();
        let s = SpectrumSample::from_path(file.path()).unwrap();
        assert_eq!(s.counts, vec![1, 2]);
        assert_eq!(s.header.instrument, None);
        assert_eq!(s.header.exposure, 10.0);
        assert_eq!(s.header.area_scale, 1.0);
    }

    #[test]
    fn unknown_extension() {
        let err = SpectrumSample::from_path("spectrum.txt").unwrap_err();
        assert!(matches!(err, SpectrumError::UnsupportedFormat(_)));
    }
}
