use crate::basis::BasisModel;
use crate::data::SpectralCorpus;
use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use crate::error::BasisError;

use macro_const::macro_const;
use nalgebra::{DMatrix, SVD};
use ndarray::{Array1, Array2, Axis};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Cumulative explained-variance fractions reported while building a basis
pub const VARIANCE_THRESHOLDS: [f64; 4] = [0.80, 0.90, 0.95, 0.99];

macro_const! {
    const DOC: &str = r#"
Principal component analysis of a spectral corpus

Every spectrum of the corpus is restricted to the informative channel range and turned into its
shape-only representation $y = \log_{10}(c / N + 1)$, where $N$ is the total count of the
spectrum. The column mean $\mu$ is subtracted and the centred matrix is decomposed exactly,
$M - \mu = U S V^T$. The first `ncomponents` right singular vectors, ordered by decreasing
singular value, form the basis.

Requesting more components than there are spectra (or active channels) is an error rather than a
silently smaller basis.
"#;
}

#[doc = DOC!()]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct BasisBuilder {
    pub ncomponents: usize,
}

impl BasisBuilder {
    pub fn new(ncomponents: usize) -> Self {
        assert!(ncomponents > 0, "ncomponents must be positive");
        Self { ncomponents }
    }

    #[inline]
    pub fn default_ncomponents() -> usize {
        5
    }

    pub const fn doc() -> &'static str {
        DOC
    }

    pub fn build<S>(&self, corpus: &SpectralCorpus, sink: &mut S) -> Result<BasisModel, BasisError>
    where
        S: DiagnosticsSink + ?Sized,
    {
        let range = corpus.channel_range()?;
        if corpus.nspectra() < self.ncomponents {
            return Err(BasisError::TooFewSpectra {
                requested: self.ncomponents,
                available: corpus.nspectra(),
            });
        }
        if range.len() < self.ncomponents {
            return Err(BasisError::TooManyComponents {
                requested: self.ncomponents,
                channels: range.len(),
            });
        }

        let y = corpus.normalized(range);
        let mean = y
            .mean_axis(Axis(0))
            .ok_or(BasisError::EmptyCorpus)?;
        let centered = &y - &mean;

        let (singular_values, vt) = ordered_svd(&centered)?;

        for (threshold, ncomponents) in explained_variance_counts(&singular_values) {
            sink.record(DiagnosticEvent::ExplainedVariance {
                threshold,
                ncomponents,
            });
        }

        let components = Array2::from_shape_fn((self.ncomponents, range.len()), |(i, j)| vt[(i, j)]);
        let values = singular_values
            .iter()
            .take(self.ncomponents)
            .copied()
            .collect::<Array1<_>>();
        sink.record(DiagnosticEvent::BasisBuilt {
            nspectra: corpus.nspectra(),
            ilo: range.ilo,
            ihi: range.ihi,
            ncomponents: self.ncomponents,
        });
        BasisModel::new(mean, components, values, range)
    }
}

impl Default for BasisBuilder {
    fn default() -> Self {
        Self::new(Self::default_ncomponents())
    }
}

/// Singular values in decreasing order and the matching rows of `V^T`
fn ordered_svd(m: &Array2<f64>) -> Result<(Vec<f64>, DMatrix<f64>), BasisError> {
    let (nrows, ncols) = m.dim();
    let matrix = DMatrix::from_fn(nrows, ncols, |i, j| m[[i, j]]);
    let svd = SVD::new(matrix, false, true);
    let vt = svd
        .v_t
        .ok_or_else(|| BasisError::ShapeMismatch("SVD did not produce V^T".to_owned()))?;

    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&a, &b| svd.singular_values[b].total_cmp(&svd.singular_values[a]));

    let values = order.iter().map(|&i| svd.singular_values[i]).collect();
    let sorted_vt = DMatrix::from_fn(order.len(), ncols, |i, j| vt[(order[i], j)]);
    Ok((values, sorted_vt))
}

/// Smallest number of components reaching each of [VARIANCE_THRESHOLDS]
pub fn explained_variance_counts(singular_values: &[f64]) -> Vec<(f64, usize)> {
    let total: f64 = singular_values.iter().map(|s| s * s).sum();
    let mut cumulative = Vec::with_capacity(singular_values.len());
    let mut acc = 0.0;
    for s in singular_values {
        acc += s * s;
        cumulative.push(if total > 0.0 { acc / total } else { 1.0 });
    }
    VARIANCE_THRESHOLDS
        .iter()
        .map(|&threshold| {
            let n = cumulative
                .iter()
                .position(|&fraction| fraction >= threshold)
                .map_or(singular_values.len(), |i| i + 1);
            (threshold, n)
        })
        .collect()
}
