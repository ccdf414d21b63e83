pub use crate::basis::{BasisKey, BasisModel};
pub use crate::data::{ChannelRange, SpectralCorpus};
pub use crate::nl_fit::{MinimizeResult, MinimizerTrait};

pub use ndarray::{Array1, Array2};
pub use xray_background_pca_test_util::{spike_counts, synthetic_counts, with_gaussian_line};

/// Corpus of random smooth backgrounds keyed as `synthetic`/`detector`
pub fn synthetic_corpus(nspectra: usize, nchannels: usize, seed: u64) -> SpectralCorpus {
    let counts = xray_background_pca_test_util::synthetic_counts_matrix(nspectra, nchannels, seed);
    SpectralCorpus::new(
        BasisKey::new("synthetic", Some("detector"), nchannels),
        counts,
    )
    .unwrap()
}

pub fn synthetic_spectrum(nchannels: usize, seed: u64) -> Vec<u64> {
    synthetic_counts(nchannels, seed)
}

/// Zero mean, identity components, unit singular values over `0..n`
pub fn identity_basis(n: usize) -> BasisModel {
    BasisModel::new(
        Array1::zeros(n),
        Array2::eye(n),
        Array1::ones(n),
        ChannelRange::new(0, n),
    )
    .unwrap()
}

/// Zero mean and a single constant component, every prediction is flat
pub fn flat_basis(n: usize) -> BasisModel {
    BasisModel::new(
        Array1::zeros(n),
        Array2::from_elem((1, n), 1.0 / (n as f64).sqrt()),
        Array1::ones(1),
        ChannelRange::new(0, n),
    )
    .unwrap()
}

/// Mean of a flat spectrum and the first orthonormal cosine modes as components
pub fn synthetic_basis(nchannels: usize, ncomponents: usize) -> BasisModel {
    let n = nchannels as f64;
    let mean = Array1::from_elem(nchannels, (1.0 + 1.0 / n).log10());
    let components = Array2::from_shape_fn((ncomponents, nchannels), |(k, i)| {
        (2.0 / n).sqrt() * f64::cos(std::f64::consts::PI * (i as f64 + 0.5) * (k + 1) as f64 / n)
    });
    let values = Array1::from_shape_fn(ncomponents, |k| 1.0 / (k + 1) as f64);
    BasisModel::new(mean, components, values, ChannelRange::new(0, nchannels)).unwrap()
}

/// Returns its starting point, so every search step keeps its input values
#[derive(Clone, Debug)]
pub struct StartingPointMinimizer;

impl MinimizerTrait for StartingPointMinimizer {
    fn minimize<F>(&self, objective: F, x0: &[f64]) -> MinimizeResult
    where
        F: Fn(&[f64]) -> f64,
    {
        MinimizeResult {
            x: x0.to_vec(),
            value: objective(x0),
        }
    }
}

#[macro_export]
macro_rules! serde_json_test {
    ($name: ident, $type: ty, $expr: expr_2021 $(,)?) => {
        #[test]
        fn $name() {
            let value: $type = $expr;
            let json = serde_json::to_string(&value).unwrap();
            let restored: $type = serde_json::from_str(&json).unwrap();
            assert_eq!(value, restored);

            let schema = schemars::schema_for!($type);
            assert!(serde_json::to_string(&schema).is_ok());
        }
    };
}

#[macro_export]
macro_rules! check_doc_static_method {
    ($name: ident, $type: ty) => {
        #[test]
        fn $name() {
            const DOC: &'static str = <$type>::doc();
            assert!(!DOC.trim().is_empty());
        }
    };
}
