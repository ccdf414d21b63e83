use crate::basis::BasisModel;
use crate::data::log_ratio;
use crate::model::ParameterVector;

use ndarray::ArrayView1;

/// Initial guess by linear projection onto the basis
///
/// The counts over the active range are turned into `y = log10(counts / total + 1)` and
/// projected, `z = C (y - mean)`. The result is `[log10(total + 0.1), z...]`. A spectrum without
/// counts yields `y = 0` and `logNorm = -1`.
pub fn decompose(basis: &BasisModel, counts: ArrayView1<f64>) -> ParameterVector {
    assert_eq!(counts.len(), basis.nchannels());
    let total = counts.sum();
    let y = counts.mapv(|c| log_ratio(c, total));
    let z = basis.components().dot(&(&y - &basis.mean()));
    ParameterVector::new((total + 0.1).log10(), z.as_slice().expect("dot output is contiguous"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpectrumModel;
    use crate::tests::{identity_basis, synthetic_basis};

    use approx::assert_relative_eq;
    use ndarray::{Array1, arr1};

    #[test]
    fn flat_spectrum_with_identity_basis() {
        let basis = identity_basis(4);
        let params = decompose(&basis, arr1(&[10.0, 10.0, 10.0, 10.0]).view());
        assert_relative_eq!(params.log_norm(), 40.1_f64.log10(), max_relative = 1e-12);
        // log10(10 / 40 + 1) in every channel, so the coefficients are uniform but not zero
        let expected = 1.25_f64.log10();
        assert_eq!(params.ncomponents(), 4);
        for &z in params.components() {
            assert_relative_eq!(z, expected, max_relative = 1e-12);
        }
        // the coefficients are uniform, no channel is preferred
        let first = params.components()[0];
        assert!(params.components().iter().all(|&z| z == first));
    }

    #[test]
    fn one_coefficient_per_component() {
        let basis = synthetic_basis(32, 5);
        let counts = Array1::from_shape_fn(32, |i| (i % 7) as f64 + 3.0);
        let params = decompose(&basis, counts.view());
        assert_eq!(params.components().len(), basis.ncomponents());
        assert_eq!(params.len(), 1 + basis.ncomponents());
    }

    #[test]
    fn empty_spectrum_is_tolerated() {
        let basis = synthetic_basis(16, 3);
        let params = decompose(&basis, Array1::zeros(16).view());
        assert_relative_eq!(params.log_norm(), -1.0);
        assert!(params.values().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn projection_reconstructs_spectrum_in_span() {
        // counts generated from the identity basis are recovered exactly
        let basis = identity_basis(6);
        let counts = arr1(&[5.0, 8.0, 13.0, 21.0, 34.0, 55.0]);
        let params = decompose(&basis, counts.view());
        let exact = ParameterVector::new(counts.sum().log10(), params.components());
        let pred = SpectrumModel::new(&basis, counts.clone()).predict(&exact);
        for (&p, &c) in pred.valid().unwrap().iter().zip(counts.iter()) {
            assert_relative_eq!(p, c, max_relative = 1e-10);
        }
    }
}
