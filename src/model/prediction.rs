use crate::basis::BasisModel;
use crate::model::{LINE_NPARAMS, ParameterVector};
use crate::nl_fit::within_bounds;
use crate::statistic::prediction_statistic;
use crate::types::ChannelVector;

use ndarray::{Array1, ArrayView1, Zip};
use std::f64::consts::TAU;

/// Smallest allowed line width, decimal logarithm in channels
pub const LINE_LOG_SIGMA_MIN: f64 = -1.0;

/// Range allowed for the decimal logarithm of the total line counts
pub const LINE_LOG_NORM_RANGE: (f64, f64) = (-3.0, 12.0);

/// Model prediction over the active channel range
#[derive(Clone, Debug, PartialEq)]
pub enum Prediction {
    Valid(ChannelVector),
    /// The parameter vector lies outside the model domain
    OutOfDomain,
}

impl Prediction {
    pub fn valid(&self) -> Option<&ChannelVector> {
        match self {
            Self::Valid(v) => Some(v),
            Self::OutOfDomain => None,
        }
    }
}

/// Background model of one observed spectrum: a basis plus the counts it is compared with
#[derive(Clone, Debug)]
pub struct SpectrumModel<'a> {
    basis: &'a BasisModel,
    counts: ChannelVector,
}

impl<'a> SpectrumModel<'a> {
    /// `counts` must cover exactly the active range of `basis`
    pub fn new(basis: &'a BasisModel, counts: ChannelVector) -> Self {
        assert_eq!(
            counts.len(),
            basis.nchannels(),
            "counts must cover the active channel range"
        );
        Self { basis, counts }
    }

    #[inline]
    pub fn basis(&self) -> &BasisModel {
        self.basis
    }

    #[inline]
    pub fn counts(&self) -> ArrayView1<'_, f64> {
        self.counts.view()
    }

    #[inline]
    pub fn nchannels(&self) -> usize {
        self.counts.len()
    }

    /// Lower and upper bounds of a line block `(center, log_sigma, log_norm)`
    pub fn line_bounds(&self) -> ([f64; LINE_NPARAMS], [f64; LINE_NPARAMS]) {
        let n = self.nchannels() as f64;
        (
            [0.0, LINE_LOG_SIGMA_MIN, LINE_LOG_NORM_RANGE.0],
            [n - 1.0, n.log10(), LINE_LOG_NORM_RANGE.1],
        )
    }

    /// Predicted counts `(10^(mean + z C) - 1) 10^logNorm + Σ lines`
    pub fn predict(&self, params: &ParameterVector) -> Prediction {
        if params.ncomponents() > self.basis.ncomponents() || !params.log_norm().is_finite() {
            return Prediction::OutOfDomain;
        }
        let (lower, upper) = self.line_bounds();
        if !params
            .lines()
            .all(|line| within_bounds(&line.to_array(), &lower, &upper))
        {
            return Prediction::OutOfDomain;
        }

        let mut y = self.basis.mean().to_owned();
        for (row, &z) in self.basis.components().rows().into_iter().zip(params.components()) {
            y.scaled_add(z, &row);
        }
        let norm = 10.0_f64.powf(params.log_norm());
        let mut pred = y.mapv_into(|y| (10.0_f64.powf(y) - 1.0) * norm);

        let channels = Array1::range(0.0, pred.len() as f64, 1.0);
        for line in params.lines() {
            let sigma = 10.0_f64.powf(line.log_sigma);
            let amplitude = 10.0_f64.powf(line.log_norm) / (sigma * TAU.sqrt());
            Zip::from(&mut pred).and(&channels).for_each(|p, &x| {
                let u = (x - line.center) / sigma;
                *p += amplitude * f64::exp(-0.5 * u * u);
            });
        }

        Prediction::Valid(pred)
    }

    /// Fit statistic of `params`, see [crate::statistic::poisson_statistic]
    pub fn statistic(&self, params: &ParameterVector) -> f64 {
        prediction_statistic(self.counts.view(), &self.predict(params))
    }
}
