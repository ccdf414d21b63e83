//! Poisson fit statistic and the information criterion used for model selection

use crate::array_stats::max_value;
use crate::model::Prediction;

use ndarray::{ArrayView1, Zip};

/// Statistic assigned to a parameter vector outside of the model domain
///
/// Larger than any value [poisson_statistic] can return for a spectrum.
pub const OUT_OF_DOMAIN_STATISTIC: f64 = 1e300;

/// Per-channel penalty unit for a non-positive or non-finite predicted rate
pub const INVALID_CHANNEL_PENALTY: f64 = 1e6;

const MAX_PENALTY_DISTANCE: f64 = 1e100;

/// Poisson deviance-like statistic, `-2 Σ ln Poisson(counts_i | pred_i)`
///
/// Channels with an invalid prediction (non-finite or non-positive) contribute
/// `INVALID_CHANNEL_PENALTY * (1 + d)` instead, where `d` is how far the prediction is below the
/// largest observed count. The result is always finite, never NaN, and at most
/// [OUT_OF_DOMAIN_STATISTIC].
pub fn poisson_statistic(counts: ArrayView1<f64>, pred: ArrayView1<f64>) -> f64 {
    assert_eq!(counts.len(), pred.len(), "counts and prediction lengths differ");
    let max_counts = max_value(counts).unwrap_or(0.0);

    let statistic = Zip::from(counts)
        .and(pred)
        .fold(0.0, |acc, &k, &mu| acc + channel_statistic(k, mu, max_counts));

    if statistic.is_nan() {
        OUT_OF_DOMAIN_STATISTIC
    } else {
        statistic.min(OUT_OF_DOMAIN_STATISTIC)
    }
}

#[inline]
fn channel_statistic(k: f64, mu: f64, max_counts: f64) -> f64 {
    if mu.is_finite() && mu > 0.0 {
        -2.0 * poisson_ln_pmf(k, mu)
    } else {
        let value = if mu.is_nan() { 0.0 } else { mu };
        let distance = (max_counts - value).clamp(0.0, MAX_PENALTY_DISTANCE);
        INVALID_CHANNEL_PENALTY * (1.0 + distance)
    }
}

/// `ln(mu^k e^-mu / k!)` for a non-negative integer-valued `k` and positive `mu`
#[inline]
pub fn poisson_ln_pmf(k: f64, mu: f64) -> f64 {
    if k == 0.0 {
        -mu
    } else {
        k * mu.ln() - mu - libm::lgamma(k + 1.0)
    }
}

/// Statistic of a [Prediction], the fixed worst value for [Prediction::OutOfDomain]
pub fn prediction_statistic(counts: ArrayView1<f64>, prediction: &Prediction) -> f64 {
    match prediction {
        Prediction::Valid(pred) => poisson_statistic(counts, pred.view()),
        Prediction::OutOfDomain => OUT_OF_DOMAIN_STATISTIC,
    }
}

/// Akaike information criterion, `statistic + 2 k` for `k` free parameters
#[inline]
pub fn aic(statistic: f64, nactive: usize) -> f64 {
    statistic + 2.0 * nactive as f64
}
