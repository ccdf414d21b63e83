use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_distr::Poisson;

/// Expected counts of a smooth instrumental background
///
/// A falling power law plus a flat floor and a broad bump, each randomly scaled. Every rate is
/// positive.
pub fn background_rates<R: Rng>(rng: &mut R, nchannels: usize) -> Vec<f64> {
    let amplitude = rng.random_range(50.0..150.0);
    let index = rng.random_range(0.5..1.5);
    let floor = rng.random_range(1.0..5.0);
    let bump_center = rng.random_range(0.3..0.7) * nchannels as f64;
    let bump_width = rng.random_range(0.05..0.15) * nchannels as f64;
    let bump_height = rng.random_range(0.0..20.0);
    (0..nchannels)
        .map(|i| {
            let x = i as f64 + 1.0;
            let bump = bump_height * f64::exp(-0.5 * ((x - bump_center) / bump_width).powi(2));
            amplitude * x.powf(-index) + floor + bump
        })
        .collect()
}

fn poisson_draw<R: Rng>(rng: &mut R, rate: f64) -> f64 {
    Poisson::new(rate)
        .expect("background rates are positive")
        .sample(rng)
}

/// Poisson realization of one random background, integer counts per channel
pub fn synthetic_counts(nchannels: usize, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    background_rates(&mut rng, nchannels)
        .into_iter()
        .map(|rate| poisson_draw(&mut rng, rate) as u64)
        .collect()
}

/// Corpus of `nspectra` independent backgrounds, spectra × channels
pub fn synthetic_counts_matrix(nspectra: usize, nchannels: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut counts = Array2::zeros((nspectra, nchannels));
    for mut row in counts.rows_mut() {
        let rates = background_rates(&mut rng, nchannels);
        for (c, rate) in row.iter_mut().zip(rates) {
            *c = poisson_draw(&mut rng, rate);
        }
    }
    counts
}

/// Flat spectrum of `level` counts with `peak` counts in a single `channel`
pub fn spike_counts(nchannels: usize, level: f64, channel: usize, peak: f64) -> Array1<f64> {
    assert!(channel < nchannels);
    let mut counts = Array1::from_elem(nchannels, level);
    counts[channel] = peak;
    counts
}

/// Adds the expected counts of a Gaussian line carrying `total` counts, rounded to integers
pub fn with_gaussian_line(counts: &[u64], center: f64, sigma: f64, total: f64) -> Vec<u64> {
    let norm = total / (sigma * (2.0 * std::f64::consts::PI).sqrt());
    counts
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let u = (i as f64 - center) / sigma;
            c + (norm * f64::exp(-0.5 * u * u)).round() as u64
        })
        .collect()
}
