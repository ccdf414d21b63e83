pub use spectra::{
    background_rates, spike_counts, synthetic_counts, synthetic_counts_matrix,
    with_gaussian_line,
};

mod spectra;
