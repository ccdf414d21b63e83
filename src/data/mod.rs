mod corpus;
pub use corpus::{ChannelRange, SpectralCorpus, log_ratio};

#[cfg(feature = "fits")]
mod fits;

mod spectrum;
pub use spectrum::{SpectrumHeader, SpectrumSample};
