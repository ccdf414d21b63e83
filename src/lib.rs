#![doc = include_str!("../README.md")]

#[cfg(test)]
#[macro_use]
mod tests;

mod array_stats;

pub mod basis;
pub use basis::{BasisBuilder, BasisKey, BasisLibrary, BasisModel, DEFAULT_MODEL_DIR};

mod data;
pub use data::{ChannelRange, SpectralCorpus, SpectrumHeader, SpectrumSample, log_ratio};

pub mod diagnostics;
pub use diagnostics::{DiagnosticEvent, DiagnosticsSink, EventLog, SeedSource, TracingSink};

mod error;
pub use error::{BackgroundError, BasisError, ExportError, LibraryError, SpectrumError};

pub mod export;
pub use export::TableModel;

pub mod model;
pub use model::{
    ActiveMask, LineParams, ParameterVector, Prediction, SpectrumModel, decompose,
};

pub mod nl_fit;
pub use nl_fit::{MinimizeResult, Minimizer, MinimizerTrait, NelderMeadMinimizer};

pub mod selection;
pub use selection::{FitResult, ModelSelection, SelectionSettings, fit_background};

pub mod statistic;
pub use statistic::{aic, poisson_statistic};

mod types;
pub use types::ChannelVector;

pub use ndarray;
