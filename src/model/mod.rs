//! Parameterisation and prediction of the background model of one spectrum

mod decompose;
pub use decompose::decompose;

mod parameters;
pub use parameters::{ActiveMask, LINE_NPARAMS, LineParams, ParameterVector};

mod prediction;
pub use prediction::{LINE_LOG_NORM_RANGE, LINE_LOG_SIGMA_MIN, Prediction, SpectrumModel};
