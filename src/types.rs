use ndarray::{Array1, Array2};

/// Real vector over the active channel range
pub type ChannelVector = Array1<f64>;

/// Row-major matrix, one spectrum or one component per row
pub type SpectraMatrix = Array2<f64>;
