use std::path::PathBuf;

/// Error returned while building or validating a [crate::BasisModel]
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BasisError {
    #[error("corpus contains no spectra")]
    EmptyCorpus,

    #[error("all channels are degenerate: every channel has identical counts across the corpus")]
    DegenerateCorpus,

    #[error("{requested} principal components requested, but the corpus has only {available} spectra")]
    TooFewSpectra { requested: usize, available: usize },

    #[error("{requested} principal components requested, but only {channels} active channels exist")]
    TooManyComponents { requested: usize, channels: usize },

    #[error("number of components must be positive")]
    ZeroComponents,

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("invalid basis record: {0}")]
    InvalidRecord(String),
}

/// Error returned while reading spectra or preparing them for a fit
#[derive(Debug, thiserror::Error)]
pub enum SpectrumError {
    #[error("active channel range ends at {ihi}, but the spectrum has only {nchannels} channels")]
    OutsideChannelRange { ihi: usize, nchannels: usize },

    #[error("unsupported spectrum file format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("invalid spectrum: {0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "fits")]
    #[error("FITS error: {0}")]
    Fits(#[from] fitsio::errors::Error),
}

/// Error returned by [crate::BasisLibrary]
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("no background model found for {key}, searched: {searched:?}")]
    ModelNotFound { key: String, searched: Vec<PathBuf> },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse background model {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level error of the lookup-then-fit entry point [crate::fit_background]
#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    #[error(transparent)]
    Basis(#[from] BasisError),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// Error returned by [crate::TableModel] writers
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("non-positive exposure or area scaling: EXPOSURE={exposure}, AREASCAL={area_scale}")]
    InvalidScaling { exposure: f64, area_scale: f64 },

    #[error("fitted prediction has {actual} channels, active range has {expected}")]
    PredictionLength { expected: usize, actual: usize },

    #[error("fitted prediction is undefined")]
    UndefinedPrediction,

    #[error("active channel range ends at {ihi}, but the table has only {nchannels} channels")]
    OutsideChannelRange { ihi: usize, nchannels: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "fits")]
    #[error("FITS error: {0}")]
    Fits(#[from] fitsio::errors::Error),
}
