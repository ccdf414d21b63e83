//! Principal-component background basis: construction, persistence and lookup

mod builder;
pub use builder::{BasisBuilder, VARIANCE_THRESHOLDS, explained_variance_counts};

mod key;
pub use key::BasisKey;

mod library;
pub use library::{BasisLibrary, DEFAULT_MODEL_DIR};

mod model;
pub use model::BasisModel;
