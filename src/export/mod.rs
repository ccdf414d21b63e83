//! Additive table model of a fitted background

mod table;
pub use table::{MODEL_NAME, TableModel, TableParameter};

#[cfg(feature = "fits")]
mod fits;
