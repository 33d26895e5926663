// In crates/core-types/src/error.rs

use thiserror::Error;

/// Failures raised by the signal, simulation and analytics pipeline.
///
/// Every crate in the core propagates these unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Data length ({len}) must be >= period ({period})")]
    InsufficientData { len: usize, period: usize },

    #[error("No data: {0}")]
    NoData(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

pub type Result<T> = std::result::Result<T, Error>;
