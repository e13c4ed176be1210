//! Error types for Palletize.

use thiserror::Error;

/// Result type alias for Palletize operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during palletizing operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid item provided (non-positive extents or weight).
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Invalid pallet provided.
    #[error("Invalid pallet: {0}")]
    InvalidPallet(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Malformed dataset content.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// No feasible packing found within the pallet budget.
    #[error("No feasible packing for order: {0}")]
    NoFeasiblePacking(String),

    /// Computation cancelled.
    #[error("Computation cancelled")]
    Cancelled,

    /// I/O failure on a dataset or result file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
