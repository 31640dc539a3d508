//! Error types for result normalization.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while normalizing a response into a table.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A required column is missing from the response headers.
    #[error("column '{0}' not found in response headers")]
    MissingColumn(String),

    /// A row does not have one cell per header.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// DataFrame construction failed.
    #[error("DataFrame operation failed: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Result type for normalization operations.
pub type Result<T> = std::result::Result<T, NormalizeError>;
