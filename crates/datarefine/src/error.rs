//! Error types for the datarefine library.

use std::path::PathBuf;
use thiserror::Error;

use crate::validate::ValidationFailure;

/// Main error type for datarefine operations.
#[derive(Debug, Error)]
pub enum RefineError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error parsing a cell value.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Empty file or no data to clean.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// The table violates a structural invariant (headers, row counts).
    #[error("Structural error: {0}")]
    Structural(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configured column name does not exist in the table.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// The validation gate rejected the table before cleaning.
    #[error("Validation failed: {0}")]
    Validation(ValidationFailure),
}

/// Result type alias for datarefine operations.
pub type Result<T> = std::result::Result<T, RefineError>;
