//! Error types for table transforms.

use std::path::PathBuf;
use thiserror::Error;

/// Structural errors raised by transform stages.
///
/// Degenerate statistics (zero range or variance) are not errors; the
/// affected stage falls back to zero and logs at debug level.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A stage referenced a column the table does not have.
    #[error("column '{column}' not found in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// An enrich step referenced a side table that was not supplied.
    #[error("table '{table}' is not available to the pipeline")]
    UnknownTable { table: String },

    /// A generated column would overwrite an existing one.
    #[error("column '{column}' already exists")]
    DuplicateColumn { column: String },

    /// A textual filter condition could not be parsed.
    #[error("invalid filter condition '{input}': {message}")]
    InvalidPredicate { input: String, message: String },

    /// A stage was configured with unusable arguments.
    #[error("invalid {stage} step: {message}")]
    InvalidStage { stage: String, message: String },

    #[error("failed to read pipeline file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;
