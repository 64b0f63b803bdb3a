//! Error types for record extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the extraction boundary.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Source file missing or unreadable.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Two header cells normalize to the same column name.
    #[error("duplicate column '{column}' in {path}")]
    DuplicateColumn { column: String, path: PathBuf },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {source}")]
    DataFrame {
        #[from]
        source: polars::error::PolarsError,
    },
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, IngestError>;
