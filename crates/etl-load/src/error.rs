//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing records to a sink.
///
/// Sinks surface these unchanged; nothing is retried.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database file could not be opened.
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed while replacing an entity's table.
    #[error("failed to write table '{entity}': {source}")]
    Write {
        entity: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A list or nested record could not be encoded as JSON.
    #[error("failed to encode field '{field}' of '{entity}': {source}")]
    Encode {
        entity: String,
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// Records in one batch disagree on their field layout.
    #[error("record {row} of '{entity}' does not match the table columns")]
    Layout { entity: String, row: usize },
}

/// Result type for sink operations.
pub type Result<T> = std::result::Result<T, StorageError>;
