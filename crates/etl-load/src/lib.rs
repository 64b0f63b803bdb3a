//! Loading validated records into storage.
//!
//! A [`Sink`] replaces one entity's table at a time. [`load_all`] drives a
//! sink over a batch of validation results and reports each entity
//! separately.

pub mod error;
pub mod sink;
pub mod sqlite;

pub use error::{Result, StorageError};
pub use sink::{MemorySink, Sink, load_all};
pub use sqlite::SqliteSink;
