#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod registry;
pub mod toml_schema;

pub use crate::catalog::DEFAULT_SPLIT;
pub use crate::error::RegistryError;
pub use crate::registry::SchemaRegistry;
pub use crate::toml_schema::{FieldDecl, SchemaDecl, SchemaFile, load_schema_file};
