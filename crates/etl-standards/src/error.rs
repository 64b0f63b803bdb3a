#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown entity: {entity}")]
    UnknownEntity { entity: String },

    #[error("entity already registered: {entity}")]
    DuplicateEntity { entity: String },

    #[error("invalid field {entity}.{field}: {message}")]
    InvalidField {
        entity: String,
        field: String,
        message: String,
    },

    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl RegistryError {
    pub(crate) fn unknown(entity: impl Into<String>) -> Self {
        Self::UnknownEntity {
            entity: entity.into(),
        }
    }
}
