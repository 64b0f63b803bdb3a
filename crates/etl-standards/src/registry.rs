#![deny(unsafe_code)]

use std::collections::BTreeSet;
use std::path::Path;

use etl_model::{FieldKind, Schema};
use tracing::{debug, error, info};

use crate::catalog::builtin_schemas;
use crate::error::RegistryError;
use crate::toml_schema::load_schema_file;

/// The set of entity schemas known to a pipeline run.
///
/// Schemas are kept in registration order. Once added, a schema is never
/// modified or replaced.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<Schema>,
}

impl SchemaRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the thirteen built-in entities.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for schema in builtin_schemas() {
            // Built-in schemas are ordered so every nested reference is
            // already registered; a failure here is a catalog bug.
            if let Err(error) = registry.add_schema(schema) {
                error!(%error, "invalid built-in schema");
            }
        }
        registry
    }

    /// Register a schema, resolving its nested columns against the schemas
    /// already present.
    pub fn add_schema(&mut self, mut schema: Schema) -> Result<(), RegistryError> {
        let name = schema.name().to_lowercase();
        if self.position(&name).is_some() {
            return Err(RegistryError::DuplicateEntity { entity: name });
        }

        let mut seen = BTreeSet::new();
        for field in schema.fields() {
            if !seen.insert(field.name.as_str()) {
                return Err(RegistryError::InvalidField {
                    entity: name,
                    field: field.name.clone(),
                    message: "declared more than once".to_string(),
                });
            }
            if let FieldKind::Nested(target) = &field.kind
                && target.eq_ignore_ascii_case(&name)
            {
                return Err(RegistryError::InvalidField {
                    entity: name,
                    field: field.name.clone(),
                    message: "a schema cannot nest itself".to_string(),
                });
            }
        }

        let schemas = &self.schemas;
        schema
            .resolve_columns(|entity| {
                schemas
                    .iter()
                    .find(|candidate| candidate.name().eq_ignore_ascii_case(entity))
            })
            .map_err(RegistryError::unknown)?;

        debug!(
            entity = %name,
            fields = schema.fields().len(),
            columns = schema.columns().len(),
            "registered schema"
        );
        self.schemas.push(schema);
        Ok(())
    }

    pub fn with_schema(mut self, schema: Schema) -> Result<Self, RegistryError> {
        self.add_schema(schema)?;
        Ok(self)
    }

    /// Add every schema declared in a TOML schema file, in file order.
    pub fn with_toml_file(mut self, path: &Path) -> Result<Self, RegistryError> {
        let file = load_schema_file(path)?;
        for decl in &file.schemas {
            self.add_schema(decl.to_schema()?)?;
        }
        info!(
            path = %path.display(),
            added = file.schemas.len(),
            total = self.schemas.len(),
            "loaded schema file"
        );
        Ok(self)
    }

    /// Look up a schema by entity name (case-insensitive).
    pub fn schema_for(&self, entity: &str) -> Result<&Schema, RegistryError> {
        self.position(entity)
            .map(|idx| &self.schemas[idx])
            .ok_or_else(|| RegistryError::unknown(entity))
    }

    /// Flattened columns of an entity, nested fields expanded in place.
    pub fn declared_columns(&self, entity: &str) -> Result<&[String], RegistryError> {
        Ok(self.schema_for(entity)?.columns())
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.position(entity).is_some()
    }

    /// Entity names in registration order.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(Schema::name)
    }

    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    fn position(&self, entity: &str) -> Option<usize> {
        let entity = entity.trim();
        self.schemas
            .iter()
            .position(|schema| schema.name().eq_ignore_ascii_case(entity))
    }
}
