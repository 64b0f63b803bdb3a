#![deny(unsafe_code)]

use std::path::Path;

use etl_model::{Field, FieldKind, Schema};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// On-disk form of a schema file:
///
/// ```toml
/// [[schema]]
/// name = "coupon"
///
/// [[schema.field]]
/// name = "id"
/// type = "integer"
/// nullable = false
///
/// [[schema.field]]
/// name = "owner"
/// type = "nested"
/// entity = "user"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default, rename = "schema")]
    pub schemas: Vec<SchemaDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDecl {
    pub name: String,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

pub fn load_schema_file(path: &Path) -> Result<SchemaFile, RegistryError> {
    let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| RegistryError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

impl SchemaDecl {
    /// Convert into an unresolved [`Schema`]. Nested columns are resolved by
    /// the registry when the schema is added.
    pub fn to_schema(&self) -> Result<Schema, RegistryError> {
        let mut fields = Vec::with_capacity(self.fields.len());
        for decl in &self.fields {
            let kind = parse_kind(&self.name, decl)?;
            let mut field = Field::new(decl.name.trim(), kind);
            field.nullable = decl.nullable;
            fields.push(field);
        }
        if fields.is_empty() {
            return Err(RegistryError::InvalidField {
                entity: self.name.clone(),
                field: String::new(),
                message: "schema declares no fields".to_string(),
            });
        }
        Ok(Schema::new(self.name.trim().to_lowercase(), fields))
    }
}

fn parse_kind(entity: &str, decl: &FieldDecl) -> Result<FieldKind, RegistryError> {
    let invalid = |message: String| RegistryError::InvalidField {
        entity: entity.to_string(),
        field: decl.name.clone(),
        message,
    };
    let kind = match decl.kind.trim().to_lowercase().as_str() {
        "integer" | "int" => FieldKind::Integer,
        "float" | "number" => FieldKind::Float,
        "boolean" | "bool" => FieldKind::Boolean,
        "text" | "string" => FieldKind::Text,
        "integer_list" | "list" => FieldKind::IntegerList,
        "nested" => {
            let target = decl
                .entity
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| invalid("nested field needs an `entity`".to_string()))?;
            FieldKind::Nested(target.to_lowercase())
        }
        other => return Err(invalid(format!("unsupported type `{other}`"))),
    };
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_declarations() {
        let file: SchemaFile = toml::from_str(
            r#"
            [[schema]]
            name = "Coupon"

            [[schema.field]]
            name = "id"
            type = "integer"
            nullable = false

            [[schema.field]]
            name = "owner"
            type = "nested"
            entity = "user"
            "#,
        )
        .expect("parse");
        let schema = file.schemas[0].to_schema().expect("convert");
        assert_eq!(schema.name(), "coupon");
        assert!(!schema.fields()[0].nullable);
        assert_eq!(schema.fields()[1].kind, FieldKind::Nested("user".into()));
        assert!(schema.fields()[1].nullable);
    }

    #[test]
    fn rejects_unknown_type() {
        let decl = SchemaDecl {
            name: "coupon".to_string(),
            fields: vec![FieldDecl {
                name: "id".to_string(),
                kind: "uuid".to_string(),
                entity: None,
                nullable: true,
            }],
        };
        let err = decl.to_schema().unwrap_err();
        assert!(err.to_string().contains("unsupported type `uuid`"));
    }
}
