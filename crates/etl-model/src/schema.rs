//! Schema declarations for target entities.
//!
//! A [`Schema`] is an ordered list of [`Field`]s. Nested fields reference
//! another entity by name and are resolved by the registry, never copied into
//! the embedding schema.

use std::fmt;

use serde::Serialize;

/// Expected type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Integer,
    Float,
    Boolean,
    Text,
    /// A collection of identifiers, parsed from a delimited text cell.
    IntegerList,
    /// An embedded record of another entity.
    Nested(String),
}

impl FieldKind {
    pub fn is_nested(&self) -> bool {
        matches!(self, FieldKind::Nested(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Text => "text",
            FieldKind::IntegerList => "integer_list",
            FieldKind::Nested(entity) => entity.as_str(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Nested(entity) => write!(f, "nested<{entity}>"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: true,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn integer_list(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::IntegerList)
    }

    pub fn nested(name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Nested(entity.into()))
    }

    /// Mark the field as non-nullable.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// A named, ordered field list for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
    /// Flattened column list; nested fields are expanded by the registry.
    columns: Vec<String>,
}

impl Schema {
    /// Create a schema. Columns of scalar fields are known immediately; the
    /// columns contributed by nested fields are filled in by
    /// [`Schema::resolve_columns`].
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        let columns = fields
            .iter()
            .filter(|field| !field.kind.is_nested())
            .map(|field| field.name.clone())
            .collect();
        Self {
            name: name.into(),
            fields,
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// The key field: the first declared field.
    pub fn key(&self) -> Option<&Field> {
        self.fields.first()
    }

    pub fn has_nested(&self) -> bool {
        self.fields.iter().any(|field| field.kind.is_nested())
    }

    /// Declared columns in order. Equal to the field names when the schema
    /// has no nested fields.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Expand nested fields into the columns of the referenced schemas.
    ///
    /// `lookup` returns the already-resolved schema for an entity name, or
    /// `None` when the entity is not registered (the name is returned as the
    /// error).
    pub fn resolve_columns<'a, F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<&'a Schema>,
    {
        let mut columns: Vec<String> = Vec::new();
        for field in &self.fields {
            match &field.kind {
                FieldKind::Nested(entity) => {
                    let nested = lookup(entity).ok_or_else(|| entity.clone())?;
                    for nested_field in nested.fields() {
                        if nested_field.kind.is_nested() {
                            continue;
                        }
                        let column = nested_column(nested, nested_field);
                        if !columns.contains(&column) {
                            columns.push(column);
                        }
                    }
                }
                _ => {
                    if !columns.contains(&field.name) {
                        columns.push(field.name.clone());
                    }
                }
            }
        }
        self.columns = columns;
        Ok(())
    }
}

/// Column that carries `field` of `nested` when the entity is embedded in
/// another schema.
///
/// The key field (first field) is qualified with the entity name unless it
/// already is (`id` of `user` becomes `user_id`, `order_id` of `order` stays
/// `order_id`). Other fields keep their own names.
///
/// ```
/// use etl_model::{Field, Schema, nested_column};
///
/// let user = Schema::new("user", vec![Field::integer("id"), Field::text("email")]);
/// assert_eq!(nested_column(&user, &user.fields()[0]), "user_id");
/// assert_eq!(nested_column(&user, &user.fields()[1]), "email");
/// ```
pub fn nested_column(nested: &Schema, field: &Field) -> String {
    let is_key = nested.key().is_some_and(|key| key.name == field.name);
    let prefix = format!("{}_", nested.name());
    if is_key && !field.name.starts_with(&prefix) {
        format!("{prefix}{}", field.name)
    } else {
        field.name.clone()
    }
}
