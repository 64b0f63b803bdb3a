//! Validated record instances.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A field value after coercion to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    IntegerList(Vec<i64>),
    Record(Box<TypedRecord>),
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Integer(v) => Some(*v as f64),
            TypedValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[i64]> {
        match self {
            TypedValue::IntegerList(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&TypedRecord> {
        match self {
            TypedValue::Record(v) => Some(v.as_ref()),
            _ => None,
        }
    }
}

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypedValue::Null => serializer.serialize_none(),
            TypedValue::Integer(v) => serializer.serialize_i64(*v),
            TypedValue::Float(v) => serializer.serialize_f64(*v),
            TypedValue::Boolean(v) => serializer.serialize_bool(*v),
            TypedValue::Text(v) => serializer.serialize_str(v),
            TypedValue::IntegerList(v) => v.serialize(serializer),
            TypedValue::Record(v) => v.serialize(serializer),
        }
    }
}

/// An instance of a schema. Holds exactly the schema's declared fields, in
/// declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRecord {
    entity: String,
    fields: Vec<(String, TypedValue)>,
}

impl TypedRecord {
    pub fn new(entity: impl Into<String>, fields: Vec<(String, TypedValue)>) -> Self {
        Self {
            entity: entity.into(),
            fields,
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every field is null.
    pub fn is_all_null(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_null())
    }
}

impl Serialize for TypedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
