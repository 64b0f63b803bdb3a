//! Dynamically-typed scalar values read from source records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar cell as it arrives from the extraction boundary.
///
/// Numbers are kept as either integers or floats so identifiers survive
/// without a round trip through `f64`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for `Null` and for text containing only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Name of the variant, used in coercion reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    /// Infer a scalar from a raw text cell.
    ///
    /// Empty cells become `Null`; `true`/`false` (any case) become booleans;
    /// integer and float literals become numbers; anything else stays text.
    ///
    /// ```
    /// use etl_model::Value;
    ///
    /// assert_eq!(Value::infer(""), Value::Null);
    /// assert_eq!(Value::infer("42"), Value::Int(42));
    /// assert_eq!(Value::infer("2.5"), Value::Float(2.5));
    /// assert_eq!(Value::infer("True"), Value::Bool(true));
    /// assert_eq!(Value::infer("ada"), Value::Text("ada".to_string()));
    /// ```
    pub fn infer(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        if let Ok(int) = trimmed.parse::<i64>() {
            return Value::Int(int);
        }
        // "inf"/"nan" parse as floats but are words in tabular data.
        if trimmed.chars().any(|ch| ch.is_ascii_digit())
            && let Ok(float) = trimmed.parse::<f64>()
            && float.is_finite()
        {
            return Value::Float(float);
        }
        Value::Text(trimmed.to_string())
    }

    /// Key used for equality grouping (dedupe, joins).
    ///
    /// Floats with no fractional part share a key with the matching integer.
    pub fn group_key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(v) => Some(format!("b:{v}")),
            Value::Int(v) => Some(format!("n:{v}")),
            Value::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => {
                Some(format!("n:{}", *v as i64))
            }
            Value::Float(v) => Some(format!("n:{v}")),
            Value::Text(text) => Some(format!("s:{text}")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => f.write_str(&format_numeric(*v)),
            Value::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// ```
/// use etl_model::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
