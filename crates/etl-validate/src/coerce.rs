//! Total coercion functions from raw [`Value`]s to declared field types.
//!
//! Every function maps absent input (`Null` or whitespace-only text) to
//! [`TypedValue::Null`]; the caller decides whether that is acceptable.

use etl_model::{FieldKind, TypedValue, Value};

/// Largest magnitude an `f64` can hold while still mapping to a unique `i64`.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    #[error("cannot read {found} `{value}` as {expected}")]
    Incompatible {
        expected: &'static str,
        found: &'static str,
        value: String,
    },

    #[error("`{value}` has a fractional part")]
    Fractional { value: String },

    #[error("`{value}` is outside the integer range")]
    OutOfRange { value: String },
}

impl CoercionError {
    fn incompatible(expected: &'static str, value: &Value) -> Self {
        Self::Incompatible {
            expected,
            found: value.kind(),
            value: value.to_string(),
        }
    }
}

/// Coerce `value` to a scalar `kind`.
///
/// Nested kinds are assembled from sibling columns by the validator and are
/// rejected here.
///
/// ```
/// use etl_model::{FieldKind, TypedValue, Value};
/// use etl_validate::coerce;
///
/// assert_eq!(coerce(&Value::from("7"), &FieldKind::Integer), Ok(TypedValue::Integer(7)));
/// assert_eq!(coerce(&Value::from("  "), &FieldKind::Float), Ok(TypedValue::Null));
/// assert!(coerce(&Value::from("seven"), &FieldKind::Integer).is_err());
/// ```
pub fn coerce(value: &Value, kind: &FieldKind) -> Result<TypedValue, CoercionError> {
    if value.is_blank() {
        return Ok(TypedValue::Null);
    }
    match kind {
        FieldKind::Integer => to_integer(value),
        FieldKind::Float => to_float(value),
        FieldKind::Boolean => to_boolean(value),
        FieldKind::Text => Ok(to_text(value)),
        FieldKind::IntegerList => Ok(TypedValue::IntegerList(to_integer_list(value))),
        FieldKind::Nested(_) => Err(CoercionError::incompatible("nested record", value)),
    }
}

fn float_to_integer(float: f64, raw: &Value) -> Result<TypedValue, CoercionError> {
    if !float.is_finite() || float.abs() > MAX_EXACT_FLOAT {
        return Err(CoercionError::OutOfRange {
            value: raw.to_string(),
        });
    }
    if float.fract() != 0.0 {
        return Err(CoercionError::Fractional {
            value: raw.to_string(),
        });
    }
    Ok(TypedValue::Integer(float as i64))
}

fn to_integer(value: &Value) -> Result<TypedValue, CoercionError> {
    match value {
        Value::Int(v) => Ok(TypedValue::Integer(*v)),
        Value::Float(v) => float_to_integer(*v, value),
        Value::Bool(v) => Ok(TypedValue::Integer(i64::from(*v))),
        Value::Text(text) => {
            let trimmed = text.trim();
            if let Ok(int) = trimmed.parse::<i64>() {
                return Ok(TypedValue::Integer(int));
            }
            match parse_finite(trimmed) {
                Some(float) => float_to_integer(float, value),
                None => Err(CoercionError::incompatible("integer", value)),
            }
        }
        Value::Null => Ok(TypedValue::Null),
    }
}

fn to_float(value: &Value) -> Result<TypedValue, CoercionError> {
    match value {
        Value::Int(v) => Ok(TypedValue::Float(*v as f64)),
        Value::Float(v) => Ok(TypedValue::Float(*v)),
        Value::Bool(v) => Ok(TypedValue::Float(if *v { 1.0 } else { 0.0 })),
        Value::Text(text) => parse_finite(text.trim())
            .map(TypedValue::Float)
            .ok_or_else(|| CoercionError::incompatible("float", value)),
        Value::Null => Ok(TypedValue::Null),
    }
}

fn to_boolean(value: &Value) -> Result<TypedValue, CoercionError> {
    match value {
        Value::Bool(v) => Ok(TypedValue::Boolean(*v)),
        Value::Int(0) => Ok(TypedValue::Boolean(false)),
        Value::Int(1) => Ok(TypedValue::Boolean(true)),
        Value::Float(v) if *v == 0.0 => Ok(TypedValue::Boolean(false)),
        Value::Float(v) if *v == 1.0 => Ok(TypedValue::Boolean(true)),
        Value::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Ok(TypedValue::Boolean(true)),
            "false" | "f" | "no" | "n" | "off" | "0" => Ok(TypedValue::Boolean(false)),
            _ => Err(CoercionError::incompatible("boolean", value)),
        },
        Value::Null => Ok(TypedValue::Null),
        Value::Int(_) | Value::Float(_) => Err(CoercionError::incompatible("boolean", value)),
    }
}

fn to_text(value: &Value) -> TypedValue {
    match value {
        Value::Text(text) => TypedValue::Text(text.clone()),
        Value::Null => TypedValue::Null,
        other => TypedValue::Text(other.to_string()),
    }
}

fn to_integer_list(value: &Value) -> Vec<i64> {
    match value {
        Value::Int(v) => vec![*v],
        Value::Float(v) if v.fract() == 0.0 && v.abs() <= MAX_EXACT_FLOAT => vec![*v as i64],
        Value::Text(text) => parse_integer_list(text),
        _ => Vec::new(),
    }
}

/// Parse a delimited list of integers: `[1,2,3]`, `1,2,3` or `1;2;3`.
///
/// Any malformed element makes the whole list empty.
///
/// ```
/// use etl_validate::parse_integer_list;
///
/// assert_eq!(parse_integer_list("[1, 2, 3]"), vec![1, 2, 3]);
/// assert_eq!(parse_integer_list("4;5"), vec![4, 5]);
/// assert_eq!(parse_integer_list("1,x"), Vec::<i64>::new());
/// ```
pub fn parse_integer_list(text: &str) -> Vec<i64> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed)
        .trim();
    if inner.is_empty() {
        return Vec::new();
    }
    let delimiter = if inner.contains(';') { ';' } else { ',' };
    let mut items = Vec::new();
    for part in inner.split(delimiter) {
        let part = part.trim();
        let parsed = part.parse::<i64>().ok().or_else(|| {
            parse_finite(part)
                .filter(|float| float.fract() == 0.0 && float.abs() <= MAX_EXACT_FLOAT)
                .map(|float| float as i64)
        });
        match parsed {
            Some(item) => items.push(item),
            None => return Vec::new(),
        }
    }
    items
}

fn parse_finite(text: &str) -> Option<f64> {
    if !text.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok().filter(|float| float.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_coercion() {
        let kind = FieldKind::Integer;
        assert_eq!(coerce(&Value::Float(3.0), &kind), Ok(TypedValue::Integer(3)));
        assert_eq!(coerce(&Value::Bool(true), &kind), Ok(TypedValue::Integer(1)));
        assert_eq!(coerce(&Value::from(" 12 "), &kind), Ok(TypedValue::Integer(12)));
        assert_eq!(coerce(&Value::from("4.0"), &kind), Ok(TypedValue::Integer(4)));
        assert_eq!(
            coerce(&Value::Float(2.5), &kind),
            Err(CoercionError::Fractional {
                value: "2.5".to_string()
            })
        );
        assert_eq!(
            coerce(&Value::from("abc"), &kind),
            Err(CoercionError::Incompatible {
                expected: "integer",
                found: "text",
                value: "abc".to_string()
            })
        );
        assert!(matches!(
            coerce(&Value::Float(1.0e300), &kind),
            Err(CoercionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn float_coercion() {
        let kind = FieldKind::Float;
        assert_eq!(coerce(&Value::Int(2), &kind), Ok(TypedValue::Float(2.0)));
        assert_eq!(coerce(&Value::Bool(false), &kind), Ok(TypedValue::Float(0.0)));
        assert_eq!(coerce(&Value::from("1e2"), &kind), Ok(TypedValue::Float(100.0)));
        assert!(coerce(&Value::from("NaN"), &kind).is_err());
        assert!(coerce(&Value::from("inf"), &kind).is_err());
    }

    #[test]
    fn boolean_coercion() {
        let kind = FieldKind::Boolean;
        for truthy in ["true", "T", "Yes", "y", "ON", "1"] {
            assert_eq!(
                coerce(&Value::from(truthy), &kind),
                Ok(TypedValue::Boolean(true)),
                "{truthy}"
            );
        }
        for falsy in ["false", "f", "NO", "n", "off", "0"] {
            assert_eq!(
                coerce(&Value::from(falsy), &kind),
                Ok(TypedValue::Boolean(false)),
                "{falsy}"
            );
        }
        assert_eq!(coerce(&Value::Int(1), &kind), Ok(TypedValue::Boolean(true)));
        assert!(coerce(&Value::Int(2), &kind).is_err());
        assert!(coerce(&Value::from("maybe"), &kind).is_err());
    }

    #[test]
    fn text_coercion_renders_scalars() {
        let kind = FieldKind::Text;
        assert_eq!(
            coerce(&Value::Int(5), &kind),
            Ok(TypedValue::Text("5".to_string()))
        );
        assert_eq!(
            coerce(&Value::Float(2.5), &kind),
            Ok(TypedValue::Text("2.5".to_string()))
        );
        assert_eq!(
            coerce(&Value::Bool(true), &kind),
            Ok(TypedValue::Text("true".to_string()))
        );
    }

    #[test]
    fn integer_list_never_fails() {
        let kind = FieldKind::IntegerList;
        assert_eq!(
            coerce(&Value::from("[1,2,3]"), &kind),
            Ok(TypedValue::IntegerList(vec![1, 2, 3]))
        );
        assert_eq!(
            coerce(&Value::from("[1,"), &kind),
            Ok(TypedValue::IntegerList(vec![]))
        );
        assert_eq!(
            coerce(&Value::Int(9), &kind),
            Ok(TypedValue::IntegerList(vec![9]))
        );
        assert_eq!(
            coerce(&Value::Bool(true), &kind),
            Ok(TypedValue::IntegerList(vec![]))
        );
        assert_eq!(parse_integer_list("[]"), Vec::<i64>::new());
    }

    #[test]
    fn blank_is_absent() {
        for kind in [FieldKind::Integer, FieldKind::Boolean, FieldKind::Text] {
            assert_eq!(coerce(&Value::from("   "), &kind), Ok(TypedValue::Null));
            assert_eq!(coerce(&Value::Null, &kind), Ok(TypedValue::Null));
        }
    }
}
