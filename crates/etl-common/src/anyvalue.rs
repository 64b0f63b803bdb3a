//! Polars `AnyValue` utility functions.
//!
//! This module provides helper functions for moving between Polars cells and
//! [`Value`], classifying column dtypes, and building columns back from values.

use etl_model::{Value, format_numeric};
use polars::prelude::{
    AnyValue, Column, DataFrame, DataType, IntoColumn, NamedFrom, PolarsResult, Series,
};

/// Converts a Polars `AnyValue` into a pipeline [`Value`].
///
/// Integer dtypes become `Int` (unsigned values beyond `i64::MAX` fall back to
/// `Float`), float dtypes become `Float`, strings become `Text`. Anything else
/// is rendered through its `Display` form.
pub fn any_to_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(v) => Value::Int(i64::from(v)),
        AnyValue::Int16(v) => Value::Int(i64::from(v)),
        AnyValue::Int32(v) => Value::Int(i64::from(v)),
        AnyValue::Int64(v) => Value::Int(v),
        AnyValue::UInt8(v) => Value::Int(i64::from(v)),
        AnyValue::UInt16(v) => Value::Int(i64::from(v)),
        AnyValue::UInt32(v) => Value::Int(i64::from(v)),
        AnyValue::UInt64(v) => match i64::try_from(v) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Float(v as f64),
        },
        AnyValue::Float32(v) if v.is_nan() => Value::Null,
        AnyValue::Float64(v) if v.is_nan() => Value::Null,
        AnyValue::Float32(v) => Value::Float(f64::from(v)),
        AnyValue::Float64(v) => Value::Float(v),
        AnyValue::String(s) => Value::Text(s.to_string()),
        AnyValue::StringOwned(s) => Value::Text(s.to_string()),
        other => Value::Text(other.to_string()),
    }
}

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null`, properly formats numeric types without
/// unnecessary trailing zeros.
///
/// ```
/// use polars::prelude::AnyValue;
/// use etl_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
/// assert_eq!(any_to_string(AnyValue::Float64(1.50)), "1.5");
/// assert_eq!(any_to_string(AnyValue::Boolean(true)), "true");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    any_to_value(value).to_string()
}

/// Converts an `AnyValue` to `f64`, returning `None` for non-numeric or null values.
///
/// Handles integer types, floating-point types, and string parsing.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match any_to_value(value) {
        Value::Int(v) => Some(v as f64),
        Value::Float(v) => Some(v),
        Value::Text(s) => parse_f64(&s),
        Value::Null | Value::Bool(_) => None,
    }
}

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Parses a string as `i64`, returning `None` for invalid or empty strings.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// True for integer and floating-point dtypes. Booleans are not numeric.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// True for string columns, the categorical columns of the transform stages.
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String)
}

/// Read every cell of a column as a [`Value`].
pub fn column_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Value>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_value(column.get(idx)?));
    }
    Ok(values)
}

/// Read a numeric column as optional floats; nulls and NaN become `None`.
pub fn column_f64s(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    Ok(column_values(df, name)?
        .iter()
        .map(Value::as_f64)
        .collect())
}

/// Build a column from values, choosing the narrowest dtype that holds them.
///
/// All integers → `Int64`; integers and floats → `Float64`; all booleans →
/// `Boolean`; anything else (including all-null) → `String`.
pub fn values_to_column(name: &str, values: &[Value]) -> Column {
    let mut ints = true;
    let mut numbers = true;
    let mut bools = true;
    let mut non_null = 0usize;
    for value in values {
        match value {
            Value::Null => continue,
            Value::Int(_) => bools = false,
            Value::Float(_) => {
                ints = false;
                bools = false;
            }
            Value::Bool(_) => {
                ints = false;
                numbers = false;
            }
            Value::Text(_) => {
                ints = false;
                numbers = false;
                bools = false;
            }
        }
        non_null += 1;
    }

    if non_null > 0 && ints {
        let data: Vec<Option<i64>> = values
            .iter()
            .map(|value| match value {
                Value::Int(v) => Some(*v),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), data).into_column();
    }
    if non_null > 0 && numbers {
        let data: Vec<Option<f64>> = values.iter().map(Value::as_f64).collect();
        return Series::new(name.into(), data).into_column();
    }
    if non_null > 0 && bools {
        let data: Vec<Option<bool>> = values
            .iter()
            .map(|value| match value {
                Value::Bool(v) => Some(*v),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), data).into_column();
    }
    let data: Vec<Option<String>> = values
        .iter()
        .map(|value| match value {
            Value::Null => None,
            Value::Float(v) => Some(format_numeric(*v)),
            other => Some(other.to_string()),
        })
        .collect();
    Series::new(name.into(), data).into_column()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_value_scalars() {
        assert_eq!(any_to_value(AnyValue::Null), Value::Null);
        assert_eq!(any_to_value(AnyValue::Int32(42)), Value::Int(42));
        assert_eq!(any_to_value(AnyValue::UInt64(7)), Value::Int(7));
        assert_eq!(any_to_value(AnyValue::Float64(2.5)), Value::Float(2.5));
        assert_eq!(any_to_value(AnyValue::Float64(f64::NAN)), Value::Null);
        assert_eq!(any_to_value(AnyValue::Boolean(false)), Value::Bool(false));
        assert_eq!(
            any_to_value(AnyValue::String("hello")),
            Value::Text("hello".to_string())
        );
    }

    #[test]
    fn test_any_to_f64() {
        assert_eq!(any_to_f64(AnyValue::Null), None);
        assert_eq!(any_to_f64(AnyValue::Int32(42)), Some(42.0));
        assert_eq!(any_to_f64(AnyValue::String("2.5")), Some(2.5));
        assert_eq!(any_to_f64(AnyValue::String("invalid")), None);
        assert_eq!(any_to_f64(AnyValue::Boolean(true)), None);
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_f64("  3.25  "), Some(3.25));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_i64("  -100  "), Some(-100));
        assert_eq!(parse_i64("1.5"), None);
    }

    #[test]
    fn test_values_to_column_dtypes() {
        let ints = values_to_column("a", &[Value::Int(1), Value::Null]);
        assert_eq!(ints.dtype(), &DataType::Int64);

        let floats = values_to_column("b", &[Value::Int(1), Value::Float(0.5)]);
        assert_eq!(floats.dtype(), &DataType::Float64);

        let bools = values_to_column("c", &[Value::Bool(true), Value::Null]);
        assert_eq!(bools.dtype(), &DataType::Boolean);

        let mixed = values_to_column("d", &[Value::Int(1), Value::from("x")]);
        assert_eq!(mixed.dtype(), &DataType::String);

        let empty = values_to_column("e", &[Value::Null, Value::Null]);
        assert_eq!(empty.dtype(), &DataType::String);
        assert_eq!(empty.null_count(), 2);
    }

    #[test]
    fn test_column_values_round_trip() {
        let column = values_to_column("score", &[Value::Float(1.5), Value::Null]);
        let df = DataFrame::new(vec![column]).unwrap();
        assert_eq!(
            column_values(&df, "score").unwrap(),
            vec![Value::Float(1.5), Value::Null]
        );
        assert_eq!(column_f64s(&df, "score").unwrap(), vec![Some(1.5), None]);
    }
}
