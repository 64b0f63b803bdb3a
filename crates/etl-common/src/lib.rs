//! Shared utilities for the ETL crates.
//!
//! This crate provides the bridge between Polars `AnyValue`s and the
//! pipeline's own [`etl_model::Value`] plus column classification helpers.

pub mod anyvalue;

// Re-export commonly used functions at crate root for convenience
pub use anyvalue::{
    any_to_f64, any_to_string, any_to_value, column_f64s, column_values, is_numeric_dtype,
    is_text_dtype, parse_f64, parse_i64, values_to_column,
};
