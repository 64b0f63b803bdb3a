//! Data model for the ETL pipeline: raw values and records, entity schemas,
//! typed records and validation results.

pub mod record;
pub mod schema;
pub mod typed;
pub mod validation;
pub mod value;

pub use record::{RawRecord, column_union};
pub use schema::{Field, FieldKind, Schema, nested_column};
pub use typed::{TypedRecord, TypedValue};
pub use validation::{CoercionFailure, ValidationResult, ValidationWarning};
pub use value::{Value, format_numeric};
