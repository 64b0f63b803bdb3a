#![deny(unsafe_code)]

//! Validation of reconciled records against entity schemas.
//!
//! A row is never rejected: values that cannot be coerced to their declared
//! type are nulled and reported as [`CoercionFailure`]s, and required fields
//! that are absent are emitted as null with a [`ValidationWarning`].
//!
//! [`CoercionFailure`]: etl_model::CoercionFailure
//! [`ValidationWarning`]: etl_model::ValidationWarning

pub mod coerce;
pub mod split;
pub mod validator;

pub use coerce::{CoercionError, coerce, parse_integer_list};
pub use split::split_and_validate;
pub use validator::Validator;
