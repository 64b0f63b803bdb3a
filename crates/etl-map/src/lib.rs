#![deny(unsafe_code)]

//! Column reconciliation.
//!
//! [`reconcile`] narrows a batch of raw records to the declared columns of one
//! schema. The result always has exactly the schema's columns, in declared
//! order, whatever columns the source carried.

mod projection;

pub use projection::{Projection, reconcile};
