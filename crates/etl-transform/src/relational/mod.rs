//! Aggregation, filtering and enrichment.

mod aggregate;
mod enrich;
mod predicate;

pub use aggregate::{AggFunc, aggregate};
pub use enrich::enrich;
pub use predicate::{CompareOp, Predicate, filter};
