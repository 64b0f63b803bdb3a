//! Validation outcomes.

use serde::Serialize;

use crate::{TypedRecord, Value};

/// A field whose raw value could not be converted to its declared type.
///
/// The field was nulled in the emitted record; the row itself was kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoercionFailure {
    /// Zero-based row index within the batch.
    pub row: usize,
    /// Field path; nested fields use dotted paths (`order.quantity`).
    pub field: String,
    pub value: Value,
    pub reason: String,
}

/// Non-fatal observations that are not type failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// A non-nullable field had no value and was emitted as null.
    MissingRequired { row: usize, field: String },
}

impl ValidationWarning {
    pub fn field(&self) -> &str {
        match self {
            ValidationWarning::MissingRequired { field, .. } => field,
        }
    }
}

/// Typed records for one schema plus the audit trail of what was repaired.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    pub entity: String,
    pub records: Vec<TypedRecord>,
    pub failures: Vec<CoercionFailure>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }

    /// Rows with at least one coercion failure, ascending and unique.
    pub fn failed_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.failures.iter().map(|failure| failure.row).collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }
}
