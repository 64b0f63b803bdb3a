use std::collections::BTreeMap;

use etl_model::{Schema, TypedRecord, ValidationResult};
use tracing::{error, info, info_span};

use crate::error::Result;

/// Destination for validated entity records.
pub trait Sink {
    /// Announce the schema of an entity before its records arrive. Sinks
    /// without a typed layout ignore it.
    fn declare(&mut self, _schema: &Schema) {}

    /// Replace everything stored for `entity` with `records`.
    fn replace_table(&mut self, entity: &str, records: &[TypedRecord]) -> Result<()>;
}

/// Keeps loaded tables in memory, keyed by entity.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: BTreeMap<String, Vec<TypedRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: &str) -> Option<&[TypedRecord]> {
        self.tables.get(entity).map(Vec::as_slice)
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn into_tables(self) -> BTreeMap<String, Vec<TypedRecord>> {
        self.tables
    }
}

impl Sink for MemorySink {
    fn replace_table(&mut self, entity: &str, records: &[TypedRecord]) -> Result<()> {
        self.tables.insert(entity.to_string(), records.to_vec());
        Ok(())
    }
}

/// Hand each entity's records to `sink`, in entity name order.
///
/// Returns the number of records written per entity. A failing entity does
/// not undo entities written before it.
pub fn load_all<S: Sink + ?Sized>(
    sink: &mut S,
    results: &BTreeMap<String, ValidationResult>,
) -> BTreeMap<String, Result<usize>> {
    let mut outcomes = BTreeMap::new();
    for (entity, result) in results {
        let span = info_span!("load", entity = %entity);
        let _guard = span.enter();
        let outcome = sink
            .replace_table(entity, &result.records)
            .map(|()| result.records.len());
        match &outcome {
            Ok(rows) => info!(rows, "loaded entity"),
            Err(error) => error!(%error, "failed to load entity"),
        }
        outcomes.insert(entity.clone(), outcome);
    }
    outcomes
}
