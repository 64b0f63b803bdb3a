use std::collections::BTreeMap;

use etl_map::reconcile;
use etl_model::{RawRecord, ValidationResult};
use etl_standards::{RegistryError, SchemaRegistry};
use tracing::{info_span, warn};

use crate::validator::Validator;

/// Reconcile and validate `records` for each requested entity.
///
/// Outcomes are keyed by the lowercased entity name. An unknown entity only
/// fails its own entry; every other entity still completes.
pub fn split_and_validate<S: AsRef<str>>(
    records: &[RawRecord],
    registry: &SchemaRegistry,
    entities: &[S],
) -> BTreeMap<String, Result<ValidationResult, RegistryError>> {
    let validator = Validator::new(registry);
    let mut outcomes = BTreeMap::new();
    for entity in entities {
        let name = entity.as_ref().trim().to_lowercase();
        let span = info_span!("split", entity = %name);
        let _guard = span.enter();
        let outcome = registry.schema_for(&name).map(|schema| {
            let projection = reconcile(records, schema);
            validator.validate(&projection, schema)
        });
        if let Err(error) = &outcome {
            warn!(%error, "skipping entity");
        }
        outcomes.insert(name, outcome);
    }
    outcomes
}
