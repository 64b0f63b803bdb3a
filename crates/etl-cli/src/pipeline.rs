//! Pipeline stage functions behind the `etl` subcommands.
//!
//! Each function covers one step (read, split and load, transform, write)
//! so the commands stay thin and the steps can be tested on their own.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use etl_common::column_values;
use etl_ingest::{build_frame, read_csv_records, read_key_values};
use etl_load::{Sink, load_all};
use etl_model::{RawRecord, ValidationResult};
use etl_standards::{DEFAULT_SPLIT, SchemaRegistry};
use etl_transform::{PipelineSpec, TableState};
use etl_validate::split_and_validate;
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use crate::types::{EntitySummary, LoadStatus};

/// Extensions read as a single `key=value` record instead of CSV.
const KEY_VALUE_EXTENSIONS: &[&str] = &["kv", "env", "properties"];

/// Read source records from a CSV or key=value file.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let is_key_value = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            KEY_VALUE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        });
    if is_key_value {
        let record = read_key_values(path)
            .with_context(|| format!("read key=value file {}", path.display()))?;
        return Ok(vec![record]);
    }
    let csv = read_csv_records(path).with_context(|| format!("read CSV {}", path.display()))?;
    Ok(csv.records)
}

/// Built-in registry, extended with the schemas of `schemas` when given.
pub fn build_registry(schemas: Option<&Path>) -> Result<SchemaRegistry> {
    let registry = SchemaRegistry::builtin();
    match schemas {
        Some(path) => registry
            .with_toml_file(path)
            .with_context(|| format!("load schemas from {}", path.display())),
        None => Ok(registry),
    }
}

/// Requested entity names, lowercased and deduplicated in order. An empty
/// request means the default split.
pub fn requested_entities(requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        return DEFAULT_SPLIT.iter().map(ToString::to_string).collect();
    }
    let mut seen = BTreeSet::new();
    requested
        .iter()
        .map(|name| name.trim().to_lowercase())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Split `records` into the requested entities, validate them and hand the
/// results to `sink`. With no sink only validation runs.
///
/// Summaries come back in entity name order, the order entities are loaded.
pub fn split_and_load(
    records: &[RawRecord],
    registry: &SchemaRegistry,
    entities: &[String],
    sink: Option<&mut dyn Sink>,
) -> Vec<EntitySummary> {
    let mut unknown: BTreeMap<String, String> = BTreeMap::new();
    let mut validated: BTreeMap<String, ValidationResult> = BTreeMap::new();
    for (entity, outcome) in split_and_validate(records, registry, entities) {
        match outcome {
            Ok(result) => {
                validated.insert(entity, result);
            }
            Err(error) => {
                unknown.insert(entity, error.to_string());
            }
        }
    }

    let mut statuses: BTreeMap<String, LoadStatus> = match sink {
        Some(sink) => {
            for entity in validated.keys() {
                if let Ok(schema) = registry.schema_for(entity) {
                    sink.declare(schema);
                }
            }
            load_all(sink, &validated)
                .into_iter()
                .map(|(entity, outcome)| {
                    let status = match outcome {
                        Ok(rows) => LoadStatus::Loaded(rows),
                        Err(error) => LoadStatus::Failed(error.to_string()),
                    };
                    (entity, status)
                })
                .collect()
        }
        None => validated
            .keys()
            .map(|entity| (entity.clone(), LoadStatus::Validated))
            .collect(),
    };

    let mut summaries: Vec<EntitySummary> = validated
        .into_iter()
        .map(|(entity, result)| EntitySummary {
            status: statuses
                .remove(&entity)
                .unwrap_or(LoadStatus::Validated),
            records: result.record_count(),
            warnings: result.warning_count(),
            failures: result.failures,
            entity,
        })
        .collect();
    summaries.extend(unknown.into_iter().map(|(entity, message)| EntitySummary {
        entity,
        records: 0,
        failures: Vec::new(),
        warnings: 0,
        status: LoadStatus::Unknown(message),
    }));
    summaries.sort_by(|a, b| a.entity.cmp(&b.entity));
    summaries
}

/// Run the pipeline declared by `spec` over `records`.
///
/// Side tables named in the pipeline file are read and framed before any stage runs.
pub fn run_transform(records: &[RawRecord], spec: &PipelineSpec, name: &str) -> Result<TableState> {
    spec.check().context("check pipeline")?;
    let mut pipeline = spec.pipeline();
    for (table, path) in &spec.tables {
        let side = read_records(path).with_context(|| format!("read side table '{table}'"))?;
        let data = build_frame(&side).with_context(|| format!("frame side table '{table}'"))?;
        debug!(table = %table, rows = data.height(), "loaded side table");
        pipeline = pipeline.with_table(table.clone(), TableState::new(table.clone(), data));
    }

    let data = build_frame(records).context("build record frame")?;
    let span = info_span!("transform", table = name, stages = pipeline.stages().len());
    let _guard = span.enter();
    let state = pipeline
        .run(TableState::new(name, data))
        .context("run pipeline")?;
    info!(rows = state.height(), columns = state.width(), "pipeline finished");
    Ok(state)
}

/// Write a frame as CSV with a header row. Nulls become empty cells.
pub fn write_csv(data: &DataFrame, path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    let names: Vec<String> = data
        .get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    writer.write_record(&names).context("write header")?;

    let columns = names
        .iter()
        .map(|name| column_values(data, name))
        .collect::<Result<Vec<_>, _>>()
        .context("read frame columns")?;
    for row in 0..data.height() {
        writer
            .write_record(columns.iter().map(|values| values[row].to_string()))
            .with_context(|| format!("write row {row}"))?;
    }
    writer.flush().context("flush CSV")?;
    info!(path = %path.display(), rows = data.height(), "wrote CSV");
    Ok(())
}
