use std::collections::{BTreeSet, HashMap};

use etl_common::{column_values, values_to_column};
use etl_model::Value;
use polars::prelude::{Column, DataFrame};
use tracing::info;

use crate::error::Result;
use crate::state::TableState;

/// Left-outer join `state` with `other` on the shared column `on`.
///
/// Left row order is preserved. Each left row yields one output row per
/// matching right row, or a single row with nulls in the right-hand columns.
/// Null keys never match. Non-key columns present on both sides get `_x`
/// (left) and `_y` (right) suffixes.
pub fn enrich(state: TableState, other: &TableState, on: &str) -> Result<TableState> {
    state.require_column(on)?;
    other.require_column(on)?;

    let left_names = state.column_names();
    let right_names: Vec<String> = other
        .column_names()
        .into_iter()
        .filter(|name| name != on)
        .collect();
    let left_set: BTreeSet<&str> = left_names.iter().map(String::as_str).collect();
    let overlap: BTreeSet<&str> = right_names
        .iter()
        .map(String::as_str)
        .filter(|name| left_set.contains(name))
        .collect();

    let mut right_index: HashMap<String, Vec<usize>> = HashMap::new();
    for (row, key) in column_values(&other.data, on)?.iter().enumerate() {
        if let Some(key) = key.group_key() {
            right_index.entry(key).or_default().push(row);
        }
    }

    // (left row, matching right row) pairs in output order.
    let mut pairs: Vec<(usize, Option<usize>)> = Vec::with_capacity(state.height());
    for (row, key) in column_values(&state.data, on)?.iter().enumerate() {
        match key.group_key().and_then(|key| right_index.get(&key)) {
            Some(matches) => pairs.extend(matches.iter().map(|&right| (row, Some(right)))),
            None => pairs.push((row, None)),
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(left_names.len() + right_names.len());
    for name in &left_names {
        let values = column_values(&state.data, name)?;
        let output = if overlap.contains(name.as_str()) {
            format!("{name}_x")
        } else {
            name.clone()
        };
        let joined: Vec<Value> = pairs.iter().map(|(left, _)| values[*left].clone()).collect();
        columns.push(values_to_column(&output, &joined));
    }
    for name in &right_names {
        let values = column_values(&other.data, name)?;
        let output = if overlap.contains(name.as_str()) {
            format!("{name}_y")
        } else {
            name.clone()
        };
        let joined: Vec<Value> = pairs
            .iter()
            .map(|(_, right)| right.map(|idx| values[idx].clone()).unwrap_or_default())
            .collect();
        columns.push(values_to_column(&output, &joined));
    }

    let data = DataFrame::new(columns)?;
    info!(
        table = %state.name,
        with = %other.name,
        on,
        rows = data.height(),
        unmatched = pairs.iter().filter(|(_, right)| right.is_none()).count(),
        "enriched rows"
    );
    Ok(state.with_data(data))
}
