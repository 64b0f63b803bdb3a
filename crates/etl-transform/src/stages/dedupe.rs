use std::collections::HashSet;

use etl_common::column_values;
use tracing::info;

use super::filter_rows;
use crate::error::Result;
use crate::state::TableState;

/// Remove rows that repeat an earlier row across every column. The first
/// occurrence is kept and row order is preserved. Nulls compare equal.
pub fn deduplicate(state: TableState) -> Result<TableState> {
    let height = state.height();
    if height == 0 {
        return Ok(state);
    }
    let names = state.column_names();
    let mut keys: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(names.len()); height];
    for name in &names {
        for (key, value) in keys.iter_mut().zip(column_values(&state.data, name)?) {
            key.push(value.group_key());
        }
    }

    let mut seen = HashSet::with_capacity(height);
    let keep: Vec<bool> = keys.into_iter().map(|key| seen.insert(key)).collect();
    let data = filter_rows(&state.data, &keep)?;
    info!(
        table = %state.name,
        before = height,
        after = data.height(),
        "deduplicated rows"
    );
    Ok(state.with_data(data))
}
