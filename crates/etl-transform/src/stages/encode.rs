use std::collections::BTreeSet;

use etl_common::column_values;
use polars::prelude::{NamedFrom, Series};
use tracing::info;

use crate::error::{Result, TransformError};
use crate::state::TableState;

/// One-hot encode every string column.
///
/// Each categorical column is replaced by boolean indicator columns named
/// `<column>_<category>`, one per distinct observed value in sorted order.
/// Indicator columns are appended after the remaining columns; a null cell is
/// `false` in every indicator.
pub fn encode_categorical(state: TableState) -> Result<TableState> {
    let mut data = state.data.clone();
    let columns = state.categorical_columns();

    let mut indicators: Vec<Series> = Vec::new();
    for name in &columns {
        let values = column_values(&data, name)?;
        let categories: BTreeSet<String> = values
            .iter()
            .filter(|value| !value.is_null())
            .map(ToString::to_string)
            .collect();
        for category in &categories {
            let flags: Vec<bool> = values
                .iter()
                .map(|value| !value.is_null() && value.to_string() == *category)
                .collect();
            indicators.push(Series::new(format!("{name}_{category}").into(), flags));
        }
        data.drop_in_place(name)?;
    }

    let added = indicators.len();
    for indicator in indicators {
        if data.column(indicator.name()).is_ok() {
            return Err(TransformError::DuplicateColumn {
                column: indicator.name().to_string(),
            });
        }
        data.with_column(indicator)?;
    }
    info!(
        table = %state.name,
        encoded = columns.len(),
        indicators = added,
        "one-hot encoded categorical columns"
    );
    Ok(state.with_data(data))
}
