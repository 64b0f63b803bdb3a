use tracing::info;

use polars::prelude::{NamedFrom, Series};

use crate::error::Result;
use crate::state::TableState;

/// Uppercase every value of every string column. Other columns are left as
/// they are.
pub fn uppercase_text(state: TableState) -> Result<TableState> {
    let mut data = state.data.clone();
    let columns = state.categorical_columns();
    for name in &columns {
        let upper: Vec<Option<String>> = data
            .column(name)?
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_uppercase))
            .collect();
        data.with_column(Series::new(name.as_str().into(), upper))?;
    }
    info!(table = %state.name, columns = columns.len(), "uppercased text columns");
    Ok(state.with_data(data))
}
