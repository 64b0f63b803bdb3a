//! Conversion between raw records and Polars frames.

use etl_common::{column_values, values_to_column};
use etl_model::{RawRecord, Value, column_union};
use polars::prelude::{Column, DataFrame};
use tracing::debug;

use crate::error::Result;

/// Build a frame from records. Columns are the union of record columns in
/// first-appearance order; a record missing a column contributes a null.
/// Each column gets the narrowest dtype holding its values (`Int64`,
/// `Float64`, `Boolean`, otherwise `String`).
pub fn build_frame(records: &[RawRecord]) -> Result<DataFrame> {
    let names = column_union(records);
    let mut columns: Vec<Column> = Vec::with_capacity(names.len());
    for name in &names {
        let values: Vec<Value> = records
            .iter()
            .map(|record| record.get(name).cloned().unwrap_or_default())
            .collect();
        columns.push(values_to_column(name, &values));
    }
    let df = DataFrame::new(columns)?;
    debug!(rows = df.height(), columns = df.width(), "built record frame");
    Ok(df)
}

/// Read a frame back into records, one per row, in column order.
pub fn frame_records(df: &DataFrame) -> Result<Vec<RawRecord>> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    let mut records: Vec<RawRecord> = (0..df.height())
        .map(|_| RawRecord::with_capacity(names.len()))
        .collect();
    for name in &names {
        for (record, value) in records.iter_mut().zip(column_values(df, name)?) {
            record.insert(name.clone(), value);
        }
    }
    Ok(records)
}
