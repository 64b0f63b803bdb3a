use std::collections::BTreeSet;

use etl_common::values_to_column;
use etl_model::{RawRecord, Schema, Value};
use polars::prelude::{Column, DataFrame, PolarsResult};
use tracing::debug;

/// Records aligned to one schema's declared columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub entity: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Projection {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    /// Cell at `row` for `column`; `None` when either is out of range.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|values| values.get(idx))
    }

    /// Row `idx` as an ordered record.
    pub fn record(&self, idx: usize) -> Option<RawRecord> {
        let row = self.rows.get(idx)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }

    /// Columnar form for the transform stages.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<Value> = self.rows.iter().map(|row| row[idx].clone()).collect();
                values_to_column(name, &values)
            })
            .collect();
        DataFrame::new(columns)
    }
}

/// Align `records` to the declared columns of `schema`.
///
/// Present columns are copied, missing ones become [`Value::Null`], and
/// columns the schema does not declare are dropped. Never fails.
pub fn reconcile(records: &[RawRecord], schema: &Schema) -> Projection {
    let columns: Vec<String> = schema.columns().to_vec();
    let rows: Vec<Vec<Value>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(column).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    let declared: BTreeSet<&str> = columns.iter().map(String::as_str).collect();
    let dropped: BTreeSet<&str> = records
        .iter()
        .flat_map(RawRecord::columns)
        .filter(|column| !declared.contains(column))
        .collect();
    debug!(
        entity = schema.name(),
        rows = rows.len(),
        columns = columns.len(),
        dropped = dropped.len(),
        "reconciled records"
    );

    Projection {
        entity: schema.name().to_string(),
        columns,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use etl_model::Field;

    use super::*;

    fn schema() -> Schema {
        Schema::new(
            "user",
            vec![Field::integer("id").required(), Field::text("email")],
        )
    }

    #[test]
    fn empty_input_keeps_headers() {
        let projection = reconcile(&[], &schema());
        assert!(projection.is_empty());
        assert_eq!(projection.columns, vec!["id", "email"]);
        let frame = projection.to_frame().unwrap();
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 0);
    }

    #[test]
    fn record_round_trips_declared_order() {
        let records = vec![RawRecord::new().with("email", "a@b.c").with("id", 3)];
        let projection = reconcile(&records, &schema());
        let record = projection.record(0).unwrap();
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["id", "email"]);
        assert_eq!(projection.value(0, "id"), Some(&Value::Int(3)));
    }
}
