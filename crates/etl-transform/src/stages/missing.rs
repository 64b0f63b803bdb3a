use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::state::TableState;

/// Null count per column, in table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingReport {
    pub table: String,
    pub counts: Vec<(String, usize)>,
}

impl MissingReport {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn get(&self, column: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, count)| *count)
    }

    /// Two-column frame: `column` and `missing`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let names: Vec<&str> = self.counts.iter().map(|(name, _)| name.as_str()).collect();
        let counts: Vec<i64> = self
            .counts
            .iter()
            .map(|(_, count)| i64::try_from(*count).unwrap_or(i64::MAX))
            .collect();
        let columns: Vec<Column> = vec![
            Series::new("column".into(), names).into_column(),
            Series::new("missing".into(), counts).into_column(),
        ];
        Ok(DataFrame::new(columns)?)
    }
}

pub fn missing_report(state: &TableState) -> MissingReport {
    let counts: Vec<(String, usize)> = state
        .data
        .get_columns()
        .iter()
        .map(|column| (column.name().to_string(), column.null_count()))
        .collect();
    let report = MissingReport {
        table: state.name.clone(),
        counts,
    };
    info!(table = %state.name, missing = report.total(), "checked missing values");
    report
}
