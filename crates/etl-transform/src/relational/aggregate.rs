use std::fmt;
use std::str::FromStr;

use etl_common::is_numeric_dtype;
use polars::prelude::{Expr, IntoLazy, col};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TransformError};
use crate::state::TableState;

/// Aggregation applied to each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggFunc {
    Sum,
    Mean,
    Min,
    Max,
    Count,
    First,
    Last,
}

impl AggFunc {
    pub fn as_str(self) -> &'static str {
        match self {
            AggFunc::Sum => "sum",
            AggFunc::Mean => "mean",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Count => "count",
            AggFunc::First => "first",
            AggFunc::Last => "last",
        }
    }

    fn needs_numeric(self) -> bool {
        matches!(self, AggFunc::Sum | AggFunc::Mean)
    }

    fn expr(self, column: &str) -> Expr {
        let base = col(column);
        match self {
            AggFunc::Sum => base.sum(),
            AggFunc::Mean => base.mean(),
            AggFunc::Min => base.min(),
            AggFunc::Max => base.max(),
            AggFunc::Count => base.count(),
            AggFunc::First => base.first(),
            AggFunc::Last => base.last(),
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggFunc {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(AggFunc::Sum),
            "mean" | "avg" => Ok(AggFunc::Mean),
            "min" => Ok(AggFunc::Min),
            "max" => Ok(AggFunc::Max),
            "count" => Ok(AggFunc::Count),
            "first" => Ok(AggFunc::First),
            "last" => Ok(AggFunc::Last),
            other => Err(format!("unknown aggregation '{other}'")),
        }
    }
}

/// Group by `group_by` and reduce `column` with `func`.
///
/// Output has one row per group, in order of first appearance, with the group
/// column followed by the aggregated column. The aggregated column keeps its
/// name unless it is the group column, in which case it is suffixed with the
/// function name.
pub fn aggregate(
    state: TableState,
    group_by: &str,
    column: &str,
    func: AggFunc,
) -> Result<TableState> {
    state.require_column(group_by)?;
    state.require_column(column)?;
    let dtype = state.data.column(column)?.dtype().clone();
    if func.needs_numeric() && !is_numeric_dtype(&dtype) {
        return Err(TransformError::InvalidStage {
            stage: "aggregate".to_string(),
            message: format!("{func} needs a numeric column, '{column}' is {dtype}"),
        });
    }

    let output = if column == group_by {
        format!("{column}_{func}")
    } else {
        column.to_string()
    };
    let data = state
        .data
        .clone()
        .lazy()
        .group_by_stable([col(group_by)])
        .agg([func.expr(column).alias(output.as_str())])
        .collect()?;
    info!(
        table = %state.name,
        group_by,
        column,
        func = func.as_str(),
        groups = data.height(),
        "aggregated rows"
    );
    Ok(state.with_data(data))
}
