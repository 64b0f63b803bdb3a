use etl_common::column_f64s;
use tracing::{debug, info};

use super::set_f64_column;
use crate::error::Result;
use crate::state::TableState;
use crate::stats::{mean, min_max, observed, scaled_offset, stdev, unit_position};

/// Min-max scale every numeric column into `[0, 1]`.
///
/// A column whose observed values are all equal becomes `0`. Nulls stay null.
/// Scaled columns are `Float64`.
pub fn normalize(state: TableState) -> Result<TableState> {
    let mut data = state.data.clone();
    let columns = state.numeric_columns();
    for name in &columns {
        let values = column_f64s(&data, name)?;
        let Some((min, max)) = min_max(&observed(&values)) else {
            continue;
        };
        let constant = min == max;
        if constant {
            debug!(table = %state.name, column = %name, "zero range, normalizing to 0");
        }
        let scaled: Vec<Option<f64>> = values
            .iter()
            .map(|value| {
                value.map(|v| {
                    if constant {
                        0.0
                    } else {
                        unit_position(v, min, max)
                    }
                })
            })
            .collect();
        set_f64_column(&mut data, name, scaled)?;
    }
    info!(table = %state.name, columns = columns.len(), "normalized numeric columns");
    Ok(state.with_data(data))
}

/// Center every numeric column on its mean and divide by the sample standard
/// deviation.
///
/// A column with zero or undefined deviation (fewer than two observed values)
/// becomes `0`. Nulls stay null.
pub fn standardize(state: TableState) -> Result<TableState> {
    let mut data = state.data.clone();
    let columns = state.numeric_columns();
    for name in &columns {
        let values = column_f64s(&data, name)?;
        let present = observed(&values);
        let Some(center) = mean(&present) else {
            continue;
        };
        let spread = stdev(&present, 1).filter(|sd| *sd > 0.0);
        if spread.is_none() {
            debug!(table = %state.name, column = %name, "zero variance, standardizing to 0");
        }
        let scaled: Vec<Option<f64>> = values
            .iter()
            .map(|value| value.map(|v| spread.map_or(0.0, |sd| scaled_offset(v, center, sd))))
            .collect();
        set_f64_column(&mut data, name, scaled)?;
    }
    info!(table = %state.name, columns = columns.len(), "standardized numeric columns");
    Ok(state.with_data(data))
}
