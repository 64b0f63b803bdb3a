use etl_common::column_f64s;
use tracing::{debug, info};

use super::filter_rows;
use crate::error::Result;
use crate::state::TableState;
use crate::stats::{mean, observed, scaled_offset, stdev};

pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Drop rows where any numeric column's absolute z-score exceeds
/// `z_threshold`.
///
/// Z-scores use the population standard deviation. Null cells and columns
/// with zero variance never cause a row to be dropped.
pub fn filter_outliers(state: TableState, z_threshold: f64) -> Result<TableState> {
    let height = state.height();
    let mut keep = vec![true; height];
    for name in state.numeric_columns() {
        let values = column_f64s(&state.data, &name)?;
        let present = observed(&values);
        let (Some(center), Some(sd)) = (mean(&present), stdev(&present, 0)) else {
            continue;
        };
        if sd == 0.0 {
            debug!(table = %state.name, column = %name, "zero variance, no outliers");
            continue;
        }
        for (flag, value) in keep.iter_mut().zip(&values) {
            if let Some(v) = value
                && scaled_offset(*v, center, sd).abs() > z_threshold
            {
                *flag = false;
            }
        }
    }

    let data = filter_rows(&state.data, &keep)?;
    info!(
        table = %state.name,
        z_threshold,
        dropped = height - data.height(),
        "filtered outliers"
    );
    Ok(state.with_data(data))
}
