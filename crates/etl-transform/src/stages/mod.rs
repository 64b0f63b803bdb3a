//! Statistical transform stages.
//!
//! Every stage takes ownership of a [`TableState`](crate::TableState) and
//! returns the transformed table. Numeric stages only touch integer and float
//! columns, categorical stages only string columns.

mod dedupe;
mod encode;
mod impute;
mod missing;
mod outliers;
mod scale;
mod text;

pub use dedupe::deduplicate;
pub use encode::encode_categorical;
pub use impute::{DEFAULT_N_CLUSTERS, DEFAULT_SEED, ImputeOptions, impute_by_clustering};
pub use missing::{MissingReport, missing_report};
pub use outliers::{DEFAULT_Z_THRESHOLD, filter_outliers};
pub use scale::{normalize, standardize};
pub use text::uppercase_text;

use polars::prelude::{BooleanChunked, DataFrame, NamedFrom, NewChunkedArray, Series};

use crate::error::Result;

pub(crate) fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

pub(crate) fn set_f64_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}
