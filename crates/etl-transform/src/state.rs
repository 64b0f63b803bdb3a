//! The working table carried between transform stages.

use etl_common::{is_numeric_dtype, is_text_dtype};
use polars::prelude::DataFrame;

use crate::error::{Result, TransformError};

/// A named table owned by one pipeline run.
#[derive(Debug, Clone)]
pub struct TableState {
    /// Table name, used in logs and error messages.
    pub name: String,
    /// The table contents.
    pub data: DataFrame,
}

impl TableState {
    pub fn new(name: impl Into<String>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Same table name, new contents.
    #[must_use]
    pub fn with_data(self, data: DataFrame) -> Self {
        Self {
            name: self.name,
            data,
        }
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Integer and float columns, in table order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_where(is_numeric_dtype)
    }

    /// String columns, in table order. Booleans are neither numeric nor
    /// categorical.
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_where(is_text_dtype)
    }

    /// Fail with [`TransformError::UnknownColumn`] unless `column` exists.
    pub fn require_column(&self, column: &str) -> Result<()> {
        if self.data.column(column).is_ok() {
            Ok(())
        } else {
            Err(TransformError::UnknownColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
        }
    }

    fn columns_where(&self, keep: fn(&polars::prelude::DataType) -> bool) -> Vec<String> {
        self.data
            .get_columns()
            .iter()
            .filter(|column| keep(column.dtype()))
            .map(|column| column.name().to_string())
            .collect()
    }
}
