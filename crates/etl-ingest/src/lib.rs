//! Record extraction for the ETL pipeline.
//!
//! Readers produce [`RawRecord`](etl_model::RawRecord)s in source column
//! order; [`build_frame`] and [`frame_records`] move between records and a
//! Polars `DataFrame` for the transform stages.

pub mod csv_records;
pub mod error;
pub mod frame;
pub mod key_values;

pub use csv_records::{CsvRecords, read_csv_records, read_csv_str};
pub use error::{IngestError, Result};
pub use frame::{build_frame, frame_records};
pub use key_values::{parse_key_values, read_key_values};
