use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use etl_model::{RawRecord, Value};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// Rows of a delimited source, one [`RawRecord`] per data row.
#[derive(Debug, Clone, Default)]
pub struct CsvRecords {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl CsvRecords {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn normalize_header(raw: &str, idx: usize) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let normalized = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        format!("column_{}", idx + 1)
    } else {
        normalized
    }
}

fn normalize_cell(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}')
}

/// Read a CSV file with a header row. Cells are trimmed and inferred into
/// [`Value`]s; short rows are padded with nulls and blank rows skipped.
pub fn read_csv_records(path: &Path) -> Result<CsvRecords> {
    let file = File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_records(file, path)?;
    info!(
        path = %path.display(),
        columns = records.headers.len(),
        rows = records.len(),
        "read csv records"
    );
    Ok(records)
}

/// Same as [`read_csv_records`] over in-memory text.
pub fn read_csv_str(contents: &str) -> Result<CsvRecords> {
    read_records(contents.as_bytes(), Path::new("<inline>"))
}

fn read_records<R: Read>(source: R, path: &Path) -> Result<CsvRecords> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut headers: Option<Vec<String>> = None;
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.records() {
        let row = row.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        if row.iter().all(|cell| normalize_cell(cell).is_empty()) {
            skipped += 1;
            continue;
        }
        let Some(columns) = headers.as_ref() else {
            headers = Some(read_header(&row, path)?);
            continue;
        };
        let mut record = RawRecord::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            let value = row
                .get(idx)
                .map(|cell| Value::infer(normalize_cell(cell)))
                .unwrap_or_default();
            record.insert(column.clone(), value);
        }
        records.push(record);
    }

    if skipped > 0 {
        debug!(path = %path.display(), skipped, "skipped blank rows");
    }
    Ok(CsvRecords {
        headers: headers.unwrap_or_default(),
        records,
    })
}

fn read_header(row: &csv::StringRecord, path: &Path) -> Result<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut headers = Vec::with_capacity(row.len());
    for (idx, cell) in row.iter().enumerate() {
        let header = normalize_header(cell, idx);
        if !seen.insert(header.clone()) {
            return Err(IngestError::DuplicateColumn {
                column: header,
                path: path.to_path_buf(),
            });
        }
        headers.push(header);
    }
    Ok(headers)
}
