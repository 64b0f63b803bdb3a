use std::path::Path;

use etl_model::{RawRecord, Value};
use tracing::{info, warn};

use crate::error::{IngestError, Result};

/// Parse `key=value` lines into one record, keys in first-seen order.
///
/// Blank lines and lines starting with `#` are ignored. Lines without
/// exactly one `=` are skipped with a warning. A repeated key keeps its
/// first position and takes the later value.
pub fn parse_key_values(contents: &str) -> RawRecord {
    let mut record = RawRecord::new();
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            warn!(line = idx + 1, "skipping malformed key=value line");
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            warn!(line = idx + 1, "skipping key=value line without a key");
            continue;
        }
        record.insert(key, Value::infer(value.trim()));
    }
    record
}

/// Read a `key=value` file as a single record.
pub fn read_key_values(path: &Path) -> Result<RawRecord> {
    let contents = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let record = parse_key_values(&contents);
    info!(path = %path.display(), fields = record.len(), "read key=value record");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_malformed_lines() {
        let record = parse_key_values("id=7\n\n# comment\nbroken\na=b=c\nname = ada \n=x\n");
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["id", "name"]);
        assert_eq!(record.get("id"), Some(&Value::Int(7)));
        assert_eq!(record.get("name"), Some(&Value::from("ada")));
    }

    #[test]
    fn repeated_key_takes_last_value() {
        let record = parse_key_values("a=1\nb=2\na=3\n");
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&Value::Int(3)));
    }
}
