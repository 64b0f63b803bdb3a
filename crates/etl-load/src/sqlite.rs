//! SQLite sink.
//!
//! Each entity becomes one table named after it. A load drops and recreates
//! the table inside a single transaction, so a failed load leaves the previous
//! contents of that table in place.

use std::collections::BTreeMap;
use std::path::Path;

use etl_model::{FieldKind, Schema, TypedRecord, TypedValue};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::sink::Sink;

/// Writes entity tables to a SQLite database.
#[derive(Debug)]
pub struct SqliteSink {
    conn: Connection,
    /// Declared field kinds per entity; used for column affinities.
    layouts: BTreeMap<String, Vec<(String, &'static str)>>,
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_connection(conn))
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::Open {
            path: ":memory:".into(),
            source,
        })?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            layouts: BTreeMap::new(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Rows currently stored for `entity`.
    pub fn row_count(&self, entity: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote(entity));
        self.conn
            .query_row(&sql, [], |row| row.get::<_, i64>(0))
            .map(|count| usize::try_from(count).unwrap_or_default())
            .map_err(|source| write_error(entity, source))
    }

    /// Column layout for a batch: the declared one if known, otherwise the
    /// first record's fields with affinities read from the values.
    fn layout(&self, entity: &str, records: &[TypedRecord]) -> Vec<(String, &'static str)> {
        if let Some(layout) = self.layouts.get(entity) {
            return layout.clone();
        }
        let Some(first) = records.first() else {
            return Vec::new();
        };
        first
            .field_names()
            .map(|name| {
                let kind = records
                    .iter()
                    .filter_map(|record| record.get(name))
                    .find(|value| !value.is_null())
                    .map_or("", value_affinity);
                (name.to_string(), kind)
            })
            .collect()
    }
}

impl Sink for SqliteSink {
    /// Declared columns get the affinities of their field kinds, even when
    /// every value is null.
    fn declare(&mut self, schema: &Schema) {
        let layout = schema
            .fields()
            .iter()
            .map(|field| (field.name.clone(), affinity(&field.kind)))
            .collect();
        self.layouts.insert(schema.name().to_string(), layout);
    }

    fn replace_table(&mut self, entity: &str, records: &[TypedRecord]) -> Result<()> {
        let layout = self.layout(entity, records);
        let rows = records
            .iter()
            .enumerate()
            .map(|(row, record)| encode_row(entity, row, record, &layout))
            .collect::<Result<Vec<_>>>()?;

        let table = quote(entity);
        let tx = self
            .conn
            .transaction()
            .map_err(|source| write_error(entity, source))?;
        tx.execute(&format!("DROP TABLE IF EXISTS {table}"), [])
            .map_err(|source| write_error(entity, source))?;
        if layout.is_empty() {
            debug!(entity, "no columns known, table left absent");
        } else {
            let columns: Vec<String> = layout
                .iter()
                .map(|(name, kind)| format!("{} {kind}", quote(name)).trim_end().to_string())
                .collect();
            tx.execute(
                &format!("CREATE TABLE {table} ({})", columns.join(", ")),
                [],
            )
            .map_err(|source| write_error(entity, source))?;

            let names: Vec<String> = layout.iter().map(|(name, _)| quote(name)).collect();
            let placeholders: Vec<String> =
                (1..=layout.len()).map(|idx| format!("?{idx}")).collect();
            let mut insert = tx
                .prepare(&format!(
                    "INSERT INTO {table} ({}) VALUES ({})",
                    names.join(", "),
                    placeholders.join(", ")
                ))
                .map_err(|source| write_error(entity, source))?;
            for row in rows {
                insert
                    .execute(params_from_iter(row))
                    .map_err(|source| write_error(entity, source))?;
            }
        }
        tx.commit().map_err(|source| write_error(entity, source))?;
        info!(entity, rows = records.len(), "replaced table");
        Ok(())
    }
}

fn write_error(entity: &str, source: rusqlite::Error) -> StorageError {
    StorageError::Write {
        entity: entity.to_string(),
        source,
    }
}

/// Double-quoted SQL identifier.
fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn affinity(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Integer | FieldKind::Boolean => "INTEGER",
        FieldKind::Float => "REAL",
        FieldKind::Text | FieldKind::IntegerList | FieldKind::Nested(_) => "TEXT",
    }
}

fn value_affinity(value: &TypedValue) -> &'static str {
    match value {
        TypedValue::Integer(_) | TypedValue::Boolean(_) => "INTEGER",
        TypedValue::Float(_) => "REAL",
        TypedValue::Null
        | TypedValue::Text(_)
        | TypedValue::IntegerList(_)
        | TypedValue::Record(_) => "TEXT",
    }
}

fn encode_row(
    entity: &str,
    row: usize,
    record: &TypedRecord,
    layout: &[(String, &'static str)],
) -> Result<Vec<SqlValue>> {
    if record.len() != layout.len() {
        return Err(StorageError::Layout {
            entity: entity.to_string(),
            row,
        });
    }
    layout
        .iter()
        .map(|(name, _)| {
            let value = record.get(name).ok_or_else(|| StorageError::Layout {
                entity: entity.to_string(),
                row,
            })?;
            sql_value(value).map_err(|source| StorageError::Encode {
                entity: entity.to_string(),
                field: name.clone(),
                source,
            })
        })
        .collect()
}

/// Lists and nested records are stored as JSON text; booleans as 0/1.
fn sql_value(value: &TypedValue) -> serde_json::Result<SqlValue> {
    Ok(match value {
        TypedValue::Null => SqlValue::Null,
        TypedValue::Integer(v) => SqlValue::Integer(*v),
        TypedValue::Float(v) => SqlValue::Real(*v),
        TypedValue::Boolean(v) => SqlValue::Integer(i64::from(*v)),
        TypedValue::Text(v) => SqlValue::Text(v.clone()),
        TypedValue::IntegerList(v) => SqlValue::Text(serde_json::to_string(v)?),
        TypedValue::Record(v) => SqlValue::Text(serde_json::to_string(v.as_ref())?),
    })
}
