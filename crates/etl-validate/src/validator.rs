use etl_map::Projection;
use etl_model::{
    CoercionFailure, Field, FieldKind, Schema, TypedRecord, TypedValue, ValidationResult,
    ValidationWarning, Value, nested_column,
};
use etl_standards::SchemaRegistry;
use tracing::{info, warn};

use crate::coerce::coerce;

/// Validation context.
///
/// Nested fields are resolved through the registry at validation time, so a
/// validator can check any schema the registry knows.
pub struct Validator<'a> {
    registry: &'a SchemaRegistry,
}

/// Per-row accumulator for failures and warnings.
struct RowReport<'r> {
    row: usize,
    result: &'r mut ValidationResult,
}

impl RowReport<'_> {
    fn failure(&mut self, field: String, value: &Value, reason: String) {
        self.result.failures.push(CoercionFailure {
            row: self.row,
            field,
            value: value.clone(),
            reason,
        });
    }

    fn missing(&mut self, field: String) {
        self.result
            .warnings
            .push(ValidationWarning::MissingRequired {
                row: self.row,
                field,
            });
    }
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Validate every row of `projection` against `schema`.
    ///
    /// One typed record is emitted per input row, holding exactly the
    /// schema's fields in declared order.
    pub fn validate(&self, projection: &Projection, schema: &Schema) -> ValidationResult {
        let mut result = ValidationResult::new(schema.name());
        result.records.reserve(projection.len());

        for (row, values) in projection.rows.iter().enumerate() {
            let lookup = |column: &str| -> Value {
                projection
                    .column_index(column)
                    .and_then(|idx| values.get(idx))
                    .cloned()
                    .unwrap_or_default()
            };
            let mut report = RowReport {
                row,
                result: &mut result,
            };
            let record = self.typed_record(schema, &lookup, &mut report);
            result.records.push(record);
        }

        if !result.failures.is_empty() {
            warn!(
                entity = schema.name(),
                failures = result.failure_count(),
                rows = result.failed_rows().len(),
                "coercion failures nulled"
            );
        }
        info!(
            entity = schema.name(),
            records = result.record_count(),
            failures = result.failure_count(),
            warnings = result.warning_count(),
            "validated entity"
        );
        result
    }

    fn typed_record(
        &self,
        schema: &Schema,
        lookup: &dyn Fn(&str) -> Value,
        report: &mut RowReport<'_>,
    ) -> TypedRecord {
        let mut fields = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let value = match &field.kind {
                FieldKind::Nested(entity) => self.nested_value(field, entity, lookup, report),
                _ => scalar_value(field, &field.name, &lookup(&field.name), report),
            };
            fields.push((field.name.clone(), value));
        }
        TypedRecord::new(schema.name(), fields)
    }

    /// Assemble a nested record from sibling columns of the same row.
    fn nested_value(
        &self,
        field: &Field,
        entity: &str,
        lookup: &dyn Fn(&str) -> Value,
        report: &mut RowReport<'_>,
    ) -> TypedValue {
        let nested = match self.registry.schema_for(entity) {
            Ok(nested) => nested,
            Err(error) => {
                report.failure(field.name.clone(), &Value::Null, error.to_string());
                return TypedValue::Null;
            }
        };

        let raw: Vec<(&Field, Value)> = nested
            .fields()
            .iter()
            .map(|nested_field| {
                let value = if nested_field.kind.is_nested() {
                    Value::Null
                } else {
                    lookup(&nested_column(nested, nested_field))
                };
                (nested_field, value)
            })
            .collect();
        if raw.iter().all(|(_, value)| value.is_blank()) {
            if !field.nullable {
                report.missing(field.name.clone());
            }
            return TypedValue::Null;
        }

        let fields = raw
            .iter()
            .map(|(nested_field, value)| {
                let path = format!("{}.{}", field.name, nested_field.name);
                let typed = scalar_value(nested_field, &path, value, report);
                (nested_field.name.clone(), typed)
            })
            .collect();
        TypedValue::Record(Box::new(TypedRecord::new(nested.name(), fields)))
    }
}

fn scalar_value(field: &Field, path: &str, value: &Value, report: &mut RowReport<'_>) -> TypedValue {
    if field.kind.is_nested() {
        return TypedValue::Null;
    }
    match coerce(value, &field.kind) {
        Ok(TypedValue::Null) => {
            if !field.nullable {
                report.missing(path.to_string());
            }
            TypedValue::Null
        }
        Ok(typed) => typed,
        Err(error) => {
            report.failure(path.to_string(), value, error.to_string());
            TypedValue::Null
        }
    }
}
