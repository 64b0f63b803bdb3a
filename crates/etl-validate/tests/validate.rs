use etl_map::reconcile;
use etl_model::{RawRecord, TypedValue, ValidationWarning, Value};
use etl_standards::{RegistryError, SchemaRegistry};
use etl_validate::{Validator, split_and_validate};

fn user_row() -> RawRecord {
    RawRecord::new()
        .with("id", 1)
        .with("username", "ada")
        .with("email", "ada@example.com")
        .with("is_active", true)
        .with("created_at", "2024-01-01")
}

fn validate(entity: &str, records: &[RawRecord]) -> etl_model::ValidationResult {
    let registry = SchemaRegistry::builtin();
    let schema = registry.schema_for(entity).expect("schema");
    let projection = reconcile(records, schema);
    Validator::new(&registry).validate(&projection, schema)
}

#[test]
fn complete_user_row_is_clean() {
    let result = validate("user", &[user_row()]);
    assert_eq!(result.record_count(), 1);
    assert!(result.is_clean());
    let record = &result.records[0];
    assert_eq!(record.get("id"), Some(&TypedValue::Integer(1)));
    assert_eq!(record.get("is_active"), Some(&TypedValue::Boolean(true)));
}

#[test]
fn missing_optional_field_is_null_without_failure() {
    let row = RawRecord::new()
        .with("id", 2)
        .with("username", "bob")
        .with("is_active", "yes");
    let result = validate("user", &[row]);
    assert_eq!(result.failure_count(), 0);
    assert_eq!(result.warning_count(), 0);
    let record = &result.records[0];
    assert_eq!(record.get("email"), Some(&TypedValue::Null));
    assert_eq!(record.get("is_active"), Some(&TypedValue::Boolean(true)));
}

#[test]
fn missing_key_is_null_with_warning() {
    let row = RawRecord::new().with("username", "nobody").with("id", "  ");
    let result = validate("user", &[row]);
    assert_eq!(result.record_count(), 1);
    assert_eq!(result.records[0].get("id"), Some(&TypedValue::Null));
    assert_eq!(
        result.warnings,
        vec![ValidationWarning::MissingRequired {
            row: 0,
            field: "id".to_string()
        }]
    );
}

#[test]
fn every_record_has_exactly_the_declared_fields() {
    let registry = SchemaRegistry::builtin();
    let rows = vec![user_row(), RawRecord::new().with("unrelated", 5)];
    for schema in registry.schemas() {
        let projection = reconcile(&rows, schema);
        let result = Validator::new(&registry).validate(&projection, schema);
        assert_eq!(result.record_count(), rows.len());
        for record in &result.records {
            let names: Vec<&str> = record.field_names().collect();
            let declared: Vec<&str> = schema.field_names().collect();
            assert_eq!(names, declared, "{}", schema.name());
        }
    }
}

#[test]
fn uncoercible_values_are_nulled_and_reported() {
    let row = user_row()
        .with("id", "abc")
        .with("is_active", "maybe");
    let result = validate("user", &[user_row(), row]);
    assert_eq!(result.record_count(), 2);
    assert_eq!(result.failed_rows(), vec![1]);
    assert_eq!(result.records[1].get("id"), Some(&TypedValue::Null));
    assert_eq!(
        result.records[1].get("username"),
        Some(&TypedValue::Text("ada".to_string()))
    );
    insta::assert_json_snapshot!(result.failures, @r#"
    [
      {
        "row": 1,
        "field": "id",
        "value": "abc",
        "reason": "cannot read text `abc` as integer"
      },
      {
        "row": 1,
        "field": "is_active",
        "value": "maybe",
        "reason": "cannot read text `maybe` as boolean"
      }
    ]
    "#);
}

#[test]
fn wishlist_product_ids_parse_or_empty() {
    let rows = vec![
        RawRecord::new().with("id", 1).with("product_ids", "[3, 4]"),
        RawRecord::new().with("id", 2).with("product_ids", "3;x"),
    ];
    let result = validate("wishlist", &rows);
    assert!(result.is_clean());
    assert_eq!(
        result.records[0].get("product_ids"),
        Some(&TypedValue::IntegerList(vec![3, 4]))
    );
    assert_eq!(
        result.records[1].get("product_ids"),
        Some(&TypedValue::IntegerList(vec![]))
    );
}

#[test]
fn order_detail_builds_nested_records() {
    let row = RawRecord::new()
        .with("order_id", 10)
        .with("quantity", "two")
        .with("id", 1)
        .with("user_id", 1)
        .with("username", "ada")
        .with("shipping_address", "1 Main St");
    let result = validate("order_detail", &[row]);
    let record = &result.records[0];

    let order = record
        .get("order")
        .and_then(TypedValue::as_record)
        .expect("order record");
    assert_eq!(order.entity(), "order");
    assert_eq!(order.get("order_id"), Some(&TypedValue::Integer(10)));
    assert_eq!(order.get("user_id"), Some(&TypedValue::Integer(1)));
    assert_eq!(order.get("quantity"), Some(&TypedValue::Null));

    let user = record
        .get("user")
        .and_then(TypedValue::as_record)
        .expect("user record");
    assert_eq!(user.get("id"), Some(&TypedValue::Integer(1)));

    // Every product column is absent.
    assert_eq!(record.get("product"), Some(&TypedValue::Null));
    assert_eq!(
        record.get("shipping_address"),
        Some(&TypedValue::Text("1 Main St".to_string()))
    );

    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.failures[0].field, "order.quantity");
    assert_eq!(result.failures[0].value, Value::from("two"));
}

#[test]
fn split_reports_unknown_entities_separately() {
    let registry = SchemaRegistry::builtin();
    let outcomes = split_and_validate(&[user_row()], &registry, &["User", "invoice", "product"]);
    assert_eq!(
        outcomes.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["invoice", "product", "user"]
    );
    assert!(matches!(
        outcomes["invoice"],
        Err(RegistryError::UnknownEntity { .. })
    ));
    let user = outcomes["user"].as_ref().expect("user outcome");
    assert_eq!(user.record_count(), 1);
    let product = outcomes["product"].as_ref().expect("product outcome");
    assert_eq!(product.record_count(), 1);
    assert_eq!(product.warning_count(), 1);
}
