//! Column reconciliation against the built-in schemas.

use etl_map::reconcile;
use etl_model::{RawRecord, Value};
use etl_standards::SchemaRegistry;
use proptest::prelude::*;

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e6..1.0e6f64).prop_map(Value::Float),
        "[a-z]{0,8}".prop_map(Value::Text),
    ]
}

fn record_strategy() -> impl Strategy<Value = RawRecord> {
    let column = prop_oneof![
        Just("id".to_string()),
        Just("email".to_string()),
        Just("order_id".to_string()),
        Just("price".to_string()),
        Just("shipping_address".to_string()),
        "[a-z_]{1,10}",
    ];
    prop::collection::vec((column, value_strategy()), 0..20)
        .prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #[test]
    fn projection_width_matches_declared_columns(
        records in prop::collection::vec(record_strategy(), 0..15),
        entity_idx in 0usize..13,
    ) {
        let registry = SchemaRegistry::builtin();
        let schema = &registry.schemas()[entity_idx];
        let projection = reconcile(&records, schema);

        prop_assert_eq!(projection.columns.as_slice(), schema.columns());
        prop_assert_eq!(projection.len(), records.len());
        for row in &projection.rows {
            prop_assert_eq!(row.len(), schema.columns().len());
        }
    }

    #[test]
    fn present_columns_are_copied(records in prop::collection::vec(record_strategy(), 1..10)) {
        let registry = SchemaRegistry::builtin();
        let schema = registry.schema_for("user").unwrap();
        let projection = reconcile(&records, schema);
        for (idx, record) in records.iter().enumerate() {
            for column in schema.columns() {
                let expected = record.get(column).cloned().unwrap_or_default();
                prop_assert_eq!(projection.value(idx, column), Some(&expected));
            }
        }
    }
}

#[test]
fn wide_flat_row_splits_into_order_detail() {
    let registry = SchemaRegistry::builtin();
    let record = RawRecord::new()
        .with("id", 1)
        .with("username", "ada")
        .with("order_id", 10)
        .with("product_id", 5)
        .with("quantity", 2)
        .with("name", "Widget")
        .with("shipping_address", "1 Main St")
        .with("supplier_name", "Acme");

    let detail = reconcile(
        std::slice::from_ref(&record),
        registry.schema_for("order_detail").unwrap(),
    );
    assert_eq!(detail.width(), 19);
    assert_eq!(detail.value(0, "order_id"), Some(&Value::Int(10)));
    assert_eq!(detail.value(0, "user_id"), Some(&Value::Null));
    assert_eq!(detail.value(0, "username"), Some(&Value::from("ada")));
    assert!(detail.column_index("supplier_name").is_none());

    let inventory = reconcile(&[record], registry.schema_for("inventory").unwrap());
    assert_eq!(
        inventory.columns,
        vec![
            "product_id",
            "quantity_available",
            "restock_date",
            "supplier_name",
            "supplier_contact"
        ]
    );
    assert_eq!(inventory.value(0, "supplier_name"), Some(&Value::from("Acme")));
}
