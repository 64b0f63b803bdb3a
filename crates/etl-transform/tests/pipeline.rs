//! Tests for aggregation, filtering, enrichment and TOML pipelines.

use std::path::Path;

use etl_common::column_values;
use etl_model::Value;
use etl_transform::{
    AggFunc, CompareOp, Pipeline, PipelineSpec, Predicate, Stage, TableState, TransformError,
    aggregate, enrich, filter,
};
use polars::df;
use polars::prelude::DataFrame;

fn orders() -> TableState {
    TableState::new(
        "order_detail",
        df! {
            "order_id" => [1i64, 2, 3, 4, 5],
            "user_id" => [Some(20i64), Some(10), Some(20), None, Some(30)],
            "total_price" => [5.0, 10.0, 7.5, 1.0, 2.0],
            "status" => ["new", "shipped", "shipped", "new", "cancelled"],
        }
        .unwrap(),
    )
}

fn users() -> TableState {
    TableState::new(
        "users",
        df! {
            "user_id" => [10i64, 20],
            "username" => ["ada", "bob"],
            "status" => ["active", "inactive"],
        }
        .unwrap(),
    )
}

fn values(data: &DataFrame, column: &str) -> Vec<Value> {
    column_values(data, column).unwrap()
}

#[test]
fn aggregate_groups_in_first_appearance_order() {
    let out = aggregate(orders(), "status", "total_price", AggFunc::Sum).unwrap();
    assert_eq!(out.column_names(), ["status", "total_price"]);
    assert_eq!(
        values(&out.data, "status"),
        ["new", "shipped", "cancelled"].map(Value::from).to_vec()
    );
    assert_eq!(
        values(&out.data, "total_price"),
        vec![Value::Float(6.0), Value::Float(17.5), Value::Float(2.0)]
    );
}

#[test]
fn aggregate_on_group_column_is_suffixed() {
    let out = aggregate(orders(), "status", "status", AggFunc::Count).unwrap();
    assert_eq!(out.column_names(), ["status", "status_count"]);
    assert_eq!(out.height(), 3);
}

#[test]
fn aggregate_rejects_sum_of_text_and_unknown_columns() {
    let err = aggregate(orders(), "user_id", "status", AggFunc::Mean).unwrap_err();
    assert!(matches!(err, TransformError::InvalidStage { .. }));

    let err = aggregate(orders(), "missing", "status", AggFunc::Count).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"column 'missing' not found in table 'order_detail'");
}

#[test]
fn filter_by_textual_condition() {
    let predicate: Predicate = "total_price >= 5".parse().unwrap();
    let out = filter(orders(), &predicate).unwrap();
    assert_eq!(
        values(&out.data, "order_id"),
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn filter_null_cells_never_match_comparisons() {
    let out = filter(orders(), &Predicate::compare("user_id", CompareOp::Ne, 20)).unwrap();
    assert_eq!(
        values(&out.data, "order_id"),
        vec![Value::Int(2), Value::Int(5)]
    );

    let out = filter(
        orders(),
        &Predicate::IsNull {
            column: "user_id".to_string(),
        },
    )
    .unwrap();
    assert_eq!(values(&out.data, "order_id"), vec![Value::Int(4)]);
}

#[test]
fn filter_combines_predicates() {
    let predicate = Predicate::All {
        predicates: vec![
            Predicate::compare("status", CompareOp::Eq, "shipped"),
            Predicate::compare("total_price", CompareOp::Lt, 8.0),
        ],
    };
    let out = filter(orders(), &predicate).unwrap();
    assert_eq!(values(&out.data, "order_id"), vec![Value::Int(3)]);
}

#[test]
fn filter_on_unknown_column_fails() {
    let predicate: Predicate = "discount > 0".parse().unwrap();
    let err = filter(orders(), &predicate).unwrap_err();
    assert!(matches!(err, TransformError::UnknownColumn { .. }));
}

#[test]
fn enrich_left_joins_with_suffixes() {
    let out = enrich(orders(), &users(), "user_id").unwrap();
    assert_eq!(out.height(), 5);
    assert_eq!(
        out.column_names(),
        [
            "order_id",
            "user_id",
            "total_price",
            "status_x",
            "username",
            "status_y"
        ]
    );
    assert_eq!(
        values(&out.data, "username"),
        vec![
            Value::from("bob"),
            Value::from("ada"),
            Value::from("bob"),
            Value::Null,
            Value::Null,
        ]
    );
    assert_eq!(values(&out.data, "status_x")[0], Value::from("new"));
    assert_eq!(values(&out.data, "status_y")[0], Value::from("inactive"));
}

#[test]
fn enrich_repeats_rows_for_multiple_matches() {
    let addresses = TableState::new(
        "addresses",
        df! {
            "user_id" => [20i64, 20],
            "city" => ["Oslo", "Bergen"],
        }
        .unwrap(),
    );
    let out = enrich(orders(), &addresses, "user_id").unwrap();
    // orders 1 and 3 each match twice
    assert_eq!(out.height(), 7);
    assert_eq!(
        values(&out.data, "order_id"),
        [1i64, 1, 2, 3, 3, 4, 5].map(Value::Int).to_vec()
    );
}

#[test]
fn pipeline_from_toml_runs_in_order() {
    let spec = PipelineSpec::from_toml_str(
        r#"
        name = "shipped revenue"

        [[step]]
        type = "filter"
        condition = "status == 'shipped'"

        [[step]]
        type = "enrich"
        table = "users"
        on = "user_id"

        [[step]]
        type = "aggregate"
        group_by = "username"
        column = "total_price"
        func = "sum"
        "#,
        Path::new("revenue.toml"),
    )
    .unwrap();
    let pipeline = spec.pipeline().with_table("users", users());
    let out = pipeline.run(orders()).unwrap();
    assert_eq!(out.name, "order_detail");
    assert_eq!(
        values(&out.data, "username"),
        vec![Value::from("ada"), Value::from("bob")]
    );
    assert_eq!(
        values(&out.data, "total_price"),
        vec![Value::Float(10.0), Value::Float(7.5)]
    );
}

#[test]
fn pipeline_stops_at_first_failing_stage() {
    let pipeline = Pipeline::new(vec![
        Stage::Dedupe,
        Stage::Enrich {
            table: "users".to_string(),
            on: "user_id".to_string(),
        },
        Stage::Uppercase,
    ]);
    let err = pipeline.run(orders()).unwrap_err();
    assert!(matches!(err, TransformError::UnknownTable { .. }));
}

#[test]
fn check_missing_replaces_table_with_report() {
    let out = Pipeline::new(vec![Stage::CheckMissing])
        .run(orders())
        .unwrap();
    assert_eq!(out.column_names(), ["column", "missing"]);
    assert_eq!(
        values(&out.data, "missing"),
        [0i64, 1, 0, 0].map(Value::Int).to_vec()
    );
}

#[test]
fn filter_step_needs_exactly_one_condition() {
    let pipeline = Pipeline::new(vec![Stage::Filter {
        condition: None,
        predicate: None,
    }]);
    let err = pipeline.run(orders()).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid filter step: set exactly one of `condition` or `predicate`"
    );
}

#[test]
fn load_resolves_side_tables_next_to_the_file() {
    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path();
    let path = dir.join("pipeline.toml");
    std::fs::write(
        &path,
        "[tables]\nusers = \"users.csv\"\n\n[[step]]\ntype = \"dedupe\"\n",
    )
    .unwrap();
    let spec = PipelineSpec::load(&path).unwrap();
    assert_eq!(spec.tables["users"], dir.join("users.csv"));
    assert_eq!(spec.steps, vec![Stage::Dedupe]);

    let err = PipelineSpec::load(&dir.join("absent.toml")).unwrap_err();
    assert!(matches!(err, TransformError::Io { .. }));
}
