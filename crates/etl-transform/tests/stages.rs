//! Tests for the statistical transform stages.

use etl_common::{column_f64s, column_values};
use etl_model::Value;
use etl_transform::{
    ImputeOptions, TableState, deduplicate, encode_categorical, filter_outliers,
    impute_by_clustering, missing_report, normalize, standardize, uppercase_text,
};
use polars::df;
use polars::prelude::DataType;
use proptest::prelude::*;

fn table(data: polars::prelude::DataFrame) -> TableState {
    TableState::new("orders", data)
}

#[test]
fn dedupe_keeps_first_occurrence_in_order() {
    let state = table(
        df! {
            "id" => [1i64, 2, 1, 3, 2],
            "status" => [Some("new"), None, Some("new"), Some("done"), None],
        }
        .unwrap(),
    );
    let out = deduplicate(state).unwrap();
    assert_eq!(out.height(), 3);
    assert_eq!(
        column_values(&out.data, "id").unwrap(),
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn dedupe_distinguishes_rows_differing_in_one_column() {
    let state = table(
        df! {
            "id" => [1i64, 1],
            "qty" => [2i64, 3],
        }
        .unwrap(),
    );
    assert_eq!(deduplicate(state).unwrap().height(), 2);
}

#[test]
fn dedupe_keeps_rows_whose_cells_only_concatenate_equal() {
    let state = table(
        df! {
            "a" => ["x\u{1f}s:y", "x"],
            "b" => ["z", "y\u{1f}s:z"],
        }
        .unwrap(),
    );
    assert_eq!(deduplicate(state).unwrap().height(), 2);
}

#[test]
fn impute_leaves_complete_table_untouched() {
    let data = df! {
        "price" => [1.0, 2.0, 3.0],
        "status" => ["a", "b", "c"],
    }
    .unwrap();
    let out = impute_by_clustering(table(data.clone()), ImputeOptions::default()).unwrap();
    assert!(out.data.equals(&data));
}

#[test]
fn impute_fills_from_the_matching_cluster() {
    let state = table(
        df! {
            "price" => [Some(1.0), Some(1.2), None, Some(100.0), Some(101.0), None],
            "weight" => [1.0, 1.1, 1.05, 500.0, 510.0, 505.0],
            "status" => [Some("low"), Some("low"), None, Some("high"), Some("high"), None],
        }
        .unwrap(),
    );
    let out = impute_by_clustering(
        state,
        ImputeOptions {
            n_clusters: 2,
            seed: 42,
        },
    )
    .unwrap();

    let price = column_f64s(&out.data, "price").unwrap();
    assert!((price[2].unwrap() - 1.1).abs() < 1e-9);
    assert!((price[5].unwrap() - 100.5).abs() < 1e-9);
    assert_eq!(
        column_values(&out.data, "status").unwrap(),
        ["low", "low", "low", "high", "high", "high"]
            .map(Value::from)
            .to_vec()
    );
    assert_eq!(missing_report(&out).total(), 0);
}

#[test]
fn impute_handles_huge_magnitudes() {
    let state = table(
        df! {
            "x" => [Some(1e200), Some(-1e200), Some(0.0), None],
        }
        .unwrap(),
    );
    let options = ImputeOptions {
        n_clusters: 2,
        seed: 42,
    };
    let out = impute_by_clustering(state, options).unwrap();
    let values = column_f64s(&out.data, "x").unwrap();
    assert_eq!(&values[..3], &[Some(1e200), Some(-1e200), Some(0.0)]);
    // the null row sits at 0 and joins one extreme; its cluster mean is half
    // of that extreme
    let filled = values[3].unwrap();
    assert!((filled.abs() / 5e199 - 1.0).abs() < 1e-12);
}

#[test]
fn impute_without_numeric_columns_uses_table_mode() {
    let state = table(
        df! {
            "status" => [Some("a"), Some("b"), Some("b"), None],
        }
        .unwrap(),
    );
    let out = impute_by_clustering(state, ImputeOptions::default()).unwrap();
    assert_eq!(
        column_values(&out.data, "status").unwrap()[3],
        Value::from("b")
    );
}

#[test]
fn normalize_maps_extremes_to_unit_interval() {
    let state = table(
        df! {
            "price" => [Some(10i64), Some(20), None, Some(30)],
            "flat" => [5.0, 5.0, 5.0, 5.0],
            "name" => ["a", "b", "c", "d"],
        }
        .unwrap(),
    );
    let out = normalize(state).unwrap();
    assert_eq!(
        column_f64s(&out.data, "price").unwrap(),
        vec![Some(0.0), Some(0.5), None, Some(1.0)]
    );
    assert_eq!(column_f64s(&out.data, "flat").unwrap(), vec![Some(0.0); 4]);
    assert_eq!(out.data.column("name").unwrap().dtype(), &DataType::String);
}

#[test]
fn normalize_survives_ranges_wider_than_f64() {
    let state = table(df! { "x" => [1e308, -1e308, 0.0] }.unwrap());
    let out = normalize(state).unwrap();
    assert_eq!(
        column_f64s(&out.data, "x").unwrap(),
        vec![Some(1.0), Some(0.0), Some(0.5)]
    );
}

#[test]
fn standardize_survives_extreme_spread() {
    let state = table(df! { "x" => [1e308, -1e308] }.unwrap());
    let out = standardize(state).unwrap();
    let values: Vec<f64> = column_f64s(&out.data, "x")
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(values.len(), 2);
    assert!(values.iter().all(|v| v.is_finite()));
    assert!(values[0] > 0.0 && values[1] < 0.0);
    assert!((values[0] + values[1]).abs() < 1e-12);
}

#[test]
fn standardize_uses_sample_deviation() {
    let state = table(
        df! {
            "score" => [2.0, 4.0, 6.0],
            "flat" => [1i64, 1, 1],
        }
        .unwrap(),
    );
    let out = standardize(state).unwrap();
    // mean 4, sample sd 2
    assert_eq!(
        column_f64s(&out.data, "score").unwrap(),
        vec![Some(-1.0), Some(0.0), Some(1.0)]
    );
    assert_eq!(column_f64s(&out.data, "flat").unwrap(), vec![Some(0.0); 3]);
}

#[test]
fn outlier_filter_drops_only_the_extreme_row() {
    let mut values: Vec<f64> = (0..19).map(|i| 10.0 + f64::from(i % 3) * 0.1).collect();
    values.push(1000.0);
    let ids: Vec<i64> = (1..=20).collect();
    let state = table(
        df! {
            "id" => ids,
            "amount" => values,
        }
        .unwrap(),
    );
    let out = filter_outliers(state, 3.0).unwrap();
    assert_eq!(out.height(), 19);
    assert!(
        !column_values(&out.data, "id")
            .unwrap()
            .contains(&Value::Int(20))
    );
}

#[test]
fn outlier_filter_ignores_constant_columns() {
    let state = table(df! { "amount" => [7.0, 7.0, 7.0] }.unwrap());
    assert_eq!(filter_outliers(state, 0.5).unwrap().height(), 3);
}

#[test]
fn one_hot_columns_are_sorted_and_appended() {
    let state = table(
        df! {
            "color" => [Some("red"), Some("blue"), None],
            "qty" => [1i64, 2, 3],
        }
        .unwrap(),
    );
    let out = encode_categorical(state).unwrap();
    assert_eq!(out.column_names(), ["qty", "color_blue", "color_red"]);
    assert_eq!(
        column_values(&out.data, "color_red").unwrap(),
        vec![Value::Bool(true), Value::Bool(false), Value::Bool(false)]
    );
}

#[test]
fn one_hot_rejects_colliding_names() {
    let state = table(
        df! {
            "color" => ["red"],
            "color_red" => [1i64],
        }
        .unwrap(),
    );
    let err = encode_categorical(state).unwrap_err();
    assert!(err.to_string().contains("color_red"));
}

#[test]
fn uppercase_touches_only_text() {
    let state = table(
        df! {
            "name" => [Some("ada"), None],
            "qty" => [1i64, 2],
        }
        .unwrap(),
    );
    let out = uppercase_text(state).unwrap();
    assert_eq!(
        column_values(&out.data, "name").unwrap(),
        vec![Value::from("ADA"), Value::Null]
    );
    assert_eq!(
        column_values(&out.data, "qty").unwrap(),
        vec![Value::Int(1), Value::Int(2)]
    );
}

#[test]
fn missing_report_counts_per_column() {
    let state = table(
        df! {
            "a" => [Some(1i64), None, None],
            "b" => [Some("x"), Some("y"), None],
        }
        .unwrap(),
    );
    let report = missing_report(&state);
    assert_eq!(report.get("a"), Some(2));
    assert_eq!(report.get("b"), Some(1));
    assert_eq!(report.total(), 3);
    let frame = report.to_frame().unwrap();
    assert_eq!(frame.shape(), (2, 2));
}

proptest! {
    #[test]
    fn normalized_values_stay_in_unit_interval(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..40)) {
        let state = table(df! { "x" => values }.unwrap());
        let out = normalize(state).unwrap();
        for value in column_f64s(&out.data, "x").unwrap().into_iter().flatten() {
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }
}
