//! Category aggregation tests

use pretty_assertions::assert_eq;
use sales_insight::config::AggregationConfig;
use sales_insight::core::{aggregate_by_category, AggregateRow};
use sales_insight::error::InsightError;
use sales_insight::types::{Column, ColumnValue, Table, Value};

fn text(values: &[Option<&str>]) -> ColumnValue {
    ColumnValue::Text(values.iter().map(|v| v.map(str::to_string)).collect())
}

#[test]
fn test_region_sums_sorted_descending() {
    let table = Table::from_columns(vec![
        Column::new("region", text(&[Some("N"), Some("N"), Some("S"), Some("S"), Some("S")])),
        Column::new(
            "revenue",
            ColumnValue::Integer(vec![Some(10), Some(20), Some(30), Some(40), Some(50)]),
        ),
    ])
    .unwrap();

    let rows = aggregate_by_category(&table, "region", "revenue", &AggregationConfig::default()).unwrap();
    assert_eq!(
        rows,
        vec![
            AggregateRow {
                category: Value::Text("S".into()),
                sum: 120.0,
                mean: Some(40.0),
                count: 3,
            },
            AggregateRow {
                category: Value::Text("N".into()),
                sum: 30.0,
                mean: Some(15.0),
                count: 2,
            },
        ]
    );
}

#[test]
fn test_top_fifteen_kept() {
    let n = 40;
    let table = Table::from_columns(vec![
        Column::new(
            "product",
            ColumnValue::Text((0..n).map(|i| Some(format!("p{:02}", i))).collect()),
        ),
        Column::new(
            "revenue",
            ColumnValue::Float((0..n).map(|i| Some(((i * 37) % n) as f64)).collect()),
        ),
    ])
    .unwrap();

    let rows = aggregate_by_category(&table, "product", "revenue", &AggregationConfig::default()).unwrap();
    assert_eq!(rows.len(), 15);
    assert!(rows.windows(2).all(|w| w[0].sum >= w[1].sum));
    assert_eq!(rows[0].sum, 39.0);
    assert_eq!(rows[14].sum, 25.0);
}

#[test]
fn test_ties_keep_first_encountered_order() {
    let table = Table::from_columns(vec![
        Column::new("store", text(&[Some("b"), Some("a"), Some("c"), Some("a")])),
        Column::new(
            "revenue",
            ColumnValue::Float(vec![Some(5.0), Some(2.0), Some(9.0), Some(3.0)]),
        ),
    ])
    .unwrap();
    let rows = aggregate_by_category(&table, "store", "revenue", &AggregationConfig::default()).unwrap();
    let order: Vec<String> = rows.iter().map(|r| r.category.to_string()).collect();
    assert_eq!(order, vec!["c", "b", "a"]);
}

#[test]
fn test_nan_sum_sorts_last() {
    let table = Table::from_columns(vec![
        Column::new(
            "store",
            text(&[Some("w"), Some("w"), Some("x"), Some("y"), Some("z")]),
        ),
        Column::new(
            "revenue",
            ColumnValue::Float(vec![
                Some(f64::INFINITY),
                Some(f64::NEG_INFINITY),
                Some(1.0),
                Some(9.0),
                Some(5.0),
            ]),
        ),
    ])
    .unwrap();
    let rows = aggregate_by_category(&table, "store", "revenue", &AggregationConfig::default()).unwrap();
    let order: Vec<String> = rows.iter().map(|r| r.category.to_string()).collect();
    assert_eq!(order, vec!["y", "z", "x", "w"]);
    assert!(rows[3].sum.is_nan());
    assert!(rows[..3].windows(2).all(|w| w[0].sum >= w[1].sum));
}

#[test]
fn test_missing_values_convention() {
    let table = Table::from_columns(vec![
        Column::new("region", text(&[Some("N"), Some("N"), None, Some("E")])),
        Column::new(
            "revenue",
            ColumnValue::Float(vec![Some(10.0), None, Some(7.0), None]),
        ),
    ])
    .unwrap();
    let rows = aggregate_by_category(&table, "region", "revenue", &AggregationConfig::default()).unwrap();

    // count covers every row of the group; sum and mean skip missing values
    let north = rows.iter().find(|r| r.category == Value::Text("N".into())).unwrap();
    assert_eq!((north.sum, north.mean, north.count), (10.0, Some(10.0), 2));

    let missing = rows.iter().find(|r| r.category == Value::Missing).unwrap();
    assert_eq!((missing.sum, missing.count), (7.0, 1));

    let east = rows.iter().find(|r| r.category == Value::Text("E".into())).unwrap();
    assert_eq!((east.sum, east.mean, east.count), (0.0, None, 1));
}

#[test]
fn test_custom_top_n() {
    let table = Table::from_columns(vec![
        Column::new("k", text(&[Some("a"), Some("b"), Some("c")])),
        Column::new("v", ColumnValue::Integer(vec![Some(1), Some(2), Some(3)])),
    ])
    .unwrap();
    let rows = aggregate_by_category(&table, "k", "v", &AggregationConfig { top_n: 2 }).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].category, Value::Text("c".into()));
}

#[test]
fn test_unknown_column_is_error() {
    let table = Table::from_columns(vec![
        Column::new("region", text(&[Some("N")])),
        Column::new("revenue", ColumnValue::Integer(vec![Some(1)])),
    ])
    .unwrap();
    let err = aggregate_by_category(&table, "region", "profit", &AggregationConfig::default()).unwrap_err();
    match err {
        InsightError::ColumnNotFound { column, available } => {
            assert_eq!(column, "profit");
            assert_eq!(available, vec!["region", "revenue"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_text_value_column_yields_no_rows() {
    let table = Table::from_columns(vec![
        Column::new("region", text(&[Some("N"), Some("S")])),
        Column::new("label", text(&[Some("x"), Some("y")])),
    ])
    .unwrap();
    let rows = aggregate_by_category(&table, "region", "label", &AggregationConfig::default()).unwrap();
    assert!(rows.is_empty());
}
