//! Group-by aggregation for category charts
//!
//! Missing values convention: `count` counts every row of the group, while
//! `sum` and `mean` only see rows whose numeric value is present. A group
//! with no numeric values has `sum = 0` and no mean.

use crate::config::AggregationConfig;
use crate::error::{InsightError, InsightResult};
use crate::types::{Column, GroupKey, Table, Value};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Summary of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    /// Category value; `Missing` collects rows without a category
    pub category: Value,
    pub sum: f64,
    pub mean: Option<f64>,
    pub count: usize,
}

/// Group `numbers` by the values of `category`, in first-encountered order
pub(crate) fn group_by(category: &Column, numbers: &[Option<f64>]) -> Vec<AggregateRow> {
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut rows: Vec<AggregateRow> = Vec::new();
    let mut present: Vec<usize> = Vec::new();

    for (row, number) in numbers.iter().enumerate() {
        let value = category.values.get(row);
        let slot = *slots.entry(value.group_key()).or_insert_with(|| {
            rows.push(AggregateRow {
                category: value.clone(),
                sum: 0.0,
                mean: None,
                count: 0,
            });
            present.push(0);
            rows.len() - 1
        });

        let group = &mut rows[slot];
        group.count += 1;
        if let Some(n) = number {
            group.sum += n;
            present[slot] += 1;
        }
    }

    for (group, &n) in rows.iter_mut().zip(&present) {
        if n > 0 {
            group.mean = Some(group.sum / n as f64);
        }
    }
    rows
}

/// Sort descending by sum; ties keep first-encountered order and NaN sums
/// (`inf + -inf`) go last
pub(crate) fn sort_by_sum_desc(rows: &mut [AggregateRow]) {
    rows.sort_by(|a, b| match (a.sum.is_nan(), b.sum.is_nan()) {
        (false, false) => b.sum.partial_cmp(&a.sum).unwrap_or(Ordering::Equal),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    });
}

/// Aggregate `numeric_column` per value of `category_column`.
///
/// Returns at most `config.top_n` rows, descending by sum. Either column
/// missing is an error; a non-numeric value column yields no rows.
pub fn aggregate_by_category(
    table: &Table,
    category_column: &str,
    numeric_column: &str,
    config: &AggregationConfig,
) -> InsightResult<Vec<AggregateRow>> {
    let category = table
        .column(category_column)
        .ok_or_else(|| InsightError::column_not_found(category_column, table))?;
    let value = table
        .column(numeric_column)
        .ok_or_else(|| InsightError::column_not_found(numeric_column, table))?;

    let Some(numbers) = value.values.numbers() else {
        warn!(
            column = numeric_column,
            storage = value.values.type_name(),
            "aggregation skipped: value column is not numeric"
        );
        return Ok(Vec::new());
    };

    let mut rows = group_by(category, &numbers);
    let groups = rows.len();
    sort_by_sum_desc(&mut rows);
    rows.truncate(config.top_n);
    debug!(
        category = category_column,
        value = numeric_column,
        groups,
        kept = rows.len(),
        "aggregated by category"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnValue;

    fn text(values: &[Option<&str>]) -> ColumnValue {
        ColumnValue::Text(values.iter().map(|v| v.map(str::to_string)).collect())
    }

    #[test]
    fn test_missing_category_forms_group() {
        let table = Table::from_columns(vec![
            Column::new("store", text(&[Some("A"), None, Some("A"), None])),
            Column::new("sales", ColumnValue::Integer(vec![Some(1), Some(10), Some(2), Some(20)])),
        ])
        .unwrap();
        let rows = aggregate_by_category(&table, "store", "sales", &AggregationConfig::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, Value::Missing);
        assert_eq!(rows[0].sum, 30.0);
        assert_eq!(rows[1].category, Value::Text("A".into()));
        assert_eq!(rows[1].count, 2);
    }

    #[test]
    fn test_count_includes_missing_values() {
        let table = Table::from_columns(vec![
            Column::new("store", text(&[Some("A"), Some("A"), Some("A")])),
            Column::new("sales", ColumnValue::Float(vec![Some(4.0), None, Some(8.0)])),
        ])
        .unwrap();
        let rows = aggregate_by_category(&table, "store", "sales", &AggregationConfig::default()).unwrap();
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[0].sum, 12.0);
        assert_eq!(rows[0].mean, Some(6.0));
    }

    #[test]
    fn test_all_missing_group_has_no_mean() {
        let table = Table::from_columns(vec![
            Column::new("store", text(&[Some("A"), Some("B")])),
            Column::new("sales", ColumnValue::Float(vec![Some(1.0), None])),
        ])
        .unwrap();
        let rows = aggregate_by_category(&table, "store", "sales", &AggregationConfig::default()).unwrap();
        assert_eq!(rows[1].category, Value::Text("B".into()));
        assert_eq!(rows[1].sum, 0.0);
        assert_eq!(rows[1].mean, None);
        assert_eq!(rows[1].count, 1);
    }

    #[test]
    fn test_ties_keep_first_encountered_order() {
        let table = Table::from_columns(vec![
            Column::new("store", text(&[Some("B"), Some("A"), Some("C")])),
            Column::new("sales", ColumnValue::Integer(vec![Some(5), Some(5), Some(9)])),
        ])
        .unwrap();
        let rows = aggregate_by_category(&table, "store", "sales", &AggregationConfig::default()).unwrap();
        let order: Vec<String> = rows.iter().map(|r| r.category.to_string()).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_unknown_column_is_error() {
        let table = Table::from_columns(vec![Column::new("store", text(&[Some("A")]))]).unwrap();
        let err = aggregate_by_category(&table, "store", "sales", &AggregationConfig::default())
            .unwrap_err();
        assert!(matches!(err, InsightError::ColumnNotFound { ref column, .. } if column == "sales"));
    }

    #[test]
    fn test_non_numeric_value_column_is_empty() {
        let table = Table::from_columns(vec![
            Column::new("store", text(&[Some("A")])),
            Column::new("note", text(&[Some("x")])),
        ])
        .unwrap();
        let rows = aggregate_by_category(&table, "store", "note", &AggregationConfig::default()).unwrap();
        assert!(rows.is_empty());
    }
}
