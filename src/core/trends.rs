//! Trend summaries fed to the narrative generator

use crate::config::TrendConfig;
use crate::core::aggregate::{group_by, AggregateRow};
use crate::core::{dates, stats};
use crate::types::{cmp_missing_last, Table, Value};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// One grouped or overall metric
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Insight {
    /// Revenue per region, ordered by region
    RegionPerformance { regions: Vec<AggregateRow> },
    /// Revenue total and mean over all rows
    OverallMetrics { total: f64, average: Option<f64> },
}

impl Insight {
    /// Plain-text rendering used in prompts and terminal output
    pub fn describe(&self) -> String {
        match self {
            Insight::RegionPerformance { regions } => {
                let mut out = String::from("Region performance (sum / mean / count):");
                for row in regions {
                    let mean = row
                        .mean
                        .map(crate::types::format_number)
                        .unwrap_or_else(|| "n/a".to_string());
                    out.push_str(&format!(
                        "\n- {}: {} / {} / {}",
                        row.category,
                        crate::types::format_number(row.sum),
                        mean,
                        row.count
                    ));
                }
                out
            }
            Insight::OverallMetrics { total, average } => format!(
                "Overall revenue: total {}, average {}",
                crate::types::format_number(*total),
                average
                    .map(crate::types::format_number)
                    .unwrap_or_else(|| "n/a".to_string())
            ),
        }
    }
}

/// Copy of `table` with rows in ascending order of `column`'s dates.
///
/// The sort is stable and places missing dates last. Returns `None` when the
/// column is absent or any value fails to parse.
pub fn sort_by_date(table: &Table, column: &str) -> Option<Table> {
    let parsed = dates::parse_column(&table.column(column)?.values)?;
    let mut order: Vec<usize> = (0..parsed.len()).collect();
    order.sort_by(|&a, &b| cmp_missing_last(&parsed[a], &parsed[b]));
    Some(table.reorder_rows(&order))
}

/// Compute the insights available from the recognised columns.
///
/// - `RegionPerformance` needs a region column and a numeric revenue column.
/// - `OverallMetrics` needs a numeric revenue column.
///
/// A date column is used to order rows first. Nothing recognised gives an
/// empty list.
pub fn analyze_trends(table: &Table, config: &TrendConfig) -> Vec<Insight> {
    let sorted;
    let table = if table.has_column(&config.date_column) {
        match sort_by_date(table, &config.date_column) {
            Some(t) => {
                sorted = t;
                &sorted
            }
            None => {
                warn!(column = %config.date_column, "date column did not parse, keeping row order");
                table
            }
        }
    } else {
        table
    };

    let mut insights = Vec::new();

    let Some(revenue) = table.column(&config.revenue_column) else {
        return insights;
    };
    let Some(numbers) = revenue.values.numbers() else {
        warn!(column = %config.revenue_column, "revenue column is not numeric");
        return insights;
    };

    if let Some(region) = table.column(&config.region_column) {
        let mut regions = group_by(region, &numbers);
        regions.sort_by(|a, b| cmp_category(&a.category, &b.category));
        debug!(regions = regions.len(), "region performance");
        insights.push(Insight::RegionPerformance { regions });
    }

    let present: Vec<f64> = numbers.iter().flatten().copied().collect();
    insights.push(Insight::OverallMetrics {
        total: present.iter().sum(),
        average: stats::mean(&present),
    });

    insights
}

/// Ascending order over category values, missing last
fn cmp_category(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Missing, Value::Missing) => Ordering::Equal,
        (Value::Missing, _) => Ordering::Greater,
        (_, Value::Missing) => Ordering::Less,
        (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::DateTime(x), Value::DateTime(y)) => x.cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, ColumnValue};

    fn text(values: &[&str]) -> ColumnValue {
        ColumnValue::Text(values.iter().map(|s| Some(s.to_string())).collect())
    }

    #[test]
    fn test_sort_by_date_stable_missing_last() {
        let table = Table::from_columns(vec![
            Column::new(
                "date",
                ColumnValue::Text(vec![
                    Some("2024-03-01".into()),
                    None,
                    Some("2024-01-01".into()),
                    Some("2024-03-01".into()),
                ]),
            ),
            Column::new("id", ColumnValue::Integer(vec![Some(0), Some(1), Some(2), Some(3)])),
        ])
        .unwrap();
        let sorted = sort_by_date(&table, "date").unwrap();
        let ids: Vec<Value> = (0..4).map(|r| sorted.column("id").unwrap().values.get(r)).collect();
        assert_eq!(
            ids,
            vec![Value::Integer(2), Value::Integer(0), Value::Integer(3), Value::Integer(1)]
        );
    }

    #[test]
    fn test_sort_by_date_rejects_unparseable() {
        let table = Table::from_columns(vec![Column::new("date", text(&["2024-01-01", "later"]))]).unwrap();
        assert!(sort_by_date(&table, "date").is_none());
    }

    #[test]
    fn test_regions_ordered_by_name() {
        let table = Table::from_columns(vec![
            Column::new("region", text(&["West", "East", "West"])),
            Column::new("revenue", ColumnValue::Integer(vec![Some(1), Some(2), Some(3)])),
        ])
        .unwrap();
        let insights = analyze_trends(&table, &TrendConfig::default());
        match &insights[0] {
            Insight::RegionPerformance { regions } => {
                assert_eq!(regions[0].category, Value::Text("East".into()));
                assert_eq!(regions[1].sum, 4.0);
            }
            other => panic!("unexpected insight {other:?}"),
        }
    }

    #[test]
    fn test_text_revenue_yields_nothing() {
        let table = Table::from_columns(vec![Column::new("revenue", text(&["a", "b"]))]).unwrap();
        assert!(analyze_trends(&table, &TrendConfig::default()).is_empty());
    }

    #[test]
    fn test_describe_overall() {
        let insight = Insight::OverallMetrics {
            total: 150.0,
            average: Some(30.0),
        };
        assert_eq!(insight.describe(), "Overall revenue: total 150, average 30");
    }
}
