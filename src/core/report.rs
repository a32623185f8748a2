//! One full analysis pass over a table

use crate::config::AnalysisConfig;
use crate::core::aggregate::{aggregate_by_category, AggregateRow};
use crate::core::anomaly::{scan_anomalies, AnomalyReport, AnomalySettings};
use crate::core::classifier::{classify_columns, ColumnClassification};
use crate::core::correlation::{calculate_correlations, CorrelationMatrix};
use crate::core::describe::{date_range, describe, ColumnSummary, DateRange};
use crate::core::trends::{analyze_trends, Insight};
use crate::types::Table;
use serde::Serialize;
use tracing::info;

/// Aggregation of the default category/value pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category_column: String,
    pub value_column: String,
    pub rows: Vec<AggregateRow>,
}

/// Everything computed for a table in one pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    pub date_range: Option<DateRange>,
    pub classification: ColumnClassification,
    pub summaries: Vec<ColumnSummary>,
    pub anomalies: AnomalyReport,
    pub breakdown: Option<CategoryBreakdown>,
    pub correlations: Option<CorrelationMatrix>,
    pub trends: Vec<Insight>,
}

/// Classify once, then run every analysis against that classification.
///
/// The breakdown uses the first categorical and first numeric column.
pub fn analyze(table: &Table, config: &AnalysisConfig, settings: &AnomalySettings) -> AnalysisReport {
    let classification = classify_columns(table, &config.classification);
    let anomalies = scan_anomalies(table, &classification.numeric, settings);

    let breakdown = match (classification.categorical.first(), classification.numeric.first()) {
        (Some(cat), Some(num)) => aggregate_by_category(table, cat, num, &config.aggregation)
            .ok()
            .map(|rows| CategoryBreakdown {
                category_column: cat.clone(),
                value_column: num.clone(),
                rows,
            }),
        _ => None,
    };

    info!(
        rows = table.row_count(),
        numeric = classification.numeric.len(),
        dates = classification.date.len(),
        categorical = classification.categorical.len(),
        anomalies = anomalies.total_anomalies(),
        "analysis complete"
    );

    AnalysisReport {
        row_count: table.row_count(),
        column_count: table.column_count(),
        columns: table.column_names().iter().map(|s| s.to_string()).collect(),
        date_range: date_range(table, &config.trends.date_column),
        summaries: describe(table, &classification.numeric),
        correlations: calculate_correlations(table, &classification.numeric),
        trends: analyze_trends(table, &config.trends),
        breakdown,
        anomalies,
        classification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anomaly::AnomalyMethod;
    use crate::types::{Column, ColumnValue};

    fn text(values: &[&str]) -> ColumnValue {
        ColumnValue::Text(values.iter().map(|s| Some(s.to_string())).collect())
    }

    #[test]
    fn test_full_pass() {
        let table = Table::from_columns(vec![
            Column::new("date", text(&["2024-01-03", "2024-01-01", "2024-01-02", "2024-01-04", "2024-01-05"])),
            Column::new("region", text(&["N", "N", "S", "S", "S"])),
            Column::new(
                "revenue",
                ColumnValue::Float(vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(100.0)]),
            ),
            Column::new("units", ColumnValue::Integer(vec![Some(1), Some(2), Some(3), Some(4), Some(5)])),
        ])
        .unwrap();
        let config = AnalysisConfig::default();
        let settings = AnomalySettings::default_for(AnomalyMethod::Iqr, &config.anomaly);

        let report = analyze(&table, &config, &settings);
        assert_eq!(report.row_count, 5);
        assert_eq!(report.classification.date, vec!["date"]);
        assert_eq!(report.summaries.len(), 2);
        assert_eq!(report.anomalies.get("revenue").map(|a| a.indices.clone()), Some(vec![4]));

        let breakdown = report.breakdown.unwrap();
        assert_eq!(breakdown.category_column, "region");
        assert_eq!(breakdown.value_column, "revenue");
        assert_eq!(breakdown.rows[0].sum, 107.0);

        assert!(report.correlations.is_some());
        assert_eq!(report.trends.len(), 2);
        assert_eq!(report.date_range.map(|r| r.periods), Some(5));
    }

    #[test]
    fn test_no_categorical_column_means_no_breakdown() {
        let table = Table::from_columns(vec![Column::new(
            "revenue",
            ColumnValue::Integer(vec![Some(1), Some(2)]),
        )])
        .unwrap();
        let config = AnalysisConfig::default();
        let settings = AnomalySettings::default_for(AnomalyMethod::ZScore, &config.anomaly);
        let report = analyze(&table, &config, &settings);
        assert!(report.breakdown.is_none());
        assert!(report.correlations.is_none());
        assert_eq!(report.anomalies.summary_text(), "No anomalies detected");
    }
}
