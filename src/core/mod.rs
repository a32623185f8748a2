//! Analysis engine: classification, outlier detection, aggregation, trends

pub mod aggregate;
pub mod anomaly;
pub mod classifier;
pub mod correlation;
pub mod dates;
pub mod describe;
pub mod report;
pub mod stats;
pub mod trends;

pub use aggregate::{aggregate_by_category, AggregateRow};
pub use anomaly::{
    detect, detect_iqr, detect_zscore, scan_anomalies, AnomalyMask, AnomalyMethod, AnomalyReport,
    AnomalySettings, Detection, DetectionStatus, OutlierStrategy,
};
pub use classifier::{classify_columns, ColumnClassification, ColumnRole};
pub use correlation::{calculate_correlations, CorrelationMatrix};
pub use describe::{date_range, describe, ColumnSummary, DateRange};
pub use report::{analyze, AnalysisReport};
pub use trends::{analyze_trends, Insight};
