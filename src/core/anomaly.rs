//! Outlier detection
//!
//! Two interchangeable strategies share one contract: given a table and a
//! numeric column, produce a boolean mask aligned with the table's rows.
//!
//! - **Z-Score**: flag `|x - mean| / stddev > threshold` (sample stddev, n - 1).
//! - **IQR**: flag values strictly outside `[Q1 - m*IQR, Q3 + m*IQR]`.
//!
//! Statistics are computed over the non-missing values only; flags are then
//! written back to the original row positions, so missing rows always stay
//! `false`. A column that does not exist or is not numeric yields an
//! all-false mask rather than an error.

use crate::config::AnomalyConfig;
use crate::core::stats;
use crate::error::{InsightError, InsightResult};
use crate::types::Table;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

//==============================================================================
// Mask
//==============================================================================

/// Booleans aligned 1:1 with table rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnomalyMask(Vec<bool>);

impl AnomalyMask {
    /// All-false mask of `len` rows
    pub fn empty(len: usize) -> Self {
        Self(vec![false; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, row: usize) -> bool {
        self.0.get(row).copied().unwrap_or(false)
    }

    /// Number of flagged rows
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&flag| flag).count()
    }

    /// Row positions of flagged rows, ascending
    pub fn indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &flag)| flag.then_some(i))
            .collect()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for AnomalyMask {
    fn from(flags: Vec<bool>) -> Self {
        Self(flags)
    }
}

//==============================================================================
// Methods & settings
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnomalyMethod {
    #[serde(rename = "z-score")]
    ZScore,
    #[serde(rename = "iqr")]
    Iqr,
}

impl fmt::Display for AnomalyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyMethod::ZScore => write!(f, "Z-Score"),
            AnomalyMethod::Iqr => write!(f, "IQR"),
        }
    }
}

impl FromStr for AnomalyMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "zscore" | "z" => Ok(AnomalyMethod::ZScore),
            "iqr" => Ok(AnomalyMethod::Iqr),
            other => Err(format!(
                "Unknown anomaly method '{other}' (expected 'zscore' or 'iqr')"
            )),
        }
    }
}

/// A method paired with a threshold validated against its allowed range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalySettings {
    method: AnomalyMethod,
    threshold: f64,
}

impl AnomalySettings {
    /// Validate `threshold` against the method's range in `config`
    pub fn new(method: AnomalyMethod, threshold: f64, config: &AnomalyConfig) -> InsightResult<Self> {
        let (min, max, what) = match method {
            AnomalyMethod::ZScore => (config.min_z_threshold, config.max_z_threshold, "Z-Score threshold"),
            AnomalyMethod::Iqr => (
                config.min_iqr_multiplier,
                config.max_iqr_multiplier,
                "IQR multiplier",
            ),
        };
        if !threshold.is_finite() || threshold < min || threshold > max {
            return Err(InsightError::Validation(format!(
                "{what} {threshold} outside allowed range [{min}, {max}]"
            )));
        }
        Ok(Self { method, threshold })
    }

    /// The configured default threshold for `method`
    pub fn default_for(method: AnomalyMethod, config: &AnomalyConfig) -> Self {
        let threshold = match method {
            AnomalyMethod::ZScore => config.default_z_threshold,
            AnomalyMethod::Iqr => config.default_iqr_multiplier,
        };
        Self { method, threshold }
    }

    pub fn method(&self) -> AnomalyMethod {
        self.method
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn strategy(&self) -> Box<dyn OutlierStrategy> {
        match self.method {
            AnomalyMethod::ZScore => Box::new(ZScoreStrategy::new(self.threshold)),
            AnomalyMethod::Iqr => Box::new(IqrStrategy::new(self.threshold)),
        }
    }
}

//==============================================================================
// Strategies
//==============================================================================

/// Flags and the fences they were derived from
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    pub flags: Vec<bool>,
    pub lower: f64,
    pub upper: f64,
}

/// A statistical rule that flags outliers in a list of non-missing values
pub trait OutlierStrategy {
    fn method(&self) -> AnomalyMethod;

    fn threshold(&self) -> f64;

    /// Flags aligned with `values`, or `None` when the statistic is
    /// undefined (no values, zero variance).
    fn fit(&self, values: &[f64]) -> Option<Fit>;
}

#[derive(Debug, Clone, Copy)]
pub struct ZScoreStrategy {
    threshold: f64,
}

impl ZScoreStrategy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl OutlierStrategy for ZScoreStrategy {
    fn method(&self) -> AnomalyMethod {
        AnomalyMethod::ZScore
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn fit(&self, values: &[f64]) -> Option<Fit> {
        let mean = stats::mean(values)?;
        let std = stats::std_dev(values, 1)?;
        if std == 0.0 || !std.is_finite() {
            return None;
        }
        let flags = values
            .iter()
            .map(|x| ((x - mean) / std).abs() > self.threshold)
            .collect();
        debug!(mean, std, threshold = self.threshold, "z-score fit");
        Some(Fit {
            flags,
            lower: mean - self.threshold * std,
            upper: mean + self.threshold * std,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IqrStrategy {
    multiplier: f64,
}

impl IqrStrategy {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }
}

impl OutlierStrategy for IqrStrategy {
    fn method(&self) -> AnomalyMethod {
        AnomalyMethod::Iqr
    }

    fn threshold(&self) -> f64 {
        self.multiplier
    }

    fn fit(&self, values: &[f64]) -> Option<Fit> {
        let q1 = stats::quantile(values, 0.25)?;
        let q3 = stats::quantile(values, 0.75)?;
        let iqr = q3 - q1;
        let lower = q1 - self.multiplier * iqr;
        let upper = q3 + self.multiplier * iqr;
        debug!(q1, q3, lower, upper, "iqr fit");
        let flags = values.iter().map(|&x| x < lower || x > upper).collect();
        Some(Fit {
            flags,
            lower,
            upper,
        })
    }
}

//==============================================================================
// Detection
//==============================================================================

/// Whether the mask reflects a computed statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStatus {
    /// Statistic computed; the mask may or may not contain flags
    Computed,
    /// Column absent or not numeric
    NotApplicable,
    /// No non-missing values, or zero variance
    Degenerate,
}

/// Outcome of running one strategy over one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub column: String,
    pub method: AnomalyMethod,
    pub threshold: f64,
    pub status: DetectionStatus,
    /// `(lower, upper)` fences when computed
    pub bounds: Option<(f64, f64)>,
    pub mask: AnomalyMask,
}

impl Detection {
    pub fn count(&self) -> usize {
        self.mask.count()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.mask.indices()
    }
}

/// Run `strategy` over `column` of `table`.
///
/// The returned mask always has `table.row_count()` entries.
pub fn run_strategy(strategy: &dyn OutlierStrategy, table: &Table, column: &str) -> Detection {
    let rows = table.row_count();
    let mut detection = Detection {
        column: column.to_string(),
        method: strategy.method(),
        threshold: strategy.threshold(),
        status: DetectionStatus::NotApplicable,
        bounds: None,
        mask: AnomalyMask::empty(rows),
    };

    let Some(cells) = table.column(column).and_then(|c| c.values.numbers()) else {
        warn!(column, "outlier detection skipped: column missing or not numeric");
        return detection;
    };

    // Positions of non-missing values, so flags map back to original rows
    let (positions, values): (Vec<usize>, Vec<f64>) = cells
        .iter()
        .enumerate()
        .filter_map(|(row, cell)| cell.map(|v| (row, v)))
        .unzip();

    let Some(fit) = strategy.fit(&values) else {
        debug!(column, non_missing = values.len(), "degenerate column, nothing flagged");
        detection.status = DetectionStatus::Degenerate;
        return detection;
    };

    let mut flags = vec![false; rows];
    for (&row, &flag) in positions.iter().zip(&fit.flags) {
        flags[row] = flag;
    }
    detection.status = DetectionStatus::Computed;
    detection.bounds = Some((fit.lower, fit.upper));
    detection.mask = AnomalyMask::from(flags);
    detection
}

/// Run the configured method over `column`
pub fn detect(table: &Table, column: &str, settings: &AnomalySettings) -> Detection {
    run_strategy(settings.strategy().as_ref(), table, column)
}

/// Z-Score mask for `column`
pub fn detect_zscore(table: &Table, column: &str, threshold: f64) -> AnomalyMask {
    run_strategy(&ZScoreStrategy::new(threshold), table, column).mask
}

/// IQR mask for `column`
pub fn detect_iqr(table: &Table, column: &str, multiplier: f64) -> AnomalyMask {
    run_strategy(&IqrStrategy::new(multiplier), table, column).mask
}

//==============================================================================
// Multi-column scan
//==============================================================================

/// Flagged rows of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnAnomalies {
    pub column: String,
    pub count: usize,
    pub indices: Vec<usize>,
    pub bounds: Option<(f64, f64)>,
}

/// Detection results across all numeric columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub method: AnomalyMethod,
    pub threshold: f64,
    pub columns_scanned: usize,
    /// Only columns with at least one flagged row, in scan order
    pub findings: Vec<ColumnAnomalies>,
}

impl AnomalyReport {
    pub fn total_anomalies(&self) -> usize {
        self.findings.iter().map(|f| f.count).sum()
    }

    pub fn get(&self, column: &str) -> Option<&ColumnAnomalies> {
        self.findings.iter().find(|f| f.column == column)
    }

    /// Short text summary handed to the narrative generator
    pub fn summary_text(&self) -> String {
        if self.columns_scanned == 0 {
            return "No numeric columns available".to_string();
        }
        if self.findings.is_empty() {
            return "No anomalies detected".to_string();
        }
        self.findings
            .iter()
            .map(|f| format!("- {}: {} anomalies", f.column, f.count))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Run one method over every column in `numeric_columns`.
///
/// Columns are independent; results are keyed by column name in the order
/// given.
pub fn scan_anomalies(
    table: &Table,
    numeric_columns: &[String],
    settings: &AnomalySettings,
) -> AnomalyReport {
    let strategy = settings.strategy();
    let findings = numeric_columns
        .iter()
        .map(|column| run_strategy(strategy.as_ref(), table, column))
        .filter(|detection| detection.count() > 0)
        .map(|detection| ColumnAnomalies {
            count: detection.count(),
            indices: detection.indices(),
            bounds: detection.bounds,
            column: detection.column,
        })
        .collect();

    AnomalyReport {
        method: settings.method(),
        threshold: settings.threshold(),
        columns_scanned: numeric_columns.len(),
        findings,
    }
}
