//! Analysis configuration
//!
//! Every threshold, column name and narrative setting the engine reads lives
//! in one immutable [`AnalysisConfig`]. It is passed explicitly into each
//! component and can be loaded from a YAML file; missing keys keep defaults.
//!
//! ```yaml
//! anomaly:
//!   default_z_threshold: 3.0
//! aggregation:
//!   top_n: 10
//! trends:
//!   revenue_column: sales
//! ```

use crate::error::{InsightError, InsightResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration consumed by the analysis core
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub anomaly: AnomalyConfig,
    pub classification: ClassificationConfig,
    pub aggregation: AggregationConfig,
    pub trends: TrendConfig,
    pub narrative: NarrativeConfig,
}

/// Threshold defaults and allowed ranges for both detection methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub default_z_threshold: f64,
    pub min_z_threshold: f64,
    pub max_z_threshold: f64,
    pub default_iqr_multiplier: f64,
    pub min_iqr_multiplier: f64,
    pub max_iqr_multiplier: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            default_z_threshold: 2.5,
            min_z_threshold: 1.5,
            max_z_threshold: 4.0,
            default_iqr_multiplier: 1.5,
            min_iqr_multiplier: 1.0,
            max_iqr_multiplier: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Column names (compared case-insensitively) eligible for the date role
    pub date_column_names: Vec<String>,
    /// Exclusive upper bound on distinct values for a categorical column
    pub max_categories: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            date_column_names: [
                "date",
                "datetime",
                "timestamp",
                "invoicedate",
                "orderdate",
                "time",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_categories: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Groups kept after sorting by sum
    pub top_n: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self { top_n: 15 }
    }
}

/// Exact column names the trend summarizer looks for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub date_column: String,
    pub region_column: String,
    pub revenue_column: String,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            region_column: "region".to_string(),
            revenue_column: "revenue".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub model_name: String,
    pub temperature: f64,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Trailing rows included in the data summary
    pub sample_rows: usize,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            model_name: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            api_key_env: "GEMINI_API_KEY".to_string(),
            sample_rows: 10,
        }
    }
}

impl NarrativeConfig {
    /// API key from the configured environment variable, if set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl AnalysisConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> InsightResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> InsightResult<Self> {
        let config: AnalysisConfig = if content.trim().is_empty() {
            AnalysisConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that ranges are ordered and defaults sit inside them
    pub fn validate(&self) -> InsightResult<()> {
        let a = &self.anomaly;
        check_range(
            "z threshold",
            a.min_z_threshold,
            a.max_z_threshold,
            a.default_z_threshold,
        )?;
        check_range(
            "IQR multiplier",
            a.min_iqr_multiplier,
            a.max_iqr_multiplier,
            a.default_iqr_multiplier,
        )?;
        if self.classification.max_categories < 2 {
            return Err(InsightError::Validation(format!(
                "max_categories must be at least 2, got {}",
                self.classification.max_categories
            )));
        }
        if self.aggregation.top_n == 0 {
            return Err(InsightError::Validation(
                "aggregation.top_n must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_range(name: &str, min: f64, max: f64, default: f64) -> InsightResult<()> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
        return Err(InsightError::Validation(format!(
            "Invalid {name} range [{min}, {max}]"
        )));
    }
    if !(min..=max).contains(&default) {
        return Err(InsightError::Validation(format!(
            "Default {name} {default} outside [{min}, {max}]"
        )));
    }
    Ok(())
}
