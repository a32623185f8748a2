//! Sales Insight - anomaly detection and column profiling for tabular sales data
//!
//! This library loads a table (CSV, Excel or YAML), classifies its columns,
//! flags outliers, aggregates by category and summarises trends for a
//! downstream narrative generator.
//!
//! # Features
//!
//! - Column classification into numeric, date-like and categorical roles
//! - Z-Score and IQR outlier detection with row-aligned masks
//! - Top-N category aggregation (sum, mean, count)
//! - Region and overall revenue trends
//! - Prompt building for an external text generator
//!
//! # Example
//!
//! ```no_run
//! use sales_insight::config::AnalysisConfig;
//! use sales_insight::core::{analyze, AnomalyMethod, AnomalySettings};
//! use sales_insight::loader::load_table;
//! use std::path::Path;
//!
//! let table = load_table(Path::new("sales.csv"))?;
//! let config = AnalysisConfig::default();
//! let settings = AnomalySettings::default_for(AnomalyMethod::Iqr, &config.anomaly);
//!
//! let report = analyze(&table, &config, &settings);
//! println!("Numeric columns: {:?}", report.classification.numeric);
//! println!("{}", report.anomalies.summary_text());
//! # Ok::<(), sales_insight::error::InsightError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod loader;
pub mod narrative;
pub mod types;

// Re-export commonly used types
pub use config::AnalysisConfig;
pub use error::{InsightError, InsightResult};
pub use types::{Column, ColumnValue, Table, Value};
