use thiserror::Error;

pub type InsightResult<T> = Result<T, InsightError>;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Column '{column}' not found. Available: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl InsightError {
    /// Build a `ColumnNotFound` listing the table's columns
    pub fn column_not_found(column: &str, table: &crate::types::Table) -> Self {
        InsightError::ColumnNotFound {
            column: column.to_string(),
            available: table.column_names().iter().map(|s| s.to_string()).collect(),
        }
    }
}
