//! Column role classification
//!
//! Splits a table's columns into numeric, date-like and categorical roles.
//! Roles are derived from content on every call and never stored on the
//! table itself.

use crate::config::ClassificationConfig;
use crate::core::dates;
use crate::types::{Column, Table};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Role a column plays in analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Numeric,
    DateLike,
    Categorical,
    Unclassified,
}

impl ColumnRole {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnRole::Numeric => "numeric",
            ColumnRole::DateLike => "date",
            ColumnRole::Categorical => "categorical",
            ColumnRole::Unclassified => "unclassified",
        }
    }
}

/// Result of one classification pass, in table column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnClassification {
    pub numeric: Vec<String>,
    pub date: Vec<String>,
    pub categorical: Vec<String>,
    #[serde(skip)]
    roles: HashMap<String, ColumnRole>,
}

impl ColumnClassification {
    /// Role of a column; `None` if the column was not part of the table
    pub fn role(&self, column: &str) -> Option<ColumnRole> {
        self.roles.get(column).copied()
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        self.role(column) == Some(ColumnRole::Numeric)
    }

    /// Columns that matched no role
    pub fn unclassified(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .roles
            .iter()
            .filter(|(_, role)| **role == ColumnRole::Unclassified)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Borrow the three role lists as a tuple
    pub fn as_tuple(&self) -> (&[String], &[String], &[String]) {
        (&self.numeric, &self.date, &self.categorical)
    }
}

/// Classify every column of `table`.
///
/// - Numeric: float or integer storage.
/// - Date-like: name on the allow-list (case-insensitive) and every
///   non-missing value parses as a date. Parse failures drop the column
///   silently.
/// - Categorical: anything else with distinct count strictly between 1 and
///   `max_categories`.
pub fn classify_columns(table: &Table, config: &ClassificationConfig) -> ColumnClassification {
    let mut result = ColumnClassification {
        numeric: Vec::new(),
        date: Vec::new(),
        categorical: Vec::new(),
        roles: HashMap::new(),
    };

    for column in table.columns() {
        let role = classify_column(column, config);
        debug!(column = %column.name, role = role.label(), "classified column");
        match role {
            ColumnRole::Numeric => result.numeric.push(column.name.clone()),
            ColumnRole::DateLike => result.date.push(column.name.clone()),
            ColumnRole::Categorical => result.categorical.push(column.name.clone()),
            ColumnRole::Unclassified => {}
        }
        result.roles.insert(column.name.clone(), role);
    }

    result
}

/// Role of a single column
pub fn classify_column(column: &Column, config: &ClassificationConfig) -> ColumnRole {
    if column.values.is_numeric() {
        return ColumnRole::Numeric;
    }
    if is_date_name(&column.name, config) && dates::parse_column(&column.values).is_some() {
        return ColumnRole::DateLike;
    }
    let distinct = column.distinct_count();
    if distinct > 1 && distinct < config.max_categories {
        return ColumnRole::Categorical;
    }
    ColumnRole::Unclassified
}

fn is_date_name(name: &str, config: &ClassificationConfig) -> bool {
    let lower = name.to_lowercase();
    config
        .date_column_names
        .iter()
        .any(|candidate| candidate.to_lowercase() == lower)
}
