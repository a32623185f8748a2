//! YAML tables
//!
//! Two layouts are accepted:
//!
//! ```yaml
//! columns:
//!   region: [North, South]
//!   revenue: [100, 250.5]
//! ```
//!
//! ```yaml
//! rows:
//!   - { region: North, revenue: 100 }
//!   - { region: South }
//! ```
//!
//! Row layout takes column order from first appearance; keys absent from a
//! row are missing cells.

use crate::error::{InsightError, InsightResult};
use crate::types::{Column, ColumnValue, Table};
use serde_yaml::Value;
use std::path::Path;

pub fn load_yaml(path: &Path) -> InsightResult<Table> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content)
}

pub fn parse_yaml(content: &str) -> InsightResult<Table> {
    let yaml: Value = serde_yaml::from_str(content)?;

    let columns = if let Some(columns) = yaml.get("columns") {
        parse_columns(columns)?
    } else if let Some(rows) = yaml.get("rows") {
        parse_rows(rows)?
    } else {
        return Err(InsightError::Parse(
            "YAML table needs a 'columns' mapping or a 'rows' list".to_string(),
        ));
    };

    Table::from_columns(columns).map_err(InsightError::Validation)
}

fn parse_columns(columns: &Value) -> InsightResult<Vec<Column>> {
    let map = columns
        .as_mapping()
        .ok_or_else(|| InsightError::Parse("'columns' must be a mapping".to_string()))?;

    let mut result = Vec::with_capacity(map.len());
    for (key, value) in map {
        let name = key_name(key)?;
        let cells = value.as_sequence().ok_or_else(|| {
            InsightError::Parse(format!("Column '{}' must be a list of values", name))
        })?;
        result.push(Column::new(name, convert_cells(cells)));
    }
    Ok(result)
}

fn parse_rows(rows: &Value) -> InsightResult<Vec<Column>> {
    let rows = rows
        .as_sequence()
        .ok_or_else(|| InsightError::Parse("'rows' must be a list".to_string()))?;

    let mut names: Vec<String> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let map = row
            .as_mapping()
            .ok_or_else(|| InsightError::Parse(format!("Row {} must be a mapping", idx)))?;
        for key in map.keys() {
            let name = key_name(key)?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    Ok(names
        .into_iter()
        .map(|name| {
            let cells: Vec<Value> = rows
                .iter()
                .map(|row| row.get(name.as_str()).cloned().unwrap_or(Value::Null))
                .collect();
            let values = convert_cells(&cells);
            Column::new(name, values)
        })
        .collect())
}

fn key_name(key: &Value) -> InsightResult<String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(InsightError::Parse("Column name must be a string".to_string())),
    }
}

/// Typed YAML scalars → column; mixed lists fall back to text
fn convert_cells(cells: &[Value]) -> ColumnValue {
    let present: Vec<&Value> = cells.iter().filter(|v| !v.is_null()).collect();

    if !present.is_empty() && present.iter().all(|v| v.as_i64().is_some()) {
        return ColumnValue::Integer(cells.iter().map(Value::as_i64).collect());
    }
    if !present.is_empty() && present.iter().all(|v| v.is_number()) {
        return ColumnValue::Float(cells.iter().map(Value::as_f64).collect());
    }
    if !present.is_empty() && present.iter().all(|v| v.is_bool()) {
        return ColumnValue::Boolean(cells.iter().map(Value::as_bool).collect());
    }
    ColumnValue::Text(
        cells
            .iter()
            .map(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                other => serde_yaml::to_string(other)
                    .ok()
                    .map(|s| s.trim().to_string()),
            })
            .collect(),
    )
}
