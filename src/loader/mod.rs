//! Table loading from CSV, Excel and YAML files
//!
//! Loading sits outside the analysis core: it turns a file into an in-memory
//! [`Table`] and infers each column's storage type. Input text must be UTF-8.

mod csv_reader;
mod excel;
mod yaml;

pub use csv_reader::{load_csv, parse_csv};
pub use excel::ExcelImporter;
pub use yaml::{load_yaml, parse_yaml};

use crate::error::{InsightError, InsightResult};
use crate::types::{ColumnValue, Table};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Load a table, choosing the reader from the file extension
pub fn load_table(path: &Path) -> InsightResult<Table> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let table = match extension.as_str() {
        "csv" => load_csv(path)?,
        "xlsx" | "xls" | "xlsm" | "ods" => ExcelImporter::new(path).import()?,
        "yaml" | "yml" => load_yaml(path)?,
        other => {
            return Err(InsightError::Validation(format!(
                "Unsupported file type '{}' for {} (expected .csv, .xlsx, .xls, .ods, .yaml)",
                other,
                path.display()
            )))
        }
    };

    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded table"
    );
    Ok(table)
}

/// Infer the narrowest storage type that holds every non-empty cell.
///
/// Integer, then float, then boolean (`true`/`false`, any case), else text.
/// Empty and whitespace-only cells become missing.
pub(crate) fn infer_column(cells: Vec<Option<String>>) -> ColumnValue {
    let cells: Vec<Option<String>> = cells
        .into_iter()
        .map(|cell| cell.filter(|s| !s.trim().is_empty()))
        .collect();
    let present = || cells.iter().flatten().map(|s| s.trim());

    if present().next().is_none() {
        return ColumnValue::Text(cells);
    }
    if present().all(|s| s.parse::<i64>().is_ok()) {
        return ColumnValue::Integer(
            cells
                .iter()
                .map(|c| c.as_ref().and_then(|s| s.trim().parse().ok()))
                .collect(),
        );
    }
    if present().all(|s| s.parse::<f64>().is_ok()) {
        return ColumnValue::Float(
            cells
                .iter()
                .map(|c| c.as_ref().and_then(|s| s.trim().parse().ok()))
                .collect(),
        );
    }
    if present().all(|s| s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")) {
        return ColumnValue::Boolean(
            cells
                .iter()
                .map(|c| c.as_ref().map(|s| s.trim().eq_ignore_ascii_case("true")))
                .collect(),
        );
    }
    ColumnValue::Text(cells)
}

/// Rename repeated header names the way pandas does: `a`, `a.1`, `a.2`.
///
/// A suffixed name that already appears in the header is skipped, so an
/// explicit `a.1` column keeps its name.
pub(crate) fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let originals: HashSet<String> = names.iter().cloned().collect();
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());
    let mut renamed = Vec::with_capacity(names.len());

    for name in names {
        let unique = if used.contains(&name) {
            let mut n = 1;
            let mut candidate = format!("{name}.{n}");
            while used.contains(&candidate) || originals.contains(&candidate) {
                n += 1;
                candidate = format!("{name}.{n}");
            }
            debug!(header = %name, renamed = %candidate, "duplicate header renamed");
            candidate
        } else {
            name
        };
        used.insert(unique.clone());
        renamed.push(unique);
    }
    renamed
}
