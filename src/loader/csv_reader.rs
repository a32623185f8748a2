//! CSV reader

use super::{dedupe_names, infer_column};
use crate::error::{InsightError, InsightResult};
use crate::types::{Column, Table};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

/// Load a CSV file with a header row
pub fn load_csv(path: &Path) -> InsightResult<Table> {
    let file = std::fs::File::open(path)?;
    parse_csv(file)
}

/// Parse CSV text with a header row.
///
/// Short rows are padded with missing cells; blank header names become
/// `col_N`. Repeated header names are renamed `name.1`, `name.2`, ...
pub fn parse_csv<R: Read>(reader: R) -> InsightResult<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = dedupe_names(
        reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                if name.is_empty() {
                    format!("col_{idx}")
                } else {
                    name.to_string()
                }
            })
            .collect(),
    );
    if headers.is_empty() {
        return Err(InsightError::Import("CSV file has no header row".to_string()));
    }

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            return Err(InsightError::Import(format!(
                "Row {} has {} fields, header has {}",
                line + 2,
                record.len(),
                headers.len()
            )));
        }
        for (idx, cells) in columns.iter_mut().enumerate() {
            cells.push(record.get(idx).map(str::to_string));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| Column::new(name, infer_column(cells)))
        .collect();
    Table::from_columns(columns).map_err(InsightError::Validation)
}
