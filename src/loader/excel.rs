//! Excel importer - first worksheet of an .xlsx/.xls/.ods workbook → Table

use super::dedupe_names;
use crate::core::dates;
use crate::error::{InsightError, InsightResult};
use crate::types::{Column, ColumnValue, Table};
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Excel importer reading the first non-empty worksheet as a table
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Import the first worksheet with data
    pub fn import(&self) -> InsightResult<Table> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| InsightError::Import(format!("Failed to open Excel file: {}", e)))?;

        let sheet_names = workbook.sheet_names().to_vec();
        for sheet_name in sheet_names {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| InsightError::Import(format!("Failed to read sheet '{}': {}", sheet_name, e)))?;
            if range.is_empty() {
                continue;
            }
            debug!(sheet = %sheet_name, "importing worksheet");
            return self.process_sheet(&range);
        }

        Err(InsightError::Import(format!(
            "Workbook {} has no worksheet with data",
            self.path.display()
        )))
    }

    /// Header row → column names, remaining rows → cells
    fn process_sheet(&self, range: &Range<Data>) -> InsightResult<Table> {
        let (height, width) = range.get_size();

        let mut column_names: Vec<String> = Vec::with_capacity(width);
        for col in 0..width {
            let name = match range.get((0, col)) {
                Some(Data::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
                Some(Data::Int(i)) => i.to_string(),
                Some(Data::Float(f)) => f.to_string(),
                _ => format!("col_{}", col),
            };
            column_names.push(name);
        }

        let mut columns = Vec::with_capacity(width);
        for (col, name) in dedupe_names(column_names).into_iter().enumerate() {
            let cells: Vec<Data> = (1..height)
                .map(|row| range.get((row, col)).cloned().unwrap_or(Data::Empty))
                .collect();
            columns.push(Column::new(name, self.convert_to_column_value(&cells)));
        }

        Table::from_columns(columns).map_err(InsightError::Validation)
    }

    /// Convert Excel cells to a column, picking the storage type that holds
    /// every non-empty cell
    fn convert_to_column_value(&self, data: &[Data]) -> ColumnValue {
        let present: Vec<&Data> = data
            .iter()
            .filter(|cell| !matches!(cell, Data::Empty | Data::Error(_)))
            .collect();

        if present.is_empty() {
            return ColumnValue::Text(vec![None; data.len()]);
        }

        if present.iter().all(|cell| matches!(cell, Data::Int(_))) {
            return ColumnValue::Integer(
                data.iter()
                    .map(|cell| match cell {
                        Data::Int(i) => Some(*i),
                        _ => None,
                    })
                    .collect(),
            );
        }

        if present
            .iter()
            .all(|cell| matches!(cell, Data::Int(_) | Data::Float(_)))
        {
            return ColumnValue::Float(
                data.iter()
                    .map(|cell| match cell {
                        Data::Float(f) => Some(*f),
                        Data::Int(i) => Some(*i as f64),
                        _ => None,
                    })
                    .collect(),
            );
        }

        if present
            .iter()
            .all(|cell| matches!(cell, Data::DateTime(_) | Data::DateTimeIso(_)))
        {
            return ColumnValue::DateTime(
                data.iter()
                    .map(|cell| match cell {
                        Data::DateTimeIso(s) => dates::parse_date(s),
                        Data::DateTime(_) => cell.as_datetime(),
                        _ => None,
                    })
                    .collect(),
            );
        }

        if present.iter().all(|cell| matches!(cell, Data::Bool(_))) {
            return ColumnValue::Boolean(
                data.iter()
                    .map(|cell| match cell {
                        Data::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect(),
            );
        }

        ColumnValue::Text(
            data.iter()
                .map(|cell| match cell {
                    Data::Empty | Data::Error(_) => None,
                    other => Some(other.to_string()),
                })
                .collect(),
        )
    }
}
