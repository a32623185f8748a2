//! Basic statistics per numeric column and date coverage

use crate::core::{dates, stats};
use crate::types::{format_number, Table};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

/// Count, moments and five-number summary of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1)
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Summaries for `columns`, skipping any that are missing or not numeric
pub fn describe(table: &Table, columns: &[String]) -> Vec<ColumnSummary> {
    columns
        .iter()
        .filter_map(|name| {
            let numbers = table.column(name)?.values.numbers()?;
            let mut present: Vec<f64> = numbers.into_iter().flatten().collect();
            present.sort_by(|a, b| a.total_cmp(b));
            let q = |p: f64| (!present.is_empty()).then(|| stats::quantile_sorted(&present, p));
            Some(ColumnSummary {
                column: name.clone(),
                count: present.len(),
                mean: stats::mean(&present),
                std: stats::std_dev(&present, 1),
                min: present.first().copied(),
                q25: q(0.25),
                median: q(0.5),
                q75: q(0.75),
                max: present.last().copied(),
            })
        })
        .collect()
}

const SUMMARY_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

fn summary_cell(summary: &ColumnSummary, row: &str) -> String {
    let value = match row {
        "count" => return summary.count.to_string(),
        "mean" => summary.mean,
        "std" => summary.std,
        "min" => summary.min,
        "25%" => summary.q25,
        "50%" => summary.median,
        "75%" => summary.q75,
        _ => summary.max,
    };
    value.map(format_number).unwrap_or_else(|| "NaN".to_string())
}

/// Render summaries as a table with one column per numeric column
pub fn render_summaries(summaries: &[ColumnSummary]) -> String {
    if summaries.is_empty() {
        return "No numeric columns".to_string();
    }

    let cells: Vec<Vec<String>> = SUMMARY_ROWS
        .iter()
        .map(|row| summaries.iter().map(|s| summary_cell(s, row)).collect())
        .collect();
    let widths: Vec<usize> = summaries
        .iter()
        .enumerate()
        .map(|(i, s)| {
            cells
                .iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(s.column.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::from("     ");
    for (s, width) in summaries.iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", s.column, width = *width));
    }
    for (label, row) in SUMMARY_ROWS.iter().zip(&cells) {
        out.push_str(&format!("\n{:<5}", label));
        for (cell, width) in row.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", cell, width = *width));
        }
    }
    out
}

/// Earliest and latest date of a column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub column: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Distinct dates present
    pub periods: usize,
}

impl DateRange {
    pub fn describe(&self) -> String {
        format!(
            "Date Range: {} to {}",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Date coverage of `column`; `None` if absent, unparseable or all missing
pub fn date_range(table: &Table, column: &str) -> Option<DateRange> {
    let parsed = dates::parse_column(&table.column(column)?.values)?;
    let present: Vec<NaiveDateTime> = parsed.into_iter().flatten().collect();
    let start = *present.iter().min()?;
    let end = *present.iter().max()?;
    let periods = present.iter().collect::<HashSet<_>>().len();
    Some(DateRange {
        column: column.to_string(),
        start,
        end,
        periods,
    })
}
