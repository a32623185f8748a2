//! Pearson correlation matrix over numeric columns

use crate::core::stats;
use crate::types::{format_number, Table};
use serde::Serialize;

/// Symmetric matrix; `values[i][j]` correlates `columns[i]` with `columns[j]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `None` where the coefficient is undefined
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Pairs ordered by descending absolute correlation, each pair once
    pub fn strongest_pairs(&self) -> Vec<(&str, &str, f64)> {
        let mut pairs = Vec::new();
        for i in 0..self.columns.len() {
            for j in (i + 1)..self.columns.len() {
                if let Some(r) = self.values[i][j] {
                    pairs.push((self.columns[i].as_str(), self.columns[j].as_str(), r));
                }
            }
        }
        pairs.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));
        pairs
    }

    pub fn render(&self) -> String {
        let width = self
            .columns
            .iter()
            .map(|c| c.len())
            .max()
            .unwrap_or(0)
            .max(6);
        let mut out = " ".repeat(width);
        for c in &self.columns {
            out.push_str(&format!("  {:>width$}", c, width = width));
        }
        for (name, row) in self.columns.iter().zip(&self.values) {
            out.push_str(&format!("\n{:<width$}", name, width = width));
            for value in row {
                let cell = value
                    .map(|r| format_number((r * 1000.0).round() / 1000.0))
                    .unwrap_or_else(|| "NaN".to_string());
                out.push_str(&format!("  {:>width$}", cell, width = width));
            }
        }
        out
    }
}

/// Correlate every pair of `numeric_columns` using rows where both values
/// are present. `None` when fewer than two numeric columns are given.
pub fn calculate_correlations(table: &Table, numeric_columns: &[String]) -> Option<CorrelationMatrix> {
    let series: Vec<(String, Vec<Option<f64>>)> = numeric_columns
        .iter()
        .filter_map(|name| {
            let numbers = table.column(name)?.values.numbers()?;
            Some((name.clone(), numbers))
        })
        .collect();
    if series.len() < 2 {
        return None;
    }

    let n = series.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = series[i]
                .1
                .iter()
                .zip(&series[j].1)
                .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                .unzip();
            let r = if i == j {
                // Defined only when the column varies
                stats::pearson(&xs, &ys).map(|_| 1.0)
            } else {
                stats::pearson(&xs, &ys)
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Some(CorrelationMatrix {
        columns: series.into_iter().map(|(name, _)| name).collect(),
        values,
    })
}
