use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

//==============================================================================
// Cell Values
//==============================================================================

/// A single dynamically-typed cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Float(f64),
    Integer(i64),
    Text(String),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Hashable identity of the value, used for grouping and distinct counts
    pub fn group_key(&self) -> GroupKey {
        match self {
            Value::Missing => GroupKey::Missing,
            Value::Float(f) => {
                // -0.0 and 0.0 group together
                let normalized = if *f == 0.0 { 0.0 } else { *f };
                GroupKey::Float(normalized.to_bits())
            }
            Value::Integer(i) => GroupKey::Integer(*i),
            Value::Text(s) => GroupKey::Text(s.clone()),
            Value::Boolean(b) => GroupKey::Boolean(*b),
            Value::DateTime(d) => GroupKey::DateTime(*d),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "NaN"),
            Value::Float(v) => write!(f, "{}", format_number(*v)),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::DateTime(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Equality and hashing identity of a cell value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Missing,
    Float(u64),
    Integer(i64),
    Text(String),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

/// Format a number for display, removing unnecessary decimal places
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let rounded = (n * 1e6).round() / 1e6;
    let text = format!("{:.6}", rounded);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

//==============================================================================
// Columns
//==============================================================================

/// Declared storage type of a column (homogeneous, nullable cells)
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Float(Vec<Option<f64>>),
    Integer(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
    Boolean(Vec<Option<bool>>),
    DateTime(Vec<Option<NaiveDateTime>>),
}

impl ColumnValue {
    /// Get the length of the array
    pub fn len(&self) -> usize {
        match self {
            ColumnValue::Float(v) => v.len(),
            ColumnValue::Integer(v) => v.len(),
            ColumnValue::Text(v) => v.len(),
            ColumnValue::Boolean(v) => v.len(),
            ColumnValue::DateTime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValue::Float(_) => "float",
            ColumnValue::Integer(_) => "integer",
            ColumnValue::Text(_) => "text",
            ColumnValue::Boolean(_) => "boolean",
            ColumnValue::DateTime(_) => "datetime",
        }
    }

    /// Floating-point or integer storage
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnValue::Float(_) | ColumnValue::Integer(_))
    }

    /// Numeric view of the cells; `None` for missing cells and NaN.
    /// Non-numeric storage yields `None`.
    pub fn numbers(&self) -> Option<Vec<Option<f64>>> {
        match self {
            ColumnValue::Float(v) => Some(
                v.iter()
                    .map(|cell| cell.filter(|f| !f.is_nan()))
                    .collect(),
            ),
            ColumnValue::Integer(v) => Some(v.iter().map(|cell| cell.map(|i| i as f64)).collect()),
            _ => None,
        }
    }

    /// Cell at `row` as a dynamically-typed value
    pub fn get(&self, row: usize) -> Value {
        match self {
            ColumnValue::Float(v) => match v.get(row).copied().flatten() {
                Some(f) if !f.is_nan() => Value::Float(f),
                _ => Value::Missing,
            },
            ColumnValue::Integer(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(Value::Missing, Value::Integer),
            ColumnValue::Text(v) => v
                .get(row)
                .cloned()
                .flatten()
                .map_or(Value::Missing, Value::Text),
            ColumnValue::Boolean(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(Value::Missing, Value::Boolean),
            ColumnValue::DateTime(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(Value::Missing, Value::DateTime),
        }
    }

    /// Copy of the column with rows taken in the given order
    fn reordered(&self, order: &[usize]) -> ColumnValue {
        fn pick<T: Clone>(values: &[Option<T>], order: &[usize]) -> Vec<Option<T>> {
            order.iter().map(|&i| values[i].clone()).collect()
        }
        match self {
            ColumnValue::Float(v) => ColumnValue::Float(pick(v, order)),
            ColumnValue::Integer(v) => ColumnValue::Integer(pick(v, order)),
            ColumnValue::Text(v) => ColumnValue::Text(pick(v, order)),
            ColumnValue::Boolean(v) => ColumnValue::Boolean(pick(v, order)),
            ColumnValue::DateTime(v) => ColumnValue::DateTime(pick(v, order)),
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValue,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValue) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of distinct non-missing values
    pub fn distinct_count(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        for row in 0..self.len() {
            let value = self.values.get(row);
            if !value.is_missing() {
                seen.insert(value.group_key());
            }
        }
        seen.len()
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len())
            .filter(|&row| self.values.get(row).is_missing())
            .count()
    }
}

//==============================================================================
// Table
//==============================================================================

/// An in-memory table with ordered, equally long columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, rejecting ragged or duplicate columns
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, String> {
        let mut table = Table::new();
        for column in columns {
            if table.index.contains_key(&column.name) {
                return Err(format!("Duplicate column '{}'", column.name));
            }
            table.add_column(column);
        }
        table.validate_lengths()?;
        Ok(table)
    }

    /// Append a column, replacing an existing column of the same name
    pub fn add_column(&mut self, column: Column) {
        if let Some(&idx) = self.index.get(&column.name) {
            self.columns[idx] = column;
        } else {
            self.index.insert(column.name.clone(), self.columns.len());
            self.columns.push(column);
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&idx| &self.columns[idx])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows (length of first column, all should be same)
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |col| col.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Validate all columns have the same length
    pub fn validate_lengths(&self) -> Result<(), String> {
        let row_count = self.row_count();
        for column in &self.columns {
            if column.len() != row_count {
                return Err(format!(
                    "Column '{}' has {} rows, expected {} rows",
                    column.name,
                    column.len(),
                    row_count
                ));
            }
        }
        Ok(())
    }

    /// New table whose rows are taken from this one in `order`
    pub fn reorder_rows(&self, order: &[usize]) -> Table {
        let mut table = Table::new();
        for column in &self.columns {
            table.add_column(Column::new(column.name.clone(), column.values.reordered(order)));
        }
        table
    }

    /// Render rows `[start, end)` as a fixed-width text block
    pub fn render_rows(&self, start: usize, end: usize) -> String {
        let end = end.min(self.row_count());
        let start = start.min(end);
        let index_width = end.saturating_sub(1).to_string().len().max(1);

        let mut cells: Vec<Vec<String>> = Vec::with_capacity(self.columns.len());
        let mut widths = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let rendered: Vec<String> = (start..end)
                .map(|row| column.values.get(row).to_string())
                .collect();
            let width = rendered
                .iter()
                .map(|s| s.chars().count())
                .chain(std::iter::once(column.name.chars().count()))
                .max()
                .unwrap_or(0);
            widths.push(width);
            cells.push(rendered);
        }

        let mut out = String::new();
        out.push_str(&" ".repeat(index_width));
        for (column, width) in self.columns.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", column.name, width = width));
        }
        for (offset, row) in (start..end).enumerate() {
            out.push('\n');
            out.push_str(&format!("{:<width$}", row, width = index_width));
            for (col_cells, width) in cells.iter().zip(&widths) {
                out.push_str(&format!("  {:>width$}", col_cells[offset], width = width));
            }
        }
        out
    }

    /// Render the last `n` rows
    pub fn render_tail(&self, n: usize) -> String {
        let rows = self.row_count();
        self.render_rows(rows.saturating_sub(n), rows)
    }
}

/// Total ordering over optional floats with missing values last
pub(crate) fn cmp_missing_last<T: PartialOrd>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::new(
                "region",
                ColumnValue::Text(vec![Some("N".into()), None, Some("S".into())]),
            ),
            Column::new("revenue", ColumnValue::Float(vec![Some(1.5), Some(f64::NAN), None])),
        ])
        .unwrap()
    }

    #[test]
    fn test_row_and_column_counts() {
        let table = sample();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_names(), vec!["region", "revenue"]);
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = Table::from_columns(vec![
            Column::new("a", ColumnValue::Integer(vec![Some(1), Some(2)])),
            Column::new("b", ColumnValue::Integer(vec![Some(1)])),
        ]);
        assert!(result.unwrap_err().contains("Column 'b' has 1 rows"));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = Table::from_columns(vec![
            Column::new("a", ColumnValue::Integer(vec![Some(1)])),
            Column::new("a", ColumnValue::Integer(vec![Some(2)])),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_nan_reads_as_missing() {
        let table = sample();
        let revenue = table.column("revenue").unwrap();
        assert_eq!(revenue.values.get(1), Value::Missing);
        assert_eq!(revenue.values.numbers().unwrap(), vec![Some(1.5), None, None]);
        assert_eq!(revenue.missing_count(), 2);
    }

    #[test]
    fn test_distinct_count_ignores_missing() {
        let table = sample();
        assert_eq!(table.column("region").unwrap().distinct_count(), 2);
    }

    #[test]
    fn test_reorder_rows() {
        let table = sample().reorder_rows(&[2, 0, 1]);
        let region = table.column("region").unwrap();
        assert_eq!(region.values.get(0), Value::Text("S".into()));
        assert_eq!(region.values.get(2), Value::Missing);
    }

    #[test]
    fn test_render_tail() {
        let rendered = sample().render_tail(2);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("region"));
        assert!(lines[1].starts_with('1'));
        assert!(lines[2].contains('S'));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(3.14159), "3.14159");
        assert_eq!(format_number(-0.0000001), "0");
    }
}
