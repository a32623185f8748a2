//! Date parsing against a fixed set of formats

use crate::types::ColumnValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-time layouts tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts tried in order (month-first for slashed dates)
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%b %d, %Y"];

/// Parse a single text cell as a date-time.
///
/// Accepts RFC 3339, the layouts above, and `YYYY-MM` (first of month).
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    // YYYY-MM
    if s.len() == 7 && s.as_bytes()[4] == b'-' {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parse every cell of a column as a date.
///
/// Returns `None` when any non-missing cell fails to parse or the storage
/// type cannot hold dates. Missing cells stay `None` in the output.
pub fn parse_column(values: &ColumnValue) -> Option<Vec<Option<NaiveDateTime>>> {
    match values {
        ColumnValue::DateTime(v) => Some(v.clone()),
        ColumnValue::Text(v) => v
            .iter()
            .map(|cell| match cell {
                None => Some(None),
                Some(s) if s.trim().is_empty() => Some(None),
                Some(s) => parse_date(s).map(Some),
            })
            .collect(),
        _ => None,
    }
}
