//! Property tests for the outlier detectors
//!
//! Mask length always matches the table, missing rows are never flagged, and
//! raising the threshold never flags more rows.

use proptest::prelude::*;
use sales_insight::config::ClassificationConfig;
use sales_insight::core::{classify_columns, detect_iqr, detect_zscore};
use sales_insight::types::{Column, ColumnValue, Table};

fn cells() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.8, -1.0e6..1.0e6f64), 0..60)
}

fn table_of(values: Vec<Option<f64>>) -> Table {
    Table::from_columns(vec![Column::new("x", ColumnValue::Float(values))]).unwrap()
}

fn is_subset(smaller: &[bool], larger: &[bool]) -> bool {
    smaller.iter().zip(larger).all(|(s, l)| !*s || *l)
}

proptest! {
    #[test]
    fn mask_length_matches_rows(values in cells(), z in 1.5..4.0f64, m in 1.0..3.0f64) {
        let rows = values.len();
        let table = table_of(values);
        prop_assert_eq!(detect_zscore(&table, "x", z).len(), rows);
        prop_assert_eq!(detect_iqr(&table, "x", m).len(), rows);
    }

    #[test]
    fn missing_rows_never_flagged(values in cells(), z in 1.5..4.0f64, m in 1.0..3.0f64) {
        let table = table_of(values.clone());
        let zmask = detect_zscore(&table, "x", z);
        let imask = detect_iqr(&table, "x", m);
        for (row, cell) in values.iter().enumerate() {
            if cell.is_none() {
                prop_assert!(!zmask.get(row));
                prop_assert!(!imask.get(row));
            }
        }
    }

    #[test]
    fn zscore_monotone_in_threshold(values in cells(), a in 1.5..4.0f64, b in 1.5..4.0f64) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let table = table_of(values);
        let loose = detect_zscore(&table, "x", lo);
        let strict = detect_zscore(&table, "x", hi);
        prop_assert!(is_subset(strict.as_slice(), loose.as_slice()));
    }

    #[test]
    fn iqr_monotone_in_multiplier(values in cells(), a in 1.0..3.0f64, b in 1.0..3.0f64) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let table = table_of(values);
        let loose = detect_iqr(&table, "x", lo);
        let strict = detect_iqr(&table, "x", hi);
        prop_assert!(is_subset(strict.as_slice(), loose.as_slice()));
    }

    #[test]
    fn classification_is_stable(labels in prop::collection::vec("[a-e]{1,2}", 0..80)) {
        let table = Table::from_columns(vec![Column::new(
            "label",
            ColumnValue::Text(labels.into_iter().map(Some).collect()),
        )])
        .unwrap();
        let config = ClassificationConfig::default();
        prop_assert_eq!(classify_columns(&table, &config), classify_columns(&table, &config));
    }
}
