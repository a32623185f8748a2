use crate::config::{AnalysisConfig, AnomalyConfig};
use crate::core::aggregate::{aggregate_by_category, AggregateRow};
use crate::core::anomaly::{detect, scan_anomalies, AnomalyMethod, AnomalySettings, DetectionStatus};
use crate::core::classifier::{classify_columns, ColumnRole};
use crate::core::correlation::calculate_correlations;
use crate::core::describe::{date_range, describe as describe_columns, render_summaries};
use crate::core::report::analyze as analyze_table;
use crate::core::trends::{analyze_trends, Insight};
use crate::error::{InsightError, InsightResult};
use crate::loader::load_table;
use crate::narrative::{build_data_summary, build_prompt, missing_key_message};
use crate::types::{format_number, Table};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Flags shared by every command
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Optional YAML configuration file
    pub config: Option<PathBuf>,
    /// Print machine-readable JSON instead of colored text
    pub json: bool,
    /// Show verbose steps
    pub verbose: bool,
}

/// Load configuration from `path`, or the built-in defaults
pub fn load_config(path: Option<&Path>) -> InsightResult<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::load(path),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Resolve `--method` / `--threshold` into validated settings.
///
/// The method defaults to Z-Score; a missing threshold takes the method's
/// configured default.
pub fn resolve_settings(
    method: Option<&str>,
    threshold: Option<f64>,
    config: &AnomalyConfig,
) -> InsightResult<AnomalySettings> {
    let method = match method {
        Some(m) => m.parse::<AnomalyMethod>().map_err(InsightError::Validation)?,
        None => AnomalyMethod::ZScore,
    };
    match threshold {
        Some(t) => AnomalySettings::new(method, t, config),
        None => Ok(AnomalySettings::default_for(method, config)),
    }
}

fn print_json<T: Serialize>(value: &T) -> InsightResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the command banner and load config and table
fn prepare(title: &str, file: &Path, opts: &Options) -> InsightResult<(AnalysisConfig, Table)> {
    if !opts.json {
        println!("{}", format!("📈 Sales Insight - {}", title).bold().green());
        println!("   File: {}", file.display());
        if let Some(ref config) = opts.config {
            println!("   Config: {}", config.display());
        }
        println!();
    }

    let config = load_config(opts.config.as_deref())?;

    if opts.verbose && !opts.json {
        println!("{}", "📖 Loading table...".cyan());
    }
    let table = load_table(file)?;
    if opts.verbose && !opts.json {
        println!(
            "   Found {} rows, {} columns\n",
            table.row_count(),
            table.column_count()
        );
    }
    Ok((config, table))
}

/// Execute the analyze command - every analysis in one pass
pub fn analyze(
    file: PathBuf,
    method: Option<String>,
    threshold: Option<f64>,
    opts: Options,
) -> InsightResult<()> {
    let (config, table) = prepare("Analysis", &file, &opts)?;
    let settings = resolve_settings(method.as_deref(), threshold, &config.anomaly)?;
    let report = analyze_table(&table, &config, &settings);

    if opts.json {
        return print_json(&report);
    }

    println!("{}", "📋 Dataset Overview:".bold().cyan());
    println!("   Rows: {}", report.row_count.to_string().bold());
    println!("   Columns: {}", report.columns.join(", "));
    if let Some(ref range) = report.date_range {
        println!("   {} ({} periods)", range.describe(), range.periods);
    }
    println!();

    let (numeric, date, categorical) = report.classification.as_tuple();
    print_classification(numeric, date, categorical);

    println!("{}", "📊 Key Statistics:".bold().cyan());
    println!("{}\n", indent(&render_summaries(&report.summaries)));

    println!(
        "{}",
        format!("🚨 Anomalies ({} @ {}):", report.anomalies.method, format_number(report.anomalies.threshold))
            .bold()
            .cyan()
    );
    if report.anomalies.findings.is_empty() {
        println!("   {}", report.anomalies.summary_text().green());
    } else {
        for finding in &report.anomalies.findings {
            println!(
                "   {} {}: {} rows {:?}",
                "⚠️".yellow(),
                finding.column.bright_blue(),
                finding.count.to_string().yellow(),
                finding.indices
            );
        }
    }
    println!();

    if let Some(ref breakdown) = report.breakdown {
        println!(
            "{}",
            format!(
                "🏷️  {} by {}:",
                breakdown.value_column, breakdown.category_column
            )
            .bold()
            .cyan()
        );
        print_aggregate_table(&breakdown.rows);
        println!();
    }

    if let Some(ref matrix) = report.correlations {
        println!("{}", "🔗 Correlations:".bold().cyan());
        println!("{}\n", indent(&matrix.render()));
    }

    print_trends(&report.trends);
    Ok(())
}

/// Execute the classify command
pub fn classify(file: PathBuf, opts: Options) -> InsightResult<()> {
    let (config, table) = prepare("Column Classification", &file, &opts)?;
    let classification = classify_columns(&table, &config.classification);

    if opts.json {
        return print_json(&classification);
    }

    let (numeric, date, categorical) = classification.as_tuple();
    print_classification(numeric, date, categorical);

    if opts.verbose {
        println!("{}", "🔎 Per column:".bold().cyan());
        for column in table.columns() {
            let role = classification.role(&column.name).unwrap_or(ColumnRole::Unclassified);
            println!(
                "   {:<20} {:<9} {:>6} distinct  {:>6} missing  → {}",
                column.name.bright_blue(),
                column.values.type_name(),
                column.distinct_count(),
                column.missing_count(),
                role.label().bold()
            );
        }
    }

    let unclassified = classification.unclassified();
    if !unclassified.is_empty() {
        println!("   {} Unclassified: {}", "ℹ️".cyan(), unclassified.join(", "));
    }
    Ok(())
}

/// Execute the anomalies command - one column, or every numeric column
pub fn anomalies(
    file: PathBuf,
    column: Option<String>,
    method: Option<String>,
    threshold: Option<f64>,
    opts: Options,
) -> InsightResult<()> {
    let (config, table) = prepare("Anomaly Detection", &file, &opts)?;
    let settings = resolve_settings(method.as_deref(), threshold, &config.anomaly)?;

    if !opts.json {
        println!(
            "   Method: {}  Threshold: {}",
            settings.method().to_string().bright_yellow().bold(),
            format_number(settings.threshold()).bold()
        );
        if opts.verbose {
            let a = &config.anomaly;
            let (min, max) = match settings.method() {
                AnomalyMethod::ZScore => (a.min_z_threshold, a.max_z_threshold),
                AnomalyMethod::Iqr => (a.min_iqr_multiplier, a.max_iqr_multiplier),
            };
            println!("   Allowed range: [{}, {}]", format_number(min), format_number(max));
        }
        println!();
    }

    let Some(column) = column else {
        let classification = classify_columns(&table, &config.classification);
        let report = scan_anomalies(&table, &classification.numeric, &settings);
        if opts.json {
            return print_json(&report);
        }
        println!(
            "{}",
            format!("🚨 Scanned {} numeric columns:", report.columns_scanned)
                .bold()
                .cyan()
        );
        println!("{}", indent(&report.summary_text()));
        println!();
        println!(
            "   {} Total anomalies: {}",
            if report.total_anomalies() == 0 { "✅".green() } else { "⚠️".yellow() },
            report.total_anomalies().to_string().bold()
        );
        return Ok(());
    };

    let detection = detect(&table, &column, &settings);
    if opts.json {
        return print_json(&detection);
    }

    println!("{}", format!("🚨 Column: {}", column).bold().cyan());
    match detection.status {
        DetectionStatus::NotApplicable => {
            println!(
                "   {} Column is missing or not numeric - nothing to detect",
                "⚠️".yellow()
            );
        }
        DetectionStatus::Degenerate => {
            println!(
                "   {} No spread in the data (all missing or constant) - no anomalies",
                "ℹ️".cyan()
            );
        }
        DetectionStatus::Computed => {
            if let Some((lower, upper)) = detection.bounds {
                println!(
                    "   Normal range: [{}, {}]",
                    format_number(lower),
                    format_number(upper)
                );
            }
            let values = &table
                .column(&column)
                .ok_or_else(|| InsightError::column_not_found(&column, &table))?
                .values;
            for row in detection.indices() {
                println!("   {} row {}: {}", "⚠️".yellow(), row, values.get(row).to_string().red());
            }
            println!(
                "\n   Flagged {} of {} rows",
                detection.count().to_string().bold(),
                detection.mask.len()
            );
        }
    }
    Ok(())
}

/// Execute the aggregate command
pub fn aggregate(
    file: PathBuf,
    category: Option<String>,
    value: Option<String>,
    top: Option<usize>,
    opts: Options,
) -> InsightResult<()> {
    let (mut config, table) = prepare("Category Aggregation", &file, &opts)?;
    if let Some(top) = top {
        config.aggregation.top_n = top;
    }

    let classification = classify_columns(&table, &config.classification);
    let category = category
        .or_else(|| classification.categorical.first().cloned())
        .ok_or_else(|| InsightError::Validation("No categorical column available".to_string()))?;
    let value = value
        .or_else(|| classification.numeric.first().cloned())
        .ok_or_else(|| InsightError::Validation("No numeric column available".to_string()))?;

    let rows = aggregate_by_category(&table, &category, &value, &config.aggregation)?;
    if opts.json {
        return print_json(&rows);
    }

    println!(
        "{}",
        format!("🏷️  {} by {} (top {}):", value, category, config.aggregation.top_n)
            .bold()
            .cyan()
    );
    if rows.is_empty() {
        println!("   {} No rows ('{}' is not numeric)", "⚠️".yellow(), value);
    } else {
        print_aggregate_table(&rows);
    }
    Ok(())
}

/// Execute the trends command
pub fn trends(file: PathBuf, opts: Options) -> InsightResult<()> {
    let (config, table) = prepare("Trends", &file, &opts)?;
    let insights = analyze_trends(&table, &config.trends);

    if opts.json {
        return print_json(&insights);
    }

    if insights.is_empty() {
        println!(
            "   {} No '{}' column with numeric values - no trends to report",
            "ℹ️".cyan(),
            config.trends.revenue_column
        );
        return Ok(());
    }
    print_trends(&insights);
    Ok(())
}

/// Execute the describe command - summary statistics of numeric columns
pub fn describe(file: PathBuf, opts: Options) -> InsightResult<()> {
    let (config, table) = prepare("Summary Statistics", &file, &opts)?;
    let classification = classify_columns(&table, &config.classification);
    let summaries = describe_columns(&table, &classification.numeric);
    let range = date_range(&table, &config.trends.date_column);

    if opts.json {
        return print_json(&serde_json::json!({
            "summaries": summaries,
            "date_range": range,
        }));
    }

    if let Some(range) = range {
        println!("   {} ({} periods)\n", range.describe(), range.periods);
    }
    println!("{}", "📊 Key Statistics:".bold().cyan());
    println!("{}", indent(&render_summaries(&summaries)));
    Ok(())
}

/// Execute the correlate command
pub fn correlate(file: PathBuf, opts: Options) -> InsightResult<()> {
    let (config, table) = prepare("Correlations", &file, &opts)?;
    let classification = classify_columns(&table, &config.classification);
    let matrix = calculate_correlations(&table, &classification.numeric);

    if opts.json {
        return print_json(&matrix);
    }

    let Some(matrix) = matrix else {
        println!(
            "   {} Need at least two numeric columns for correlations",
            "ℹ️".cyan()
        );
        return Ok(());
    };

    println!("{}", "🔗 Correlation Matrix:".bold().cyan());
    println!("{}\n", indent(&matrix.render()));

    let pairs = matrix.strongest_pairs();
    if !pairs.is_empty() {
        println!("{}", "💪 Strongest pairs:".bold().cyan());
        for (a, b, r) in pairs.iter().take(5) {
            println!(
                "   {} ↔ {}: {}",
                a.bright_blue(),
                b.bright_blue(),
                format_number((r * 1000.0).round() / 1000.0).bold()
            );
        }
    }
    Ok(())
}

/// Execute the prompt command - print what would be sent to the narrative generator
pub fn prompt(
    file: PathBuf,
    method: Option<String>,
    threshold: Option<f64>,
    opts: Options,
) -> InsightResult<()> {
    let (config, table) = prepare("Narrative Prompt", &file, &opts)?;
    let settings = resolve_settings(method.as_deref(), threshold, &config.anomaly)?;

    let classification = classify_columns(&table, &config.classification);
    let anomalies = scan_anomalies(&table, &classification.numeric, &settings);
    let insights = analyze_trends(&table, &config.trends);
    let summary = build_data_summary(&table, &anomalies.summary_text(), &insights, &config);
    let prompt = build_prompt(&summary);

    if opts.json {
        return print_json(&serde_json::json!({
            "model": config.narrative.model_name,
            "temperature": config.narrative.temperature,
            "prompt": prompt,
        }));
    }

    if config.narrative.api_key().is_none() {
        println!("   {} {}\n", "⚠️".yellow(), missing_key_message(&config.narrative).yellow());
    } else if opts.verbose {
        println!(
            "   Model: {}  Temperature: {}\n",
            config.narrative.model_name.bright_yellow(),
            format_number(config.narrative.temperature)
        );
    }
    println!("{}", prompt);
    Ok(())
}

//==============================================================================
// Output helpers
//==============================================================================

fn print_classification(numeric: &[String], date: &[String], categorical: &[String]) {
    println!("{}", "🧭 Column Roles:".bold().cyan());
    println!("   Numeric:     {}", list_or_none(numeric).bright_blue());
    println!("   Date:        {}", list_or_none(date).bright_blue());
    println!("   Categorical: {}", list_or_none(categorical).bright_blue());
    println!();
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

fn print_aggregate_table(rows: &[AggregateRow]) {
    println!("   {}", "─".repeat(62));
    println!(
        "   {:<24} {:>14} {:>14} {:>7}",
        "Category".bold(),
        "Sum".bold(),
        "Mean".bold(),
        "Count".bold()
    );
    println!("   {}", "─".repeat(62));
    for row in rows {
        let mean = row.mean.map(format_number).unwrap_or_else(|| "n/a".to_string());
        println!(
            "   {:<24} {:>14} {:>14} {:>7}",
            row.category.to_string(),
            format_number(row.sum).green(),
            mean,
            row.count
        );
    }
}

fn print_trends(insights: &[Insight]) {
    if insights.is_empty() {
        return;
    }
    println!("{}", "📈 Trends:".bold().cyan());
    for insight in insights {
        println!("{}", indent(&insight.describe()));
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("   {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_settings_defaults_to_zscore() {
        let config = AnomalyConfig::default();
        let settings = resolve_settings(None, None, &config).unwrap();
        assert_eq!(settings.method(), AnomalyMethod::ZScore);
        assert_eq!(settings.threshold(), 2.5);
    }

    #[test]
    fn test_resolve_settings_iqr_default_multiplier() {
        let config = AnomalyConfig::default();
        let settings = resolve_settings(Some("iqr"), None, &config).unwrap();
        assert_eq!(settings.method(), AnomalyMethod::Iqr);
        assert_eq!(settings.threshold(), 1.5);
    }

    #[test]
    fn test_resolve_settings_rejects_out_of_range() {
        let config = AnomalyConfig::default();
        let err = resolve_settings(Some("zscore"), Some(5.0), &config).unwrap_err();
        assert!(matches!(err, InsightError::Validation(_)));
    }

    #[test]
    fn test_resolve_settings_rejects_unknown_method() {
        let config = AnomalyConfig::default();
        let err = resolve_settings(Some("mad"), None, &config).unwrap_err();
        assert!(err.to_string().contains("Unknown anomaly method 'mad'"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("insight.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "aggregation:\n  top_n: 3").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.aggregation.top_n, 3);
        assert_eq!(config.anomaly.default_z_threshold, 2.5);
        assert_eq!(load_config(None).unwrap().aggregation.top_n, 15);
    }

    #[test]
    fn test_indent_and_list_helpers() {
        assert_eq!(indent("a\nb"), "   a\n   b");
        assert_eq!(list_or_none(&[]), "(none)");
        assert_eq!(list_or_none(&["x".to_string(), "y".to_string()]), "x, y");
    }

    #[test]
    fn test_aggregate_requires_category_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("numbers.csv");
        std::fs::write(&path, "a,b\n1,2\n3,4\n").unwrap();

        let err = aggregate(path, None, None, None, Options::default()).unwrap_err();
        assert!(err.to_string().contains("No categorical column available"));
    }
}
