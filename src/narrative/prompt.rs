//! Prompt text for the narrative generator

use crate::config::AnalysisConfig;
use crate::core::classifier::classify_columns;
use crate::core::describe::{date_range, describe, render_summaries};
use crate::core::trends::Insight;
use crate::types::Table;

const INSTRUCTIONS: &str = "You are a senior data analyst for a retail company. Analyze the following sales dataset and provide a structured, executive-level business analysis.

IMPORTANT FORMATTING RULES:
- Format your response in clean, readable markdown.
- Use DOUBLE NEWLINES between all sections and paragraphs to ensure proper rendering.
- Ensure bullet points are properly spaced from the text above them.

IMPORTANT CONTENT RULES:
- Use a professional, non-technical business tone (avoid filler words).
- Quantify EVERY insight (e.g., \"Revenue grew by 15%\", \"North region contributes 60% of sales\"). DO NOT perform complex new calculations, but interpret the provided metrics and trends.
- Limit specific recommendations to exactly 2-3 high-impact actions.

Provide the following sections in strict markdown format:

1. **Top 3 Key Insights**
   - Provide the 3 most critical findings.
   - Must be quantitative and business-focused.

2. **Trends Identified**
   - Highlight key patterns (seasonality, growth, decline).
   - Support with specific data points from the summary.

3. **Anomalies Explanation**
   - Briefly explain the significance of any anomalies detected (or state \"No significant anomalies\" if none).
   - Assess if they represent a risk or opportunity.

4. **Data Assumptions & Limitations**
   - Briefly acknowledge constraints (e.g., \"Analysis based on limited sample,\" \"Seasonality may be affected by short timeframe\").
   - Mention that anomalies are statistically derived and require verification.

5. **Recommended Actions**
   - Provide EXACTLY 2-3 actionable, prioritized steps.
   - Link each recommendation to a specific insight from above.";

const CLOSING: &str = "Please provide a clear, concise, and PROPERLY FORMATTED business analysis with correct spacing and punctuation.";

/// Dataset overview handed to the generator
pub fn build_data_summary(
    table: &Table,
    anomalies_summary: &str,
    trends: &[Insight],
    config: &AnalysisConfig,
) -> String {
    let classification = classify_columns(table, &config.classification);
    let summaries = describe(table, &classification.numeric);

    let mut out = String::from("Dataset Overview:\n");
    out.push_str(&format!("- Total Records: {}\n", table.row_count()));
    out.push_str(&format!("- Columns: {}\n", table.column_names().join(", ")));
    if let Some(range) = date_range(table, &config.trends.date_column) {
        out.push_str(&format!("- {}\n", range.describe()));
    }

    out.push_str("\nKey Statistics:\n");
    out.push_str(&render_summaries(&summaries));
    out.push_str("\n\nAnomalies Detected:\n");
    out.push_str(anomalies_summary);

    if !trends.is_empty() {
        out.push_str("\n\nTrends:\n");
        let described: Vec<String> = trends.iter().map(Insight::describe).collect();
        out.push_str(&described.join("\n"));
    }

    out.push_str("\n\nRecent Data Sample:\n");
    out.push_str(&table.render_tail(config.narrative.sample_rows));
    out.push('\n');
    out
}

/// Full prompt: instructions, data summary, closing request
pub fn build_prompt(data_summary: &str) -> String {
    format!("{INSTRUCTIONS}\n\n{data_summary}\n{CLOSING}")
}
