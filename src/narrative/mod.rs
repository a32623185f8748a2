//! Narrative generation boundary
//!
//! The analysis core hands a text prompt to an external text generator and
//! gets prose back. The generator is abstracted as [`Narrator`]; this crate
//! ships no network client. Every failure on the far side of the boundary
//! is turned into a message string, so nothing from the generator
//! propagates as an error.
//!
//! Applications embedding the crate implement [`Narrator`] for their model
//! client and call [`generate_insights`]; the `insight prompt` command only
//! prints the prompt that would be sent.

mod prompt;

pub use prompt::{build_data_summary, build_prompt};

use crate::config::{AnalysisConfig, NarrativeConfig};
use crate::core::trends::Insight;
use crate::types::Table;
use tracing::{info, warn};

/// What a narrator receives for one call
#[derive(Debug, Clone)]
pub struct NarrativeRequest<'a> {
    pub prompt: &'a str,
    pub api_key: &'a str,
    pub model_name: &'a str,
    pub temperature: f64,
}

/// An external text generator
pub trait Narrator {
    fn generate(&self, request: &NarrativeRequest<'_>) -> anyhow::Result<String>;
}

/// Message shown when no API key is configured
pub fn missing_key_message(config: &NarrativeConfig) -> String {
    format!(
        "Please configure your {} to get AI-powered insights.",
        config.api_key_env
    )
}

/// Build the prompt, call `narrator`, and return user-facing text.
///
/// Without an API key the narrator is never called. Narrator errors become
/// an "Error generating insights" message. Dollar signs in generated text
/// are escaped so markdown renderers do not treat them as math delimiters.
pub fn generate_insights(
    table: &Table,
    anomalies_summary: &str,
    trends: &[Insight],
    api_key: Option<&str>,
    narrator: &dyn Narrator,
    config: &AnalysisConfig,
) -> String {
    let Some(api_key) = api_key.filter(|key| !key.trim().is_empty()) else {
        return missing_key_message(&config.narrative);
    };

    let summary = build_data_summary(table, anomalies_summary, trends, config);
    let prompt = build_prompt(&summary);
    let request = NarrativeRequest {
        prompt: &prompt,
        api_key,
        model_name: &config.narrative.model_name,
        temperature: config.narrative.temperature,
    };

    match narrator.generate(&request) {
        Ok(text) => {
            info!(model = %config.narrative.model_name, chars = text.len(), "narrative generated");
            text.replace('$', "\\$")
        }
        Err(e) => {
            warn!(error = %e, "narrative generation failed");
            format!(
                "Error generating insights: {e}\n\nPlease check your API key and internet connection."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, ColumnValue};
    use std::cell::RefCell;

    struct Echo {
        seen: RefCell<Option<(String, String, f64)>>,
    }

    impl Narrator for Echo {
        fn generate(&self, request: &NarrativeRequest<'_>) -> anyhow::Result<String> {
            *self.seen.borrow_mut() = Some((
                request.api_key.to_string(),
                request.model_name.to_string(),
                request.temperature,
            ));
            Ok("Revenue hit $1,200 in the North".to_string())
        }
    }

    struct Failing;

    impl Narrator for Failing {
        fn generate(&self, _request: &NarrativeRequest<'_>) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    fn table() -> Table {
        Table::from_columns(vec![Column::new(
            "revenue",
            ColumnValue::Integer(vec![Some(1), Some(2)]),
        )])
        .unwrap()
    }

    #[test]
    fn test_missing_key_skips_narrator() {
        let narrator = Echo {
            seen: RefCell::new(None),
        };
        let config = AnalysisConfig::default();
        let text = generate_insights(&table(), "", &[], None, &narrator, &config);
        assert_eq!(text, "Please configure your GEMINI_API_KEY to get AI-powered insights.");
        assert!(narrator.seen.borrow().is_none());

        let text = generate_insights(&table(), "", &[], Some("  "), &narrator, &config);
        assert!(text.starts_with("Please configure"));
    }

    #[test]
    fn test_success_escapes_dollars() {
        let narrator = Echo {
            seen: RefCell::new(None),
        };
        let config = AnalysisConfig::default();
        let text = generate_insights(&table(), "", &[], Some("key"), &narrator, &config);
        assert_eq!(text, "Revenue hit \\$1,200 in the North");
        let seen = narrator.seen.borrow().clone().unwrap();
        assert_eq!(seen, ("key".to_string(), "gemini-2.5-flash".to_string(), 0.7));
    }

    #[test]
    fn test_failure_becomes_message() {
        let text = generate_insights(&table(), "", &[], Some("key"), &Failing, &AnalysisConfig::default());
        assert!(text.starts_with("Error generating insights: connection refused"));
        assert!(text.ends_with("Please check your API key and internet connection."));
    }
}
