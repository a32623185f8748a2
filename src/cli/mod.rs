//! CLI command handlers

pub mod commands;

pub use commands::{aggregate, analyze, anomalies, classify, correlate, describe, prompt, trends};
