//! Output formatters for lint reports.
//!
//! - Text: one line per finding plus a summary
//! - JSON: machine-readable report

pub mod json;
pub mod text;

use crate::report::Report;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON format for machine parsing
    Json,
}

impl OutputFormat {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "default" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Format a report to a string.
pub fn format_report(report: &Report, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => text::format(report),
        OutputFormat::Json => json::format(report),
    }
}
