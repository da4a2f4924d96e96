//! Error types for manifest-lint.
//!
//! Only input problems are errors. Rule violations are reported as
//! [`Finding`](crate::types::Finding)s and never surface here.

use thiserror::Error;

/// Errors that can occur before validation starts.
#[derive(Debug, Error)]
pub enum LintError {
    /// The input is not well-formed YAML or JSON.
    #[error("{}", format_parse_error(.message, .line, .column))]
    Parse {
        /// Parser message
        message: String,
        /// 1-indexed line, when the parser reported one
        line: Option<usize>,
        /// 1-indexed column, when the parser reported one
        column: Option<usize>,
    },

    /// Reading an input or configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration could not be parsed or is inconsistent.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl LintError {
    /// Build a parse error from a YAML parser failure.
    pub fn from_yaml(err: &serde_yaml::Error) -> Self {
        let location = err.location();
        Self::Parse {
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }

    /// Build a parse error from a JSON parser failure.
    pub fn from_json(err: &serde_json::Error) -> Self {
        let (line, column) = if err.line() > 0 {
            (Some(err.line()), Some(err.column()))
        } else {
            (None, None)
        };
        Self::Parse {
            message: err.to_string(),
            line,
            column,
        }
    }
}

fn format_parse_error(message: &str, line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!("parse error at {}:{}: {}", line, column, message),
        (Some(line), None) => format!("parse error at line {}: {}", line, message),
        _ => format!("parse error: {}", message),
    }
}

/// Result type alias for fallible manifest-lint operations.
pub type Result<T> = std::result::Result<T, LintError>;
