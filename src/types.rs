//! Core types for manifest-lint.
//!
//! - `Severity` - how a finding should be treated by a CI gate
//! - `RuleCode` - stable rule identifiers (e.g., "KM1001")
//! - `RuleCategory` - groups of rules by artifact and concern
//! - `Subject` - which artifact (and document) a finding is about
//! - `Finding` - a single reported validation result

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::DocPath;

/// Severity levels for findings.
///
/// Ordered from most severe to least severe: `Error > Warning > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Should fail a CI gate
    Error,
    /// Advisory, should usually be fixed
    #[default]
    Warning,
    /// Informational
    Info,
}

impl Severity {
    /// Parse a severity from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Error => 2,
            Self::Warning => 1,
            Self::Info => 0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Rule categories, one per code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    /// Resource metadata rules (KM1xxx)
    Resource,
    /// Kind-specific structure rules (KM2xxx)
    Workload,
    /// Resource quantity heuristics (KM3xxx)
    Quantity,
    /// Chart descriptor and values rules (HC1xxx, HC2xxx)
    Chart,
    /// Dockerfile instruction rules (DF1xxx)
    Build,
    /// Image tag rules (DF2xxx)
    ImageTag,
    /// Secret scanning rules (SC1xxx)
    Secret,
    /// RBAC permission rules (SC2xxx)
    Rbac,
    /// Quota total rules (AG1xxx)
    Aggregation,
    /// Minimal JSON-schema rules (JS1xxx)
    Schema,
    /// Results surfaced from external linters (EX1xxx)
    External,
}

impl RuleCategory {
    /// Get the code prefix for this category.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Resource => "KM1",
            Self::Workload => "KM2",
            Self::Quantity => "KM3",
            Self::Chart => "HC",
            Self::Build => "DF1",
            Self::ImageTag => "DF2",
            Self::Secret => "SC1",
            Self::Rbac => "SC2",
            Self::Aggregation => "AG1",
            Self::Schema => "JS1",
            Self::External => "EX1",
        }
    }

    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Resource => "Resource Metadata",
            Self::Workload => "Workload Structure",
            Self::Quantity => "Resource Quantities",
            Self::Chart => "Helm Chart",
            Self::Build => "Dockerfile",
            Self::ImageTag => "Image Tag",
            Self::Secret => "Secrets",
            Self::Rbac => "RBAC",
            Self::Aggregation => "Quota Totals",
            Self::Schema => "Schema",
            Self::External => "External Linter",
        }
    }

    /// Determine category from rule code.
    pub fn from_code(code: &str) -> Option<Self> {
        [
            Self::Resource,
            Self::Workload,
            Self::Quantity,
            Self::Chart,
            Self::Build,
            Self::ImageTag,
            Self::Secret,
            Self::Rbac,
            Self::Aggregation,
            Self::Schema,
            Self::External,
        ]
        .into_iter()
        .find(|category| code.starts_with(category.prefix()))
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A rule code identifier (e.g., "KM1001", "SC2003").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleCode(pub String);

impl RuleCode {
    /// Create a new rule code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the category for this rule.
    pub fn category(&self) -> Option<RuleCategory> {
        RuleCategory::from_code(&self.0)
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RuleCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RuleCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The artifact a finding refers to.
///
/// `document` is the index inside a multi-document stream, when the
/// artifact is one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    /// Artifact identifier, usually a file path.
    pub artifact: String,
    /// Index of the document within a stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<usize>,
}

impl Subject {
    /// A whole artifact.
    pub fn new(artifact: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            document: None,
        }
    }

    /// One document of a multi-document artifact.
    pub fn document(artifact: impl Into<String>, index: usize) -> Self {
        Self {
            artifact: artifact.into(),
            document: Some(index),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.document {
            Some(index) => write!(f, "{}#{}", self.artifact, index),
            None => write!(f, "{}", self.artifact),
        }
    }
}

/// A single validation result.
///
/// Findings are plain values: validators build them, callers own them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// The rule that produced this finding.
    pub code: RuleCode,
    /// How severe the finding is.
    pub severity: Severity,
    /// Artifact and document the finding is about.
    pub subject: Subject,
    /// Key path inside the document, if the finding points at a field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// 1-indexed line for text-based rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Human-readable description.
    pub message: String,
}

impl Finding {
    /// Create a new finding without a path or line.
    pub fn new(
        code: impl Into<RuleCode>,
        severity: Severity,
        subject: &Subject,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            subject: subject.clone(),
            path: None,
            line: None,
            message: message.into(),
        }
    }

    /// Attach a document path.
    pub fn at(mut self, path: &DocPath) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// Attach a line number.
    pub fn on_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// The category derived from the rule code.
    pub fn category(&self) -> Option<RuleCategory> {
        self.code.category()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.subject)?;
        if let Some(path) = &self.path {
            write!(f, ":{}", path)?;
        }
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, ": {} {} {}", self.severity, self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(
            [Severity::Info, Severity::Error, Severity::Warning]
                .into_iter()
                .max(),
            Some(Severity::Error)
        );
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!(Severity::parse("error"), Some(Severity::Error));
        assert_eq!(Severity::parse("WARNING"), Some(Severity::Warning));
        assert_eq!(Severity::parse("Info"), Some(Severity::Info));
        assert_eq!(Severity::parse("style"), None);
    }

    #[test]
    fn test_rule_category_from_code() {
        assert_eq!(RuleCategory::from_code("KM1001"), Some(RuleCategory::Resource));
        assert_eq!(RuleCategory::from_code("KM2003"), Some(RuleCategory::Workload));
        assert_eq!(RuleCategory::from_code("HC2001"), Some(RuleCategory::Chart));
        assert_eq!(RuleCategory::from_code("DF2002"), Some(RuleCategory::ImageTag));
        assert_eq!(RuleCategory::from_code("SC2001"), Some(RuleCategory::Rbac));
        assert_eq!(RuleCategory::from_code("XX1001"), None);
    }

    #[test]
    fn test_finding_display() {
        let subject = Subject::document("deploy.yaml", 2);
        let finding = Finding::new("KM2001", Severity::Error, &subject, "Missing spec.selector")
            .at(&DocPath::root().key("spec").key("selector"));
        assert_eq!(
            finding.to_string(),
            "deploy.yaml#2:spec.selector: error KM2001 Missing spec.selector"
        );
    }

    #[test]
    fn test_finding_serializes_flat_shape() {
        let subject = Subject::new("f.yaml");
        let finding = Finding::new("SC1001", Severity::Warning, &subject, "Potential password")
            .on_line(1);
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["code"], "SC1001");
        assert_eq!(json["subject"]["artifact"], "f.yaml");
        assert_eq!(json["line"], 1);
        assert!(json.get("path").is_none());
    }
}
