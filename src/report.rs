//! The report handed back to callers.
//!
//! A report keeps findings in the order validators produced them. Nothing
//! is sorted or deduplicated.

use serde::Serialize;

use crate::aggregate::ResourceQuantity;
use crate::config::LintConfig;
use crate::types::{Finding, Severity, Subject};

/// Ordered findings from one or more validator runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Findings in production order.
    pub findings: Vec<Finding>,
    /// Number of errors.
    pub error_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
    /// Number of informational findings.
    pub info_count: usize,
    /// Summed resource requests, when a quota pass ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<ResourceQuantity>,
}

impl Report {
    /// Create a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a report from findings, keeping their order.
    pub fn from_findings(findings: impl IntoIterator<Item = Finding>) -> Self {
        let mut report = Self::new();
        report.extend(findings);
        report
    }

    pub fn push(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Info => self.info_count += 1,
        }
        self.findings.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.push(finding);
        }
    }

    /// Append another report. Totals are summed when either side has them.
    pub fn merge(&mut self, other: Report) {
        self.totals = match (self.totals, other.totals) {
            (Some(a), Some(b)) => Some(a + b),
            (a, b) => a.or(b),
        };
        self.extend(other.findings);
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Get the maximum severity in the report.
    pub fn max_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    /// Check if the report should fail a CI gate.
    pub fn should_fail(&self, config: &LintConfig) -> bool {
        self.max_severity()
            .is_some_and(|max| max >= config.failure_threshold)
    }

    /// Findings for one artifact, in order.
    pub fn for_artifact<'a>(&'a self, artifact: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings
            .iter()
            .filter(move |f| f.subject.artifact == artifact)
    }
}

/// Outcome of an external linter run (`helm lint`, `kubeval`, ...).
///
/// Running the tool is the caller's job; this only turns its result into
/// findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLintResult {
    pub tool: String,
    pub passed: bool,
    pub stderr: String,
}

impl ExternalLintResult {
    pub fn new(tool: impl Into<String>, passed: bool, stderr: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            passed,
            stderr: stderr.into(),
        }
    }

    /// Zero findings on success, one otherwise.
    ///
    /// kubeval failures are warnings since it rejects CRDs it has no schema for.
    pub fn into_findings(self, subject: &Subject) -> Vec<Finding> {
        if self.passed {
            return Vec::new();
        }
        let severity = if self.tool == "kubeval" {
            Severity::Warning
        } else {
            Severity::Error
        };
        let detail = self.stderr.trim();
        let message = if detail.is_empty() {
            format!("{} failed", self.tool)
        } else {
            format!("{} failed: {}", self.tool, detail)
        };
        vec![Finding::new("EX1001", severity, subject, message)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(code: &str, severity: Severity, artifact: &str) -> Finding {
        Finding::new(code, severity, &Subject::new(artifact), "msg")
    }

    #[test]
    fn test_counts_and_order() {
        let report = Report::from_findings([
            finding("KM1005", Severity::Warning, "a.yaml"),
            finding("KM1001", Severity::Error, "a.yaml"),
            finding("DF1009", Severity::Info, "Dockerfile"),
        ]);
        assert_eq!(report.len(), 3);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);
        assert_eq!(report.info_count, 1);
        assert_eq!(report.findings[0].code.as_str(), "KM1005");
        assert_eq!(report.for_artifact("a.yaml").count(), 2);
        assert_eq!(report.max_severity(), Some(Severity::Error));
    }

    #[test]
    fn test_should_fail_threshold() {
        let report = Report::from_findings([finding("KM1005", Severity::Warning, "a.yaml")]);
        assert!(!report.should_fail(&LintConfig::default()));
        assert!(report.should_fail(&LintConfig::default().with_threshold(Severity::Warning)));
        assert!(!Report::new().should_fail(&LintConfig::default().with_threshold(Severity::Info)));
    }

    #[test]
    fn test_merge() {
        let mut first = Report::from_findings([finding("KM1001", Severity::Error, "a.yaml")]);
        first.totals = Some(ResourceQuantity::new(1.0, 128.0));
        let mut second = Report::from_findings([finding("HC2001", Severity::Warning, "values.yaml")]);
        second.totals = Some(ResourceQuantity::new(0.5, 128.0));

        first.merge(second);
        assert_eq!(first.len(), 2);
        assert!(first.has_errors() && first.has_warnings());
        assert_eq!(first.totals, Some(ResourceQuantity::new(1.5, 256.0)));
    }

    #[test]
    fn test_external_results() {
        let subject = Subject::new("charts/web");
        assert!(ExternalLintResult::new("helm lint", true, "").into_findings(&subject).is_empty());

        let findings = ExternalLintResult::new("helm lint", false, "Error: chart metadata missing\n")
            .into_findings(&subject);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].message, "helm lint failed: Error: chart metadata missing");

        let findings = ExternalLintResult::new("kubeval", false, "").into_findings(&subject);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].code.as_str(), "EX1001");
    }
}
