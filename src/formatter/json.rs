//! JSON formatter.
//!
//! Produces machine-readable JSON output.

use serde::Serialize;

use crate::report::Report;

/// JSON output structure for a finding.
#[derive(Serialize)]
struct JsonFinding<'a> {
    code: &'a str,
    severity: &'static str,
    category: Option<&'static str>,
    artifact: &'a str,
    document: Option<usize>,
    path: Option<&'a str>,
    line: Option<u32>,
    message: &'a str,
}

/// Format a report as pretty-printed JSON.
pub fn format(report: &Report) -> String {
    #[derive(Serialize)]
    struct JsonOutput<'a> {
        error_count: usize,
        warning_count: usize,
        info_count: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        totals: Option<crate::aggregate::ResourceQuantity>,
        findings: Vec<JsonFinding<'a>>,
    }

    let output = JsonOutput {
        error_count: report.error_count,
        warning_count: report.warning_count,
        info_count: report.info_count,
        totals: report.totals,
        findings: report
            .findings
            .iter()
            .map(|f| JsonFinding {
                code: f.code.as_str(),
                severity: f.severity.as_str(),
                category: f.category().map(|c| c.display_name()),
                artifact: &f.subject.artifact,
                document: f.subject.document,
                path: f.path.as_deref(),
                line: f.line,
                message: &f.message,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Finding, Severity, Subject};

    #[test]
    fn test_json_format_empty() {
        let json = format(&Report::new());
        assert!(json.contains("\"error_count\": 0"));
        assert!(json.contains("\"findings\": []"));
        assert!(!json.contains("totals"));
    }

    #[test]
    fn test_json_format_with_findings() {
        let report = Report::from_findings([Finding::new(
            "KM2001",
            Severity::Error,
            &Subject::document("deploy.yaml", 1),
            "Missing spec.selector in Deployment document 1",
        )]);
        let value: serde_json::Value = serde_json::from_str(&format(&report)).unwrap();
        let finding = &value["findings"][0];
        assert_eq!(finding["code"], "KM2001");
        assert_eq!(finding["severity"], "error");
        assert_eq!(finding["category"], "Workload Structure");
        assert_eq!(finding["document"], 1);
        assert!(finding["path"].is_null());
        assert_eq!(value["error_count"], 1);
    }
}
