//! Linting orchestration.
//!
//! Ties parsing, the rule modules and configuration together. Documents of
//! a stream are validated in parallel; findings come back in document
//! order, and within a document in rule then traversal order.

use rayon::prelude::*;

use crate::aggregate::{aggregate_with_depth, aggregate_workloads, check_totals};
use crate::config::LintConfig;
use crate::document::{Document, parse, parse_stream};
use crate::error::Result;
use crate::report::Report;
use crate::rules::ResourceDescriptor;
use crate::rules::build::{
    check_best_practices, from_image_tags, validate_image_tag, validate_instructions,
};
use crate::rules::chart::{
    ChartDescriptor, check_values_resources, validate_chart_descriptor, validate_chart_name,
};
use crate::rules::quantity::validate_quantities_with_depth;
use crate::rules::resource::{
    validate_annotations_with, validate_api_version_and_kind, validate_labels_with,
    validate_naming_with, validate_required_fields,
};
use crate::rules::security::{SecretScanner, validate_rbac_with};
use crate::rules::workload::validate_structure;
use crate::types::{Finding, Subject};

/// Run every manifest rule on one resource.
pub fn validate_resource(resource: &ResourceDescriptor, config: &LintConfig) -> Vec<Finding> {
    let mut failures = validate_required_fields(resource);
    failures.extend(validate_api_version_and_kind(resource));
    failures.extend(validate_naming_with(resource, &config.naming));
    failures.extend(validate_labels_with(resource, &config.naming));
    failures.extend(validate_annotations_with(resource, &config.naming));
    failures.extend(validate_structure(resource));
    failures.extend(validate_rbac_with(resource, &config.security));
    failures.extend(validate_quantities_with_depth(
        resource,
        config.aggregation.max_depth,
    ));
    failures
}

/// Lint already-parsed manifest documents.
///
/// Null documents (empty entries between `---`) are skipped but still
/// count toward document indices.
pub fn lint_documents(documents: &[Document], artifact: &str, config: &LintConfig) -> Report {
    let per_document: Vec<Vec<Finding>> = documents
        .par_iter()
        .enumerate()
        .filter(|(_, doc)| !doc.is_null())
        .map(|(index, doc)| {
            let resource = ResourceDescriptor::new(doc, Subject::document(artifact, index));
            validate_resource(&resource, config)
        })
        .collect();

    Report::from_findings(apply_config(per_document.into_iter().flatten(), config))
}

/// Parse and lint a (multi-document) manifest file.
///
/// The raw text is also scanned for secrets, so commented-out values are
/// caught too.
pub fn lint_manifests(text: &str, artifact: &str, config: &LintConfig) -> Result<Report> {
    let documents = parse_stream(text)?;
    log::debug!("Parsed {} documents from {}", documents.len(), artifact);

    let mut report = lint_documents(&documents, artifact, config);
    report.extend(apply_config(scan_text(text, artifact, config)?, config));
    Ok(report)
}

/// Lint a chart's Chart.yaml and, when present, its values.yaml.
pub fn lint_chart(
    chart_text: &str,
    values_text: Option<&str>,
    directory_name: &str,
    config: &LintConfig,
) -> Result<Report> {
    let chart_artifact = format!("{}/Chart.yaml", directory_name);
    let chart_doc = parse(chart_text)?;
    let chart = ChartDescriptor::new(&chart_doc, Subject::new(chart_artifact.as_str()));

    let mut failures = validate_chart_descriptor(&chart);
    failures.extend(validate_chart_name(&chart, directory_name));

    if let Some(values_text) = values_text {
        let values_artifact = format!("{}/values.yaml", directory_name);
        let values = parse(values_text)?;
        let values_subject = Subject::new(values_artifact.as_str());
        failures.extend(check_values_resources(&values, &values_subject));
        failures.extend(validate_quantities_with_depth(
            &ResourceDescriptor::new(&values, values_subject),
            config.aggregation.max_depth,
        ));
        failures.extend(scan_text(values_text, &values_artifact, config)?);
    }

    Ok(Report::from_findings(apply_config(failures, config)))
}

/// Lint Dockerfile text: instructions, best practices, FROM image tags
/// and secrets.
pub fn lint_dockerfile(content: &str, artifact: &str, config: &LintConfig) -> Result<Report> {
    let subject = Subject::new(artifact);

    let mut failures = validate_instructions(content, &subject);
    failures.extend(check_best_practices(content, &subject));
    for (line, tag) in from_image_tags(content) {
        failures.extend(
            validate_image_tag(&tag, &subject)
                .into_iter()
                .map(|f| f.on_line(line)),
        );
    }
    failures.extend(scan_text(content, artifact, config)?);

    Ok(Report::from_findings(apply_config(failures, config)))
}

/// Sum workload requests across documents and check them against the
/// configured limits. The totals are attached to the report.
pub fn lint_quota(documents: &[Document], artifact: &str, config: &LintConfig) -> Report {
    lint_release_quota(documents, &[], artifact, config)
}

/// [`lint_quota`] for a release: chart values documents count toward the
/// totals alongside the workload manifests.
///
/// Every request found in a values document is counted, since values
/// carry no kind.
pub fn lint_release_quota(
    documents: &[Document],
    values: &[Document],
    artifact: &str,
    config: &LintConfig,
) -> Report {
    let totals = aggregate_workloads(documents, config)
        + aggregate_with_depth(values, config.aggregation.max_depth);
    log::debug!(
        "Workload requests in {}: {} cores, {} MiB",
        artifact,
        totals.cpu_cores,
        totals.memory_mib
    );

    let failures = check_totals(&totals, &config.aggregation, &Subject::new(artifact));
    let mut report = Report::from_findings(apply_config(failures, config));
    report.totals = Some(totals);
    report
}

fn scan_text(text: &str, artifact: &str, config: &LintConfig) -> Result<Vec<Finding>> {
    let scanner = SecretScanner::new(&config.security)?;
    Ok(scanner.scan(text, &Subject::new(artifact)))
}

/// Drop ignored rules and apply severity overrides and strict mode.
pub fn apply_config(
    findings: impl IntoIterator<Item = Finding>,
    config: &LintConfig,
) -> Vec<Finding> {
    findings
        .into_iter()
        .filter(|f| !config.is_rule_ignored(f.code.as_str()))
        .map(|mut f| {
            f.severity = config.effective_severity(f.code.as_str(), f.severity);
            f
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ResourceQuantity;
    use crate::types::Severity;

    const DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  labels:
    app: web
spec:
  selector:
    matchLabels:
      app: web
  template:
    spec:
      containers:
        - name: web
          image: nginx:1.25
          resources:
            requests:
              cpu: 250m
              memory: 256Mi
"#;

    #[test]
    fn test_clean_manifest() {
        let report = lint_manifests(DEPLOYMENT, "web.yaml", &LintConfig::default()).unwrap();
        assert!(report.is_empty(), "{:?}", report.findings);
    }

    #[test]
    fn test_document_indices_survive_null_documents() {
        let text = format!("{}---\n---\nkind: Service\n", DEPLOYMENT);
        let report = lint_manifests(&text, "all.yaml", &LintConfig::default()).unwrap();
        assert!(!report.is_empty());
        assert!(report.findings.iter().all(|f| f.subject.document == Some(2)));
        assert!(report.findings.iter().any(|f| f.code.as_str() == "KM2001"));
    }

    #[test]
    fn test_findings_keep_document_order() {
        let text = "kind: Service\n---\nkind: Service\n---\nkind: Service\n";
        let report = lint_manifests(text, "svc.yaml", &LintConfig::default()).unwrap();
        let indices: Vec<_> = report.findings.iter().filter_map(|f| f.subject.document).collect();
        let mut sorted = indices.clone();
        sorted.sort();
        assert_eq!(indices, sorted);
        assert_eq!(indices.first(), Some(&0));
        assert_eq!(indices.last(), Some(&2));
    }

    #[test]
    fn test_parse_error_is_returned() {
        assert!(lint_manifests("a: [1, 2\n", "bad.yaml", &LintConfig::default()).is_err());
    }

    #[test]
    fn test_config_is_applied() {
        let text = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cfg\ndata:\n  password: hunter2\n";
        let report = lint_manifests(text, "cm.yaml", &LintConfig::default()).unwrap();
        assert_eq!(report.warning_count, 1);

        let strict = LintConfig::default().with_strict(true);
        let report = lint_manifests(text, "cm.yaml", &strict).unwrap();
        assert_eq!(report.error_count, 1);
        assert!(report.should_fail(&strict));

        let ignoring = LintConfig::default().ignore("SC1001");
        assert!(lint_manifests(text, "cm.yaml", &ignoring).unwrap().is_empty());
    }

    #[test]
    fn test_lint_chart() {
        let chart = "apiVersion: v2\nname: web\nversion: 1.0.0\ndescription: Web app\n";
        let report = lint_chart(chart, Some("replicaCount: 1\n"), "api", &LintConfig::default()).unwrap();
        let codes: Vec<_> = report.findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["HC1008", "HC2001"]);
        assert_eq!(report.findings[1].subject.artifact, "api/values.yaml");
    }

    #[test]
    fn test_lint_dockerfile_checks_from_tags() {
        let content = "FROM python:latest\nWORKDIR /app\nLABEL org.opencontainers.image.title=a org.opencontainers.image.description=b org.opencontainers.image.version=c org.opencontainers.image.source=d\nUSER app\n";
        let report = lint_dockerfile(content, "Dockerfile", &LintConfig::default()).unwrap();
        let codes: Vec<_> = report.findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["DF1009", "DF2002"]);
        assert_eq!(report.findings[1].line, Some(1));
    }

    #[test]
    fn test_lint_quota() {
        let docs = parse_stream(
            "kind: Deployment\nspec:\n  resources:\n    requests:\n      cpu: 16\n---\nkind: StatefulSet\nspec:\n  resources:\n    requests:\n      cpu: 8\n      memory: 1Gi\n",
        )
        .unwrap();
        let report = lint_quota(&docs, "cluster", &LintConfig::default());
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].code.as_str(), "AG1001");
        assert_eq!(report.findings[0].severity, Severity::Warning);
        assert_eq!(report.totals.map(|t| t.cpu_cores), Some(24.0));
    }

    #[test]
    fn test_release_quota_counts_values() {
        let docs = parse_stream(
            "kind: Deployment\nspec:\n  resources:\n    requests:\n      cpu: 12\n---\nkind: Service\nspec:\n  resources:\n    requests:\n      cpu: 100\n",
        )
        .unwrap();
        let values = parse("worker:\n  resources:\n    requests:\n      cpu: 10\n      memory: 2Gi\n").unwrap();

        let manifests_only = lint_quota(&docs, "release", &LintConfig::default());
        assert!(manifests_only.is_empty());

        let report = lint_release_quota(&docs, &[values], "release", &LintConfig::default());
        let codes: Vec<_> = report.findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["AG1001"]);
        assert_eq!(report.totals, Some(ResourceQuantity::new(22.0, 2048.0)));
    }
}
