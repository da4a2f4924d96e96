//! HC1xxx / HC2xxx - Chart descriptor and values rules.
//!
//! Rules for Chart.yaml (version format, dependency shape, required
//! fields) and values.yaml (resource quota presence).

use std::ops::ControlFlow;

use crate::aggregate::DEFAULT_MAX_DEPTH;
use crate::document::{DocPath, Document, Scalar};
use crate::types::{Finding, Severity, Subject};

const REQUIRED_FIELDS: [&str; 4] = ["apiVersion", "name", "version", "description"];
const VALID_API_VERSIONS: [&str; 2] = ["v1", "v2"];
const REPOSITORY_SCHEMES: [&str; 3] = ["http://", "https://", "oci://"];
const REPOSITORY_ALIASES: [&str; 2] = ["@stable", "@incubator"];

/// A parsed Chart.yaml.
#[derive(Debug, Clone)]
pub struct ChartDescriptor<'a> {
    doc: &'a Document,
    subject: Subject,
}

impl<'a> ChartDescriptor<'a> {
    pub fn new(doc: &'a Document, subject: Subject) -> Self {
        Self { doc, subject }
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn api_version(&self) -> Option<String> {
        self.doc.get("apiVersion").and_then(Document::render_scalar)
    }

    pub fn name(&self) -> Option<String> {
        self.doc.get("name").and_then(Document::render_scalar)
    }

    /// The raw `version` node. Helm requires it to be a string.
    pub fn version(&self) -> Option<&'a Document> {
        self.doc.get("version")
    }

    pub fn description(&self) -> Option<&'a str> {
        self.doc.get("description").and_then(Document::as_str)
    }

    pub fn dependencies(&self) -> Option<&'a Document> {
        self.doc.get("dependencies")
    }
}

/// Check a chart version string.
///
/// Needs at least `major.minor`; every dot-separated part must be numeric,
/// or numeric up to its first hyphen (`0-alpha`).
pub fn validate_chart_version(version: &str, subject: &Subject) -> Vec<Finding> {
    let path = DocPath::from_keys(&["version"]);

    if version.is_empty() {
        return vec![Finding::new("HC1001", Severity::Error, subject, "Version is empty").at(&path)];
    }

    let mut failures = Vec::new();
    let parts: Vec<&str> = version.split('.').collect();

    if parts.len() < 2 {
        failures.push(
            Finding::new(
                "HC1002",
                Severity::Error,
                subject,
                format!("Version should have at least major.minor: {}", version),
            )
            .at(&path),
        );
    }

    for part in parts {
        let base = part.split('-').next().unwrap_or_default();
        let valid = if part.contains('-') {
            is_numeric(base)
        } else {
            is_numeric(part)
        };
        if !valid {
            failures.push(
                Finding::new(
                    "HC1003",
                    Severity::Error,
                    subject,
                    format!("Invalid version part: {}", part),
                )
                .at(&path),
            );
        }
    }

    failures
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Check the `dependencies` list of a chart.
///
/// Entries that are not mappings are reported as missing every field.
pub fn validate_dependencies(dependencies: &Document, subject: &Subject) -> Vec<Finding> {
    let mut failures = Vec::new();
    let Some(entries) = dependencies.as_sequence() else {
        return failures;
    };
    let base = DocPath::from_keys(&["dependencies"]);

    for (i, dep) in entries.iter().enumerate() {
        let dep_path = base.index(i);

        for field in ["name", "version", "repository"] {
            if !dep.contains_key(field) {
                failures.push(
                    Finding::new(
                        "HC1004",
                        Severity::Error,
                        subject,
                        format!("Dependency {} missing {}", i, field),
                    )
                    .at(&dep_path.key(field)),
                );
            }
        }

        if let Some(repository) = dep.get("repository") {
            let repo = repository
                .render_scalar()
                .unwrap_or_else(|| repository.to_string());
            let allowed = REPOSITORY_SCHEMES.iter().any(|scheme| repo.starts_with(scheme))
                || REPOSITORY_ALIASES.contains(&repo.as_str());
            if !allowed {
                failures.push(
                    Finding::new(
                        "HC1005",
                        Severity::Error,
                        subject,
                        format!("Invalid repository URL: {}", repo),
                    )
                    .at(&dep_path.key("repository")),
                );
            }
        }
    }

    failures
}

/// Check Chart.yaml structure, then its version and dependencies.
pub fn validate_chart_descriptor(chart: &ChartDescriptor) -> Vec<Finding> {
    let doc = chart.document();
    let subject = chart.subject();

    let mut failures: Vec<Finding> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !doc.contains_key(field))
        .map(|field| {
            Finding::new(
                "HC1006",
                Severity::Error,
                subject,
                format!("Chart.yaml missing required field: {}", field),
            )
            .at(&DocPath::from_keys(&[*field]))
        })
        .collect();

    if let Some(api_version) = chart.api_version() {
        if !VALID_API_VERSIONS.contains(&api_version.as_str()) {
            failures.push(
                Finding::new(
                    "HC1007",
                    Severity::Error,
                    subject,
                    format!("Invalid apiVersion '{}'. Must be v1 or v2", api_version),
                )
                .at(&DocPath::from_keys(&["apiVersion"])),
            );
        }
    }

    match chart.version() {
        Some(Document::Scalar(Scalar::String(version))) => {
            failures.extend(validate_chart_version(version, subject));
        }
        Some(other) => {
            failures.push(
                Finding::new(
                    "HC1009",
                    Severity::Error,
                    subject,
                    format!("Chart version must be a string, found {}", other.type_name()),
                )
                .at(&DocPath::from_keys(&["version"])),
            );
        }
        None => {}
    }

    if let Some(dependencies) = chart.dependencies() {
        failures.extend(validate_dependencies(dependencies, subject));
    }

    failures
}

/// Warn when the chart name differs from its directory name.
pub fn validate_chart_name(chart: &ChartDescriptor, directory_name: &str) -> Vec<Finding> {
    match chart.name() {
        Some(name) if name != directory_name => vec![
            Finding::new(
                "HC1008",
                Severity::Warning,
                chart.subject(),
                format!(
                    "Chart name '{}' does not match directory '{}'",
                    name, directory_name
                ),
            )
            .at(&DocPath::from_keys(&["name"])),
        ],
        _ => Vec::new(),
    }
}

/// Whether any mapping in the tree has a `resources` mapping with
/// `limits` or `requests`. Stops at the first match.
pub fn has_resource_limits(values: &Document) -> bool {
    has_resource_limits_with_depth(values, DEFAULT_MAX_DEPTH)
}

/// [`has_resource_limits`] with an explicit traversal depth bound.
pub fn has_resource_limits_with_depth(values: &Document, max_depth: usize) -> bool {
    values
        .walk(max_depth, &mut |_, node| {
            let found = node
                .get("resources")
                .and_then(Document::as_mapping)
                .is_some_and(|r| r.contains_key("limits") || r.contains_key("requests"));
            if found {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .is_break()
}

/// Warn when a values tree defines no resource limits or requests.
pub fn check_values_resources(values: &Document, subject: &Subject) -> Vec<Finding> {
    if has_resource_limits(values) {
        Vec::new()
    } else {
        vec![Finding::new(
            "HC2001",
            Severity::Warning,
            subject,
            "No resource limits/requests found in values",
        )]
    }
}
