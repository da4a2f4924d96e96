//! KM1xxx - Resource Metadata Rules
//!
//! Naming, labels, annotations and the apiVersion/kind sanity heuristics.
//! These are deliberately permissive so custom resources pass.

use crate::config::NamingLimits;
use crate::document::DocPath;
use crate::rules::ResourceDescriptor;
use crate::types::{Finding, Severity};

const REQUIRED_FIELDS: [&str; 3] = ["apiVersion", "kind", "metadata"];

/// Check `metadata.name` against the RFC-1123 style naming rules.
pub fn validate_naming(resource: &ResourceDescriptor) -> Vec<Finding> {
    validate_naming_with(resource, &NamingLimits::default())
}

/// [`validate_naming`] with explicit length limits.
///
/// Reports at most one finding: the first rule the name breaks.
pub fn validate_naming_with(resource: &ResourceDescriptor, limits: &NamingLimits) -> Vec<Finding> {
    let subject = resource.subject();
    let path = DocPath::from_keys(&["metadata", "name"]);

    if resource.metadata().is_none() {
        return vec![
            Finding::new("KM1001", Severity::Error, subject, "Missing metadata section")
                .at(&DocPath::from_keys(&["metadata"])),
        ];
    }

    let name = resource.name().unwrap_or_default();
    let length = name.chars().count();

    let failure = if name.is_empty() {
        Some(("KM1001", "Resource name is empty".to_string()))
    } else if length > limits.max_name_length {
        Some((
            "KM1002",
            format!("Resource name too long: {} > {}", length, limits.max_name_length),
        ))
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        || !name.chars().any(|c| c.is_ascii_alphanumeric())
    {
        Some((
            "KM1003",
            format!("Resource name contains invalid characters: {}", name),
        ))
    } else if name.starts_with('-') || name.ends_with('-') {
        Some((
            "KM1004",
            format!("Resource name cannot start or end with hyphen: {}", name),
        ))
    } else {
        None
    };

    failure
        .map(|(code, message)| vec![Finding::new(code, Severity::Error, subject, message).at(&path)])
        .unwrap_or_default()
}

/// Check label key and value lengths.
pub fn validate_labels(resource: &ResourceDescriptor) -> Vec<Finding> {
    validate_labels_with(resource, &NamingLimits::default())
}

/// [`validate_labels`] with explicit length limits.
pub fn validate_labels_with(resource: &ResourceDescriptor, limits: &NamingLimits) -> Vec<Finding> {
    let mut failures = Vec::new();
    let Some(labels) = resource.labels() else {
        return failures;
    };
    let base = DocPath::from_keys(&["metadata", "labels"]);

    for (key, value) in labels {
        let path = base.key(key.as_str());
        if key.chars().count() > limits.max_label_length {
            failures.push(
                Finding::new(
                    "KM1005",
                    Severity::Warning,
                    resource.subject(),
                    format!("Label key too long: {}", key),
                )
                .at(&path),
            );
        }

        let rendered = value.to_string();
        if rendered.chars().count() > limits.max_label_length {
            failures.push(
                Finding::new(
                    "KM1006",
                    Severity::Warning,
                    resource.subject(),
                    format!("Label value too long: {}", rendered),
                )
                .at(&path),
            );
        }
    }

    failures
}

/// Check annotation keys, honouring the `prefix/name` form.
pub fn validate_annotations(resource: &ResourceDescriptor) -> Vec<Finding> {
    validate_annotations_with(resource, &NamingLimits::default())
}

/// [`validate_annotations`] with explicit length limits.
pub fn validate_annotations_with(
    resource: &ResourceDescriptor,
    limits: &NamingLimits,
) -> Vec<Finding> {
    let mut failures = Vec::new();
    let Some(annotations) = resource.annotations() else {
        return failures;
    };
    let base = DocPath::from_keys(&["metadata", "annotations"]);
    let subject = resource.subject();

    for key in annotations.keys() {
        let path = base.key(key.as_str());
        match key.rsplit_once('/') {
            Some((prefix, name)) => {
                if prefix.chars().count() > limits.max_annotation_prefix_length {
                    failures.push(
                        Finding::new(
                            "KM1007",
                            Severity::Warning,
                            subject,
                            format!("Annotation prefix too long: {}", prefix),
                        )
                        .at(&path),
                    );
                }
                if name.chars().count() > limits.max_annotation_name_length {
                    failures.push(
                        Finding::new(
                            "KM1008",
                            Severity::Warning,
                            subject,
                            format!("Annotation name too long: {}", name),
                        )
                        .at(&path),
                    );
                }
            }
            None if key.chars().count() > limits.max_annotation_name_length => {
                failures.push(
                    Finding::new(
                        "KM1009",
                        Severity::Warning,
                        subject,
                        format!("Annotation key too long: {}", key),
                    )
                    .at(&path),
                );
            }
            None => {}
        }
    }

    failures
}

/// Check that the top-level manifest fields exist.
pub fn validate_required_fields(resource: &ResourceDescriptor) -> Vec<Finding> {
    let doc = resource.document();
    let subject = resource.subject();
    let index = resource.document_index();

    let mut failures: Vec<Finding> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !doc.contains_key(field))
        .map(|field| {
            Finding::new(
                "KM1010",
                Severity::Error,
                subject,
                format!("Missing {} in document {}", field, index),
            )
            .at(&DocPath::from_keys(&[*field]))
        })
        .collect();

    let metadata_populated = resource
        .metadata()
        .and_then(|m| m.as_mapping())
        .is_some_and(|m| !m.is_empty());
    if metadata_populated && resource.metadata().is_some_and(|m| !m.contains_key("name")) {
        failures.push(
            Finding::new(
                "KM1010",
                Severity::Error,
                subject,
                format!("Missing metadata.name in document {}", index),
            )
            .at(&DocPath::from_keys(&["metadata", "name"])),
        );
    }

    failures
}

/// apiVersion/kind sanity heuristics.
///
/// `apiVersion` must be exactly `v1` or contain a `/`; `kind` must start
/// with an uppercase letter. Absent fields are left to
/// [`validate_required_fields`].
pub fn validate_api_version_and_kind(resource: &ResourceDescriptor) -> Vec<Finding> {
    let mut failures = Vec::new();
    let subject = resource.subject();
    let index = resource.document_index();

    if let Some(api_version) = resource.api_version().map(|v| v.to_string()) {
        if api_version != "v1" && !api_version.contains('/') {
            failures.push(
                Finding::new(
                    "KM1011",
                    Severity::Error,
                    subject,
                    format!(
                        "Suspicious API version '{}' in document {}",
                        api_version, index
                    ),
                )
                .at(&DocPath::from_keys(&["apiVersion"])),
            );
        }
    }

    if let Some(kind) = resource.document().get("kind").map(|k| k.to_string()) {
        if !kind.chars().next().is_some_and(char::is_uppercase) {
            failures.push(
                Finding::new(
                    "KM1012",
                    Severity::Error,
                    subject,
                    format!("Kind '{}' should be capitalized in document {}", kind, index),
                )
                .at(&DocPath::from_keys(&["kind"])),
            );
        }
    }

    failures
}
