//! Rule system for manifest-lint.
//!
//! # Rule Categories
//!
//! | Category | Code Range | Description |
//! |----------|------------|-------------|
//! | Resource | KM1xxx | Names, labels, annotations, apiVersion/kind |
//! | Workload | KM2xxx | Kind-specific structure (Deployment, Service) |
//! | Quantity | KM3xxx | CPU/memory quantity shape |
//! | Chart | HC1xxx, HC2xxx | Chart.yaml and values.yaml |
//! | Build | DF1xxx | Dockerfile instructions |
//! | Image tag | DF2xxx | Image tag format |
//! | Secret | SC1xxx | Hardcoded secret heuristics |
//! | RBAC | SC2xxx | Overly permissive Role/ClusterRole rules |
//! | Aggregation | AG1xxx | Cluster-wide request totals |
//! | Schema | JS1xxx | Minimal JSON-schema checks |
//! | External | EX1xxx | helm lint / kubeval results |

pub mod build;
pub mod chart;
pub mod quantity;
pub mod resource;
pub mod schema;
pub mod security;
pub mod workload;

use std::collections::BTreeMap;

use crate::document::Document;
use crate::types::{RuleCategory, Severity, Subject};

use self::workload::KindValidator;

/// Metadata about a lint rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleMeta {
    /// The rule code (e.g., "KM1001").
    pub code: &'static str,
    /// Short name for the rule.
    pub name: &'static str,
    /// Default severity level.
    pub severity: Severity,
    /// Human-readable description.
    pub description: &'static str,
}

impl RuleMeta {
    const fn new(
        code: &'static str,
        name: &'static str,
        severity: Severity,
        description: &'static str,
    ) -> Self {
        Self {
            code,
            name,
            severity,
            description,
        }
    }

    /// Rule category derived from the code prefix.
    pub fn category(&self) -> Option<RuleCategory> {
        RuleCategory::from_code(self.code)
    }
}

const RULES: &[RuleMeta] = &[
    // KM1xxx
    RuleMeta::new("KM1001", "missing-name", Severity::Error, "Resource must have a non-empty metadata.name"),
    RuleMeta::new("KM1002", "name-too-long", Severity::Error, "Resource name must be at most 253 characters"),
    RuleMeta::new("KM1003", "name-invalid-characters", Severity::Error, "Resource name may only contain alphanumerics, '-' and '.'"),
    RuleMeta::new("KM1004", "name-hyphen-edge", Severity::Error, "Resource name cannot start or end with '-'"),
    RuleMeta::new("KM1005", "label-key-too-long", Severity::Warning, "Label keys must be at most 63 characters"),
    RuleMeta::new("KM1006", "label-value-too-long", Severity::Warning, "Label values must be at most 63 characters"),
    RuleMeta::new("KM1007", "annotation-prefix-too-long", Severity::Warning, "Annotation key prefixes must be at most 253 characters"),
    RuleMeta::new("KM1008", "annotation-name-too-long", Severity::Warning, "Annotation key names must be at most 63 characters"),
    RuleMeta::new("KM1009", "annotation-key-too-long", Severity::Warning, "Unprefixed annotation keys must be at most 63 characters"),
    RuleMeta::new("KM1010", "missing-required-field", Severity::Error, "Manifests need apiVersion, kind, metadata and metadata.name"),
    RuleMeta::new("KM1011", "suspicious-api-version", Severity::Error, "apiVersion must be 'v1' or contain a group ('group/version')"),
    RuleMeta::new("KM1012", "kind-not-capitalized", Severity::Error, "kind must start with an uppercase letter"),
    // KM2xxx
    RuleMeta::new("KM2001", "missing-structure-field", Severity::Error, "Kind-specific required field is missing"),
    RuleMeta::new("KM2002", "empty-structure-list", Severity::Error, "Kind-specific list must be a non-empty sequence"),
    // KM3xxx
    RuleMeta::new("KM3001", "suspicious-cpu-quantity", Severity::Warning, "CPU quantity should be millicores ('500m') or a decimal"),
    RuleMeta::new("KM3002", "suspicious-memory-quantity", Severity::Warning, "Memory quantity should carry a unit suffix or be a byte count"),
    // HC1xxx / HC2xxx
    RuleMeta::new("HC1001", "empty-version", Severity::Error, "Chart version must not be empty"),
    RuleMeta::new("HC1002", "version-too-short", Severity::Error, "Chart version needs at least major.minor"),
    RuleMeta::new("HC1003", "invalid-version-part", Severity::Error, "Chart version segments must be numeric (pre-release suffix allowed)"),
    RuleMeta::new("HC1004", "dependency-missing-field", Severity::Error, "Dependencies need name, version and repository"),
    RuleMeta::new("HC1005", "invalid-repository", Severity::Error, "Dependency repository must be an http(s)/oci URL or a reserved alias"),
    RuleMeta::new("HC1006", "chart-missing-field", Severity::Error, "Chart.yaml needs apiVersion, name, version and description"),
    RuleMeta::new("HC1007", "invalid-chart-api-version", Severity::Error, "Chart apiVersion must be v1 or v2"),
    RuleMeta::new("HC1008", "chart-name-mismatch", Severity::Warning, "Chart name should match its directory"),
    RuleMeta::new("HC1009", "version-not-string", Severity::Error, "Chart version must be a string"),
    RuleMeta::new("HC2001", "missing-resource-limits", Severity::Warning, "values.yaml should define resources.limits or resources.requests"),
    // DF1xxx
    RuleMeta::new("DF1001", "empty-dockerfile", Severity::Error, "Dockerfile has no instructions"),
    RuleMeta::new("DF1002", "missing-from", Severity::Error, "First instruction must be FROM"),
    RuleMeta::new("DF1003", "root-user", Severity::Error, "Do not switch to the root user"),
    RuleMeta::new("DF1004", "add-local-files", Severity::Error, "Use COPY instead of ADD for local files"),
    RuleMeta::new("DF1005", "pip-cache", Severity::Error, "pip install should use --no-cache-dir"),
    RuleMeta::new("DF1006", "missing-workdir", Severity::Warning, "Dockerfile should set WORKDIR"),
    RuleMeta::new("DF1007", "missing-user", Severity::Warning, "Dockerfile should switch to a non-root USER"),
    RuleMeta::new("DF1008", "absolute-copy-source", Severity::Warning, "COPY/ADD sources should be relative to the build context"),
    RuleMeta::new("DF1009", "single-stage", Severity::Info, "Consider a multi-stage build"),
    RuleMeta::new("DF1010", "missing-labels", Severity::Warning, "Dockerfile should carry LABEL metadata"),
    RuleMeta::new("DF1011", "missing-oci-label", Severity::Info, "Recommended OCI image label is missing"),
    // DF2xxx
    RuleMeta::new("DF2001", "empty-tag", Severity::Error, "Image tag must not be empty"),
    RuleMeta::new("DF2002", "latest-tag", Severity::Warning, "Avoid the 'latest' tag in production"),
    RuleMeta::new("DF2003", "tag-too-long", Severity::Error, "Image tag must be at most 128 characters"),
    RuleMeta::new("DF2004", "tag-invalid-character", Severity::Error, "Image tag contains an invalid character"),
    // SC1xxx / SC2xxx
    RuleMeta::new("SC1001", "potential-secret", Severity::Warning, "Line looks like a hardcoded secret"),
    RuleMeta::new("SC2001", "wildcard-verbs", Severity::Warning, "RBAC rule grants all verbs"),
    RuleMeta::new("SC2002", "wildcard-resources", Severity::Warning, "RBAC rule grants access to all resources"),
    RuleMeta::new("SC2003", "dangerous-secret-access", Severity::Warning, "RBAC rule can modify secrets"),
    RuleMeta::new("SC2004", "pod-creation", Severity::Warning, "RBAC rule can create pods"),
    // AG1xxx
    RuleMeta::new("AG1001", "high-cpu-total", Severity::Warning, "Total CPU requests exceed the configured limit"),
    RuleMeta::new("AG1002", "high-memory-total", Severity::Warning, "Total memory requests exceed the configured limit"),
    // JS1xxx
    RuleMeta::new("JS1001", "schema-missing-field", Severity::Error, "Required field is missing"),
    RuleMeta::new("JS1002", "schema-type-mismatch", Severity::Error, "Field has the wrong type"),
    // EX1xxx
    RuleMeta::new("EX1001", "external-linter-failed", Severity::Error, "An external linter reported a failure"),
];

/// Get all known rules.
pub fn all_rules() -> &'static [RuleMeta] {
    RULES
}

/// Get a rule by code.
pub fn get_rule(code: &str) -> Option<&'static RuleMeta> {
    RULES.iter().find(|r| r.code == code)
}

/// List all rule codes.
pub fn list_rule_codes() -> Vec<&'static str> {
    RULES.iter().map(|r| r.code).collect()
}

/// Kubernetes kinds with dedicated rules. Everything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    Service,
    Role,
    ClusterRole,
    Other(String),
}

impl ResourceKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "Deployment" => Self::Deployment,
            "StatefulSet" => Self::StatefulSet,
            "DaemonSet" => Self::DaemonSet,
            "Service" => Self::Service,
            "Role" => Self::Role,
            "ClusterRole" => Self::ClusterRole,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
            Self::Service => "Service",
            Self::Role => "Role",
            Self::ClusterRole => "ClusterRole",
            Self::Other(kind) => kind,
        }
    }

    /// Role or ClusterRole.
    pub fn is_rbac_role(&self) -> bool {
        matches!(self, Self::Role | Self::ClusterRole)
    }

    /// The structural validator registered for this kind, if any.
    pub fn structural_validator(&self) -> Option<&'static dyn KindValidator> {
        match self {
            Self::Deployment => Some(&workload::DeploymentValidator),
            Self::Service => Some(&workload::ServiceValidator),
            _ => None,
        }
    }
}

/// A Kubernetes-style object inside a manifest stream.
///
/// This is a read-only view: it borrows the document and carries the
/// subject used for every finding produced about it.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor<'a> {
    doc: &'a Document,
    subject: Subject,
}

impl<'a> ResourceDescriptor<'a> {
    pub fn new(doc: &'a Document, subject: Subject) -> Self {
        Self { doc, subject }
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Index of the document within its stream (0 when standalone).
    pub fn document_index(&self) -> usize {
        self.subject.document.unwrap_or(0)
    }

    pub fn api_version(&self) -> Option<&'a Document> {
        self.doc.get("apiVersion")
    }

    /// The `kind` string, if present.
    pub fn kind(&self) -> Option<&'a str> {
        self.doc.get("kind").and_then(Document::as_str)
    }

    pub fn resource_kind(&self) -> Option<ResourceKind> {
        self.kind().map(ResourceKind::parse)
    }

    pub fn metadata(&self) -> Option<&'a Document> {
        self.doc.get("metadata")
    }

    /// `metadata.name` rendered as text.
    pub fn name(&self) -> Option<String> {
        self.doc
            .get_path(&["metadata", "name"])
            .and_then(Document::render_scalar)
    }

    pub fn labels(&self) -> Option<&'a BTreeMap<String, Document>> {
        self.doc
            .get_path(&["metadata", "labels"])
            .and_then(Document::as_mapping)
    }

    pub fn annotations(&self) -> Option<&'a BTreeMap<String, Document>> {
        self.doc
            .get_path(&["metadata", "annotations"])
            .and_then(Document::as_mapping)
    }

    pub fn spec(&self) -> Option<&'a Document> {
        self.doc.get("spec")
    }
}
