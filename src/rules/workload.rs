//! KM2xxx - Kind-specific structure rules.
//!
//! Each validator declares the kinds it supports and returns nothing when
//! handed anything else, so dispatch mistakes never produce bogus findings.

use crate::document::{DocPath, Document};
use crate::rules::ResourceDescriptor;
use crate::types::{Finding, Severity};

/// A structural validator bound to one or more kinds.
pub trait KindValidator: Send + Sync {
    /// Kinds this validator understands.
    fn supported_kinds(&self) -> &'static [&'static str];

    /// Run the checks. Only called for supported kinds.
    fn check(&self, resource: &ResourceDescriptor) -> Vec<Finding>;

    /// Run the checks if the resource kind is supported, otherwise skip.
    fn validate(&self, resource: &ResourceDescriptor) -> Vec<Finding> {
        match resource.kind() {
            Some(kind) if self.supported_kinds().contains(&kind) => self.check(resource),
            _ => Vec::new(),
        }
    }
}

/// Dispatch to the structural validator for the resource kind.
///
/// Kinds without a registered validator pass through with no findings.
pub fn validate_structure(resource: &ResourceDescriptor) -> Vec<Finding> {
    let Some(kind) = resource.resource_kind() else {
        return Vec::new();
    };
    match kind.structural_validator() {
        Some(validator) => {
            log::debug!("Running {} structure checks on {}", kind.as_str(), resource.subject());
            validator.validate(resource)
        }
        None => Vec::new(),
    }
}

/// Requires `spec.selector` and a non-empty `spec.template.spec.containers`
/// whose entries all have `name` and `image`.
pub struct DeploymentValidator;

impl KindValidator for DeploymentValidator {
    fn supported_kinds(&self) -> &'static [&'static str] {
        &["Deployment"]
    }

    fn check(&self, resource: &ResourceDescriptor) -> Vec<Finding> {
        let mut checker = StructureChecker::new(resource, "Deployment");

        let Some(spec) = checker.require(resource.document(), &DocPath::root(), "spec") else {
            return checker.finish();
        };
        let spec_path = DocPath::from_keys(&["spec"]);
        checker.require(spec, &spec_path, "selector");

        let template_path = spec_path.key("template");
        let Some(template) = checker.require(spec, &spec_path, "template") else {
            return checker.finish();
        };
        let pod_spec_path = template_path.key("spec");
        let Some(pod_spec) = checker.require(template, &template_path, "spec") else {
            return checker.finish();
        };
        let Some(containers) = checker.require_list(pod_spec, &pod_spec_path, "containers") else {
            return checker.finish();
        };

        let containers_path = pod_spec_path.key("containers");
        for (j, container) in containers.iter().enumerate() {
            let container_path = containers_path.index(j);
            checker.require(container, &container_path, "name");
            checker.require(container, &container_path, "image");
        }

        checker.finish()
    }
}

/// Requires a non-empty `spec.ports` whose entries all have `port`.
pub struct ServiceValidator;

impl KindValidator for ServiceValidator {
    fn supported_kinds(&self) -> &'static [&'static str] {
        &["Service"]
    }

    fn check(&self, resource: &ResourceDescriptor) -> Vec<Finding> {
        let mut checker = StructureChecker::new(resource, "Service");

        let Some(spec) = checker.require(resource.document(), &DocPath::root(), "spec") else {
            return checker.finish();
        };
        let spec_path = DocPath::from_keys(&["spec"]);
        let Some(ports) = checker.require_list(spec, &spec_path, "ports") else {
            return checker.finish();
        };

        let ports_path = spec_path.key("ports");
        for (j, port) in ports.iter().enumerate() {
            checker.require(port, &ports_path.index(j), "port");
        }

        checker.finish()
    }
}

/// Accumulates missing-field findings while walking a required structure.
struct StructureChecker<'r, 'a> {
    resource: &'r ResourceDescriptor<'a>,
    kind: &'static str,
    failures: Vec<Finding>,
}

impl<'r, 'a> StructureChecker<'r, 'a> {
    fn new(resource: &'r ResourceDescriptor<'a>, kind: &'static str) -> Self {
        Self {
            resource,
            kind,
            failures: Vec::new(),
        }
    }

    /// Return the child under `key`, or record it as missing.
    fn require<'d>(&mut self, parent: &'d Document, parent_path: &DocPath, key: &str) -> Option<&'d Document> {
        let path = parent_path.key(key);
        let child = parent.get(key);
        if child.is_none() {
            self.failures.push(
                Finding::new(
                    "KM2001",
                    Severity::Error,
                    self.resource.subject(),
                    format!(
                        "Missing {} in {} document {}",
                        path,
                        self.kind,
                        self.resource.document_index()
                    ),
                )
                .at(&path),
            );
        }
        child
    }

    /// Like [`require`](Self::require), and the child must be a non-empty sequence.
    fn require_list<'d>(
        &mut self,
        parent: &'d Document,
        parent_path: &DocPath,
        key: &str,
    ) -> Option<&'d [Document]> {
        let child = self.require(parent, parent_path, key)?;
        match child.as_sequence() {
            Some(items) if !items.is_empty() => Some(items),
            _ => {
                let path = parent_path.key(key);
                self.failures.push(
                    Finding::new(
                        "KM2002",
                        Severity::Error,
                        self.resource.subject(),
                        format!(
                            "{} must be a non-empty list in {} document {}",
                            path,
                            self.kind,
                            self.resource.document_index()
                        ),
                    )
                    .at(&path),
                );
                None
            }
        }
    }

    fn finish(self) -> Vec<Finding> {
        self.failures
    }
}
