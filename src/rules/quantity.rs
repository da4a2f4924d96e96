//! KM3xxx - Resource quantity heuristics.

use std::ops::ControlFlow;

use crate::aggregate::quantity::{is_plausible_cpu, is_plausible_memory};
use crate::aggregate::DEFAULT_MAX_DEPTH;
use crate::rules::ResourceDescriptor;
use crate::types::{Finding, Severity};

/// Flag CPU and memory request/limit strings that do not look like
/// Kubernetes quantities.
pub fn validate_quantities(resource: &ResourceDescriptor) -> Vec<Finding> {
    validate_quantities_with_depth(resource, DEFAULT_MAX_DEPTH)
}

/// [`validate_quantities`] with an explicit traversal depth bound.
pub fn validate_quantities_with_depth(
    resource: &ResourceDescriptor,
    max_depth: usize,
) -> Vec<Finding> {
    let mut failures = Vec::new();
    let subject = resource.subject();

    let _ = resource.document().walk(max_depth, &mut |path, node| {
        let Some(resources) = node.get("resources").filter(|r| r.is_mapping()) else {
            return ControlFlow::Continue(());
        };
        let resources_path = path.key("resources");

        for section in ["requests", "limits"] {
            let Some(values) = resources.get(section).filter(|v| v.is_mapping()) else {
                continue;
            };
            let section_path = resources_path.key(section);

            if let Some(cpu) = values.get("cpu").and_then(|v| v.as_str()) {
                if !is_plausible_cpu(cpu) {
                    failures.push(
                        Finding::new(
                            "KM3001",
                            Severity::Warning,
                            subject,
                            format!("Suspicious CPU value '{}'", cpu),
                        )
                        .at(&section_path.key("cpu")),
                    );
                }
            }

            if let Some(memory) = values.get("memory").and_then(|v| v.as_str()) {
                if !is_plausible_memory(memory) {
                    failures.push(
                        Finding::new(
                            "KM3002",
                            Severity::Warning,
                            subject,
                            format!("Suspicious memory value '{}'", memory),
                        )
                        .at(&section_path.key("memory")),
                    );
                }
            }
        }

        ControlFlow::Continue(())
    });

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;
    use crate::types::Subject;

    #[test]
    fn test_suspicious_quantities() {
        let doc = parse(
            r#"
spec:
  containers:
    - name: app
      resources:
        requests:
          cpu: half
          memory: 128mb
        limits:
          cpu: "1"
          memory: 1Gi
"#,
        )
        .unwrap();
        let resource = ResourceDescriptor::new(&doc, Subject::document("app.yaml", 0));
        let failures = validate_quantities(&resource);

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].code.as_str(), "KM3001");
        assert_eq!(
            failures[0].path.as_deref(),
            Some("spec.containers[0].resources.requests.cpu")
        );
        assert_eq!(failures[1].code.as_str(), "KM3002");
    }

    #[test]
    fn test_numeric_quantities_are_not_checked() {
        let doc = parse("resources:\n  requests:\n    cpu: 2\n    memory: 512\n").unwrap();
        let resource = ResourceDescriptor::new(&doc, Subject::new("values.yaml"));
        assert!(validate_quantities(&resource).is_empty());
    }
}
