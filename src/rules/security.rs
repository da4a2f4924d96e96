//! SC1xxx / SC2xxx - Security heuristics.
//!
//! Secret scanning works on raw text, line by line, so it also covers
//! comments and templated files that do not parse. It favours recall: a
//! pattern name anywhere on a line is enough to report it, unless the line
//! also carries a reference marker such as `secretKeyRef` or `{{`.

use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use crate::config::SecurityRules;
use crate::document::{DocPath, Document};
use crate::error::{LintError, Result};
use crate::rules::ResourceDescriptor;
use crate::types::{Finding, Severity, Subject};

static DEFAULT_SCANNER: LazyLock<SecretScanner> = LazyLock::new(|| {
    SecretScanner::new(&SecurityRules::default()).expect("default secret patterns are valid")
});

/// Line-oriented secret detector built from a [`SecurityRules`] table.
#[derive(Debug, Clone)]
pub struct SecretScanner {
    patterns: Vec<String>,
    pattern_matcher: AhoCorasick,
    marker_matcher: AhoCorasick,
}

impl SecretScanner {
    /// Build the pattern and reference-marker automata.
    pub fn new(rules: &SecurityRules) -> Result<Self> {
        let patterns = non_empty(&rules.secret_patterns);
        let markers = non_empty(&rules.reference_markers);

        Ok(Self {
            pattern_matcher: build_matcher(&patterns)?,
            marker_matcher: build_matcher(&markers)?,
            patterns,
        })
    }

    /// The scanner for the built-in pattern tables.
    pub fn default_scanner() -> &'static SecretScanner {
        &DEFAULT_SCANNER
    }

    /// Scan text and report one finding per pattern matched on a line.
    pub fn scan(&self, text: &str, subject: &Subject) -> Vec<Finding> {
        let mut failures = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            if self.marker_matcher.is_match(line) {
                continue;
            }

            let mut matched: Vec<usize> = self
                .pattern_matcher
                .find_overlapping_iter(line)
                .map(|m| m.pattern().as_usize())
                .collect();
            matched.sort_unstable();
            matched.dedup();

            for id in matched {
                failures.push(
                    Finding::new(
                        "SC1001",
                        Severity::Warning,
                        subject,
                        format!(
                            "Potential hardcoded {} on line {}: {}",
                            self.patterns[id],
                            idx + 1,
                            line.trim()
                        ),
                    )
                    .on_line(idx as u32 + 1),
                );
            }
        }

        failures
    }
}

fn non_empty(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| {
            if entry.is_empty() {
                log::warn!("Ignoring empty entry in security pattern table");
            }
            !entry.is_empty()
        })
        .cloned()
        .collect()
}

fn build_matcher(patterns: &[String]) -> Result<AhoCorasick> {
    AhoCorasickBuilder::new()
        .match_kind(MatchKind::Standard)
        .ascii_case_insensitive(true)
        .build(patterns)
        .map_err(|e| LintError::Config(format!("Failed to build pattern matcher: {}", e)))
}

/// Scan raw text for likely hardcoded secrets with the built-in tables.
pub fn scan_for_secrets(text: &str, subject_label: &str) -> Vec<Finding> {
    DEFAULT_SCANNER.scan(text, &Subject::new(subject_label))
}

/// Flag overly permissive rules in a Role or ClusterRole.
pub fn validate_rbac(resource: &ResourceDescriptor) -> Vec<Finding> {
    validate_rbac_with(resource, &SecurityRules::default())
}

/// [`validate_rbac`] with an explicit dangerous-verb table.
pub fn validate_rbac_with(resource: &ResourceDescriptor, rules: &SecurityRules) -> Vec<Finding> {
    let mut failures = Vec::new();

    if !resource.resource_kind().is_some_and(|k| k.is_rbac_role()) {
        return failures;
    }
    let Some(entries) = resource.document().get("rules").and_then(Document::as_sequence) else {
        return failures;
    };

    let subject = resource.subject();
    let role = resource.name().unwrap_or_else(|| "<unnamed>".to_string());
    let base = DocPath::from_keys(&["rules"]);

    for (i, rule) in entries.iter().enumerate() {
        let path = base.index(i);
        let verbs = rule.get("verbs").map(Document::string_values).unwrap_or_default();
        let resources = rule
            .get("resources")
            .map(Document::string_values)
            .unwrap_or_default();

        if verbs.contains(&"*") {
            failures.push(
                Finding::new(
                    "SC2001",
                    Severity::Warning,
                    subject,
                    format!("Role {} rule {} grants all verbs (*)", role, i),
                )
                .at(&path),
            );
        }

        if resources.contains(&"*") {
            failures.push(
                Finding::new(
                    "SC2002",
                    Severity::Warning,
                    subject,
                    format!("Role {} rule {} grants access to all resources (*)", role, i),
                )
                .at(&path),
            );
        }

        if resources.contains(&"secrets") {
            let dangerous: Vec<&str> = verbs
                .iter()
                .copied()
                .filter(|verb| rules.dangerous_verbs.iter().any(|d| d == verb))
                .collect();
            if !dangerous.is_empty() {
                failures.push(
                    Finding::new(
                        "SC2003",
                        Severity::Warning,
                        subject,
                        format!(
                            "Role {} rule {} allows {} on secrets",
                            role,
                            i,
                            dangerous.join(", ")
                        ),
                    )
                    .at(&path),
                );
            }
        }

        if resources.contains(&"pods") && verbs.contains(&"create") {
            failures.push(
                Finding::new(
                    "SC2004",
                    Severity::Warning,
                    subject,
                    format!("Role {} rule {} allows creating pods", role, i),
                )
                .at(&path),
            );
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;

    #[test]
    fn test_literal_secret_is_reported() {
        let failures = scan_for_secrets("password: hunter2", "f.yaml");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].severity, Severity::Warning);
        assert_eq!(failures[0].line, Some(1));
        assert!(failures[0].message.contains("password: hunter2"));
    }

    #[test]
    fn test_references_are_skipped() {
        assert!(scan_for_secrets("password: {{ .Values.pw }}", "f.yaml").is_empty());
        assert!(scan_for_secrets("token: ${TOKEN}", "f.yaml").is_empty());
        let manifest = "env:\n  - name: DB_PASSWORD\n    valueFrom:\n      secretKeyRef: {name: db, key: password}\n";
        let failures = scan_for_secrets(manifest, "deploy.yaml");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].line, Some(2));
    }

    #[test]
    fn test_case_insensitive_and_multiple_patterns() {
        let failures = scan_for_secrets("# API_KEY and Secret_Token go here\nreplicas: 3\n", "f.yaml");
        let messages: Vec<_> = failures.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("Potential hardcoded api_key"));
        assert!(messages[1].starts_with("Potential hardcoded token"));
        assert!(messages[2].starts_with("Potential hardcoded secret"));
    }

    #[test]
    fn test_custom_pattern_table() {
        let rules = SecurityRules {
            secret_patterns: vec!["passphrase".to_string(), String::new()],
            reference_markers: vec![],
            ..SecurityRules::default()
        };
        let scanner = SecretScanner::new(&rules).unwrap();
        let subject = Subject::new("app.env");
        assert_eq!(scanner.scan("PASSPHRASE=abc\nPASSWORD=x\n", &subject).len(), 1);
        assert_eq!(scanner.scan("passphrase: {{ x }}", &subject).len(), 1);
    }

    fn rbac(yaml: &str) -> Vec<Finding> {
        let doc = parse(yaml).unwrap();
        validate_rbac(&ResourceDescriptor::new(&doc, Subject::document("rbac.yaml", 0)))
    }

    #[test]
    fn test_wildcard_verbs() {
        let failures = rbac("kind: Role\nmetadata:\n  name: r\nrules:\n  - verbs: [\"*\"]\n    resources: [pods]\n");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].code.as_str(), "SC2001");
        assert_eq!(failures[0].path.as_deref(), Some("rules[0]"));
    }

    #[test]
    fn test_dangerous_rules() {
        let failures = rbac(
            r#"
kind: ClusterRole
metadata:
  name: ops
rules:
  - apiGroups: [""]
    resources: ["*"]
    verbs: [get, list]
  - resources: [secrets, configmaps]
    verbs: [get, update, delete]
  - resources: [pods]
    verbs: [create]
  - resources: [secrets]
    verbs: [get, watch]
"#,
        );
        let codes: Vec<_> = failures.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["SC2002", "SC2003", "SC2004"]);
        assert_eq!(
            failures[1].message,
            "Role ops rule 1 allows update, delete on secrets"
        );
    }

    #[test]
    fn test_scalar_wildcards() {
        let failures = rbac("kind: Role\nmetadata:\n  name: r\nrules:\n  - verbs: \"*\"\n    resources: \"*\"\n");
        let codes: Vec<_> = failures.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["SC2001", "SC2002"]);
    }

    #[test]
    fn test_non_rbac_kinds_are_skipped() {
        assert!(rbac("kind: RoleBinding\nrules:\n  - verbs: [\"*\"]\n").is_empty());
        assert!(rbac("kind: Role\nrules: none\n").is_empty());
    }
}
