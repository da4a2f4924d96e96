use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::Severity;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LintConfig {
    /// Rules to drop (by code, e.g., "KM1005").
    pub ignored_rules: HashSet<String>,
    /// Severity overrides for specific rules.
    pub severity_overrides: HashMap<String, Severity>,
    /// Findings at or above this severity fail the report.
    pub failure_threshold: Severity,
    /// Treat warnings as errors.
    pub strict: bool,
    pub security: SecurityRules,
    pub naming: NamingLimits,
    pub aggregation: AggregationLimits,
    /// Kinds whose manifests count toward quota totals.
    pub workload_kinds: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            ignored_rules: HashSet::new(),
            severity_overrides: HashMap::new(),
            failure_threshold: Severity::Error,
            strict: false,
            security: SecurityRules::default(),
            naming: NamingLimits::default(),
            aggregation: AggregationLimits::default(),
            workload_kinds: vec![
                "Deployment".to_string(),
                "StatefulSet".to_string(),
                "DaemonSet".to_string(),
            ],
        }
    }
}

impl LintConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule to ignore.
    pub fn ignore(mut self, rule: impl Into<String>) -> Self {
        self.ignored_rules.insert(rule.into());
        self
    }

    /// Override severity for a specific rule.
    pub fn with_severity(mut self, rule: impl Into<String>, severity: Severity) -> Self {
        self.severity_overrides.insert(rule.into(), severity);
        self
    }

    /// Set the failure threshold.
    pub fn with_threshold(mut self, threshold: Severity) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Enable strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Check if a rule is ignored.
    pub fn is_rule_ignored(&self, code: &str) -> bool {
        self.ignored_rules.contains(code)
    }

    /// Get the effective severity for a rule.
    pub fn effective_severity(&self, code: &str, default: Severity) -> Severity {
        if let Some(&override_severity) = self.severity_overrides.get(code) {
            override_severity
        } else if self.strict && default == Severity::Warning {
            Severity::Error
        } else {
            default
        }
    }

    /// Whether a document of this kind contributes to quota totals.
    pub fn is_workload_kind(&self, kind: &str) -> bool {
        self.workload_kinds.iter().any(|k| k == kind)
    }
}

/// Pattern tables for the security scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SecurityRules {
    /// Names that mark a line as a potential literal secret.
    pub secret_patterns: Vec<String>,
    /// Markers of a templated or indirect value.
    pub reference_markers: Vec<String>,
    /// Verbs that make access to secrets dangerous.
    pub dangerous_verbs: Vec<String>,
}

impl Default for SecurityRules {
    fn default() -> Self {
        Self {
            secret_patterns: ["password", "api_key", "token", "secret"]
                .map(String::from)
                .to_vec(),
            reference_markers: ["secretkeyref", "configmapkeyref", "{{", "${"]
                .map(String::from)
                .to_vec(),
            dangerous_verbs: ["create", "delete", "deletecollection", "patch", "update"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// Length limits for resource metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NamingLimits {
    pub max_name_length: usize,
    pub max_label_length: usize,
    pub max_annotation_prefix_length: usize,
    pub max_annotation_name_length: usize,
}

impl Default for NamingLimits {
    fn default() -> Self {
        Self {
            max_name_length: 253,
            max_label_length: 63,
            max_annotation_prefix_length: 253,
            max_annotation_name_length: 63,
        }
    }
}

/// Limits for quota aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AggregationLimits {
    /// Total CPU requests (cores) above which a warning is reported.
    pub max_cpu_cores: f64,
    /// Total memory requests (MiB) above which a warning is reported.
    pub max_memory_mib: f64,
    /// Deepest nesting level visited by recursive searches.
    pub max_depth: usize,
}

impl Default for AggregationLimits {
    fn default() -> Self {
        Self {
            max_cpu_cores: 20.0,
            max_memory_mib: 50.0 * 1024.0,
            max_depth: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LintConfig::default();
        assert!(config.ignored_rules.is_empty());
        assert_eq!(config.failure_threshold, Severity::Error);
        assert!(config.is_workload_kind("StatefulSet"));
        assert!(!config.is_workload_kind("Service"));
        assert_eq!(config.aggregation.max_depth, 64);
    }

    #[test]
    fn test_severity_override() {
        let config = LintConfig::default().with_severity("KM1005", Severity::Error);
        assert_eq!(
            config.effective_severity("KM1005", Severity::Warning),
            Severity::Error
        );
        assert_eq!(
            config.effective_severity("KM1006", Severity::Warning),
            Severity::Warning
        );
    }

    #[test]
    fn test_strict_mode() {
        let config = LintConfig::default().with_strict(true);
        assert_eq!(
            config.effective_severity("SC2001", Severity::Warning),
            Severity::Error
        );
        assert_eq!(
            config.effective_severity("DF1009", Severity::Info),
            Severity::Info
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: LintConfig = toml::from_str(
            r#"
strict = true
ignored-rules = ["KM1005"]

[aggregation]
max-cpu-cores = 8.0
"#,
        )
        .unwrap();
        assert!(config.strict);
        assert!(config.is_rule_ignored("KM1005"));
        assert_eq!(config.aggregation.max_cpu_cores, 8.0);
        assert_eq!(config.aggregation.max_depth, 64);
        assert_eq!(config.security, SecurityRules::default());
    }
}
