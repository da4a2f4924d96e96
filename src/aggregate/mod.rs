//! Resource request aggregation.
//!
//! Walks arbitrary document trees and sums every
//! `resources.requests.{cpu,memory}` found at any depth. Quantities that
//! fail to parse are skipped; aggregation never fails.

pub mod quantity;

use std::iter::Sum;
use std::ops::{Add, AddAssign, ControlFlow};

use serde::Serialize;

use crate::config::{AggregationLimits, LintConfig};
use crate::document::Document;
use crate::types::{Finding, Severity, Subject};

pub use quantity::{parse_cpu_cores, parse_memory_mib};

/// Default traversal depth bound.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Summed CPU (cores) and memory (MiB) requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceQuantity {
    pub cpu_cores: f64,
    #[serde(rename = "memoryMiB")]
    pub memory_mib: f64,
}

impl ResourceQuantity {
    pub fn new(cpu_cores: f64, memory_mib: f64) -> Self {
        Self {
            cpu_cores,
            memory_mib,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.cpu_cores == 0.0 && self.memory_mib == 0.0
    }
}

impl Add for ResourceQuantity {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            cpu_cores: self.cpu_cores + other.cpu_cores,
            memory_mib: self.memory_mib + other.memory_mib,
        }
    }
}

impl AddAssign for ResourceQuantity {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for ResourceQuantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Sum resource requests across a document set.
pub fn aggregate(documents: &[Document]) -> ResourceQuantity {
    aggregate_with_depth(documents, DEFAULT_MAX_DEPTH)
}

/// [`aggregate`] with an explicit traversal depth bound.
pub fn aggregate_with_depth(documents: &[Document], max_depth: usize) -> ResourceQuantity {
    documents
        .iter()
        .map(|doc| aggregate_document(doc, max_depth))
        .sum()
}

/// Sum resource requests inside one document.
pub fn aggregate_document(doc: &Document, max_depth: usize) -> ResourceQuantity {
    let mut total = ResourceQuantity::default();

    let _ = doc.walk(max_depth, &mut |_, node| {
        if let Some(requests) = node
            .get("resources")
            .filter(|r| r.is_mapping())
            .and_then(|r| r.get("requests"))
            .filter(|r| r.is_mapping())
        {
            total += requests_quantity(requests);
        }
        ControlFlow::Continue(())
    });

    total
}

fn requests_quantity(requests: &Document) -> ResourceQuantity {
    let cpu = requests.get("cpu").map(|node| {
        parse_cpu_cores(node).unwrap_or_else(|| {
            log::debug!("Skipping unparseable CPU request: {}", node);
            0.0
        })
    });
    let memory = requests.get("memory").map(|node| {
        parse_memory_mib(node).unwrap_or_else(|| {
            log::debug!("Skipping unparseable memory request: {}", node);
            0.0
        })
    });
    ResourceQuantity::new(cpu.unwrap_or(0.0), memory.unwrap_or(0.0))
}

/// Sum requests of manifest documents whose kind counts as a workload.
///
/// Manifests of other kinds (Services, ConfigMaps, ...) are ignored.
pub fn aggregate_workloads(documents: &[Document], config: &LintConfig) -> ResourceQuantity {
    documents
        .iter()
        .filter(|doc| {
            doc.get("kind")
                .and_then(Document::as_str)
                .is_some_and(|kind| config.is_workload_kind(kind))
        })
        .map(|doc| aggregate_document(doc, config.aggregation.max_depth))
        .sum()
}

/// Warn when totals exceed the configured limits.
pub fn check_totals(
    total: &ResourceQuantity,
    limits: &AggregationLimits,
    subject: &Subject,
) -> Vec<Finding> {
    let mut failures = Vec::new();

    if total.cpu_cores > limits.max_cpu_cores {
        failures.push(Finding::new(
            "AG1001",
            Severity::Warning,
            subject,
            format!(
                "High total CPU requests: {} cores (limit {})",
                total.cpu_cores, limits.max_cpu_cores
            ),
        ));
    }

    if total.memory_mib > limits.max_memory_mib {
        failures.push(Finding::new(
            "AG1002",
            Severity::Warning,
            subject,
            format!(
                "High total memory requests: {}MiB (limit {}MiB)",
                total.memory_mib, limits.max_memory_mib
            ),
        ));
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{parse, parse_stream};

    #[test]
    fn test_single_request() {
        let doc = parse("resources:\n  requests:\n    cpu: 500m\n    memory: 256Mi\n").unwrap();
        assert_eq!(aggregate(&[doc]), ResourceQuantity::new(0.5, 256.0));
    }

    #[test]
    fn test_nested_and_summed() {
        let doc = parse(
            r#"
spec:
  template:
    spec:
      containers:
        - name: a
          resources:
            requests:
              cpu: "1"
              memory: 1Gi
            limits:
              cpu: "4"
        - name: b
          resources:
            requests:
              cpu: 250m
              memory: 512Ki
"#,
        )
        .unwrap();
        let total = aggregate(std::slice::from_ref(&doc));
        assert_eq!(total.cpu_cores, 1.25);
        assert_eq!(total.memory_mib, 1024.5);
    }

    #[test]
    fn test_malformed_shapes_are_ignored() {
        let doc = parse(
            "a:\n  resources: 3\nb:\n  resources:\n    requests: [1]\nc:\n  resources:\n    requests:\n      cpu: lots\n      memory: 64Mi\n",
        )
        .unwrap();
        assert_eq!(aggregate(&[doc]), ResourceQuantity::new(0.0, 64.0));
    }

    #[test]
    fn test_depth_bound() {
        let doc = parse("a:\n  b:\n    resources:\n      requests:\n        cpu: 1\n").unwrap();
        assert_eq!(aggregate_with_depth(std::slice::from_ref(&doc), 1).cpu_cores, 0.0);
        assert_eq!(aggregate_with_depth(&[doc], 2).cpu_cores, 1.0);
    }

    #[test]
    fn test_workload_filter() {
        let docs = parse_stream(
            r#"
kind: Deployment
spec:
  resources:
    requests:
      cpu: 2
---
kind: Job
spec:
  resources:
    requests:
      cpu: 8
"#,
        )
        .unwrap();
        let total = aggregate_workloads(&docs, &LintConfig::default());
        assert_eq!(total.cpu_cores, 2.0);
        assert_eq!(aggregate(&docs).cpu_cores, 10.0);
    }

    #[test]
    fn test_check_totals() {
        let limits = AggregationLimits::default();
        let subject = Subject::new("cluster");
        assert!(check_totals(&ResourceQuantity::new(4.0, 1024.0), &limits, &subject).is_empty());

        let failures = check_totals(&ResourceQuantity::new(24.0, 60.0 * 1024.0), &limits, &subject);
        let codes: Vec<_> = failures.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["AG1001", "AG1002"]);
    }

    #[test]
    fn test_quantity_arithmetic() {
        let mut total = ResourceQuantity::new(1.0, 2.0);
        total += ResourceQuantity::new(0.5, 0.5);
        assert_eq!(total, ResourceQuantity::new(1.5, 2.5));
        assert!(ResourceQuantity::default().is_zero());

        let json = serde_json::to_value(total).unwrap();
        assert_eq!(json["cpuCores"], 1.5);
        assert_eq!(json["memoryMiB"], 2.5);
    }
}
