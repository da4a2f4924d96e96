//! Kubernetes quantity parsing.
//!
//! CPU is normalized to cores and memory to MiB. Only binary memory units
//! are converted; any other suffix is taken as MiB already.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Document, Scalar};

/// Leading decimal number of a quantity string.
static NUMERIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+(?:\.\d*)?|\.\d+)").unwrap());

const MEMORY_SUFFIXES: [&str; 8] = ["Ki", "Mi", "Gi", "Ti", "K", "M", "G", "T"];

/// Text of a quantity node. Numbers are accepted as written in YAML.
fn quantity_text(node: &Document) -> Option<String> {
    match node.as_scalar()? {
        Scalar::String(s) => Some(s.trim().to_string()),
        Scalar::Int(i) => Some(i.to_string()),
        Scalar::Float(x) => Some(x.to_string()),
        Scalar::Null | Scalar::Bool(_) => None,
    }
}

/// Parse a CPU quantity to cores.
///
/// # Examples
/// - "500m" -> 0.5
/// - "2" -> 2.0
/// - "1.5" -> 1.5
pub fn parse_cpu_cores(node: &Document) -> Option<f64> {
    let text = quantity_text(node)?;
    match text.strip_suffix('m') {
        Some(millis) => millis.parse::<f64>().ok().map(|m| m / 1000.0),
        None => text.parse::<f64>().ok(),
    }
}

/// Parse a memory quantity to MiB.
///
/// # Examples
/// - "256Mi" -> 256.0
/// - "1Gi" -> 1024.0
/// - "512Ki" -> 0.5
/// - "300" -> 300.0 (bare numbers are MiB)
/// - "500M" -> 500.0 (unknown suffix, taken as MiB)
pub fn parse_memory_mib(node: &Document) -> Option<f64> {
    let text = quantity_text(node)?;

    if let Some(value) = text.strip_suffix("Ki") {
        return value.parse::<f64>().ok().map(|v| v / 1024.0);
    }
    if let Some(value) = text.strip_suffix("Mi") {
        return value.parse::<f64>().ok();
    }
    if let Some(value) = text.strip_suffix("Gi") {
        return value.parse::<f64>().ok().map(|v| v * 1024.0);
    }
    if let Ok(value) = text.parse::<f64>() {
        return Some(value);
    }

    let prefix = NUMERIC_PREFIX.find(&text)?;
    log::debug!(
        "Memory quantity '{}' has an unrecognized suffix, treating as MiB",
        text
    );
    prefix.as_str().parse::<f64>().ok()
}

/// Whether a CPU string has the usual shape: millicores or a plain decimal.
pub fn is_plausible_cpu(value: &str) -> bool {
    if value.ends_with('m') {
        return true;
    }
    let digits: String = value.chars().filter(|c| *c != '.').collect();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Whether a memory string carries a known unit suffix or is a plain byte count.
pub fn is_plausible_memory(value: &str) -> bool {
    MEMORY_SUFFIXES.iter().any(|suffix| value.ends_with(suffix))
        || (!value.is_empty() && value.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Document {
        Document::Scalar(Scalar::String(text.to_string()))
    }

    #[test]
    fn test_parse_cpu() {
        assert_eq!(parse_cpu_cores(&s("500m")), Some(0.5));
        assert_eq!(parse_cpu_cores(&s("2")), Some(2.0));
        assert_eq!(parse_cpu_cores(&s("1.5")), Some(1.5));
        assert_eq!(parse_cpu_cores(&Document::Scalar(Scalar::Int(4))), Some(4.0));
        assert_eq!(parse_cpu_cores(&Document::Scalar(Scalar::Float(0.25))), Some(0.25));
        assert_eq!(parse_cpu_cores(&s("lots")), None);
        assert_eq!(parse_cpu_cores(&Document::Scalar(Scalar::Null)), None);
    }

    #[test]
    fn test_parse_memory() {
        assert_eq!(parse_memory_mib(&s("256Mi")), Some(256.0));
        assert_eq!(parse_memory_mib(&s("2Gi")), Some(2048.0));
        assert_eq!(parse_memory_mib(&s("512Ki")), Some(0.5));
        assert_eq!(parse_memory_mib(&s("300")), Some(300.0));
        assert_eq!(parse_memory_mib(&s("500M")), Some(500.0));
        assert_eq!(parse_memory_mib(&s("1Ti")), Some(1.0));
        assert_eq!(parse_memory_mib(&s("Mi")), None);
        assert_eq!(parse_memory_mib(&s("plenty")), None);
    }

    #[test]
    fn test_plausible_shapes() {
        assert!(is_plausible_cpu("250m"));
        assert!(is_plausible_cpu("0.5"));
        assert!(is_plausible_cpu("2"));
        assert!(!is_plausible_cpu("two"));
        assert!(!is_plausible_cpu(""));

        assert!(is_plausible_memory("128Mi"));
        assert!(is_plausible_memory("1G"));
        assert!(is_plausible_memory("1048576"));
        assert!(!is_plausible_memory("128mb"));
        assert!(!is_plausible_memory(""));
    }
}
