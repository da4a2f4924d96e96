//! JS1xxx - Minimal JSON-schema checks.
//!
//! Only top-level `required` and `properties.<field>.type` are understood,
//! for the primitive types string, number, boolean, array and object.
//! Every other keyword is ignored.

use crate::document::{DocPath, Document, Scalar};
use crate::types::{Finding, Severity, Subject};

/// Check `data` against the `required` list and property types of `schema`.
pub fn validate_json_schema(data: &Document, schema: &Document, subject: &Subject) -> Vec<Finding> {
    let mut failures = Vec::new();

    if let Some(required) = schema.get("required") {
        for field in required.string_items() {
            if !data.contains_key(field) {
                failures.push(
                    Finding::new(
                        "JS1001",
                        Severity::Error,
                        subject,
                        format!("Missing required field: {}", field),
                    )
                    .at(&DocPath::from_keys(&[field])),
                );
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Document::as_mapping) else {
        return failures;
    };

    for (field, field_schema) in properties {
        let Some(value) = data.get(field) else {
            continue;
        };
        let Some(expected) = field_schema.get("type").and_then(Document::as_str) else {
            continue;
        };
        if let Some(false) = matches_type(value, expected) {
            failures.push(
                Finding::new(
                    "JS1002",
                    Severity::Error,
                    subject,
                    format!(
                        "Field {} should be {}, got {}",
                        field,
                        expected,
                        value.type_name()
                    ),
                )
                .at(&DocPath::from_keys(&[field.as_str()])),
            );
        }
    }

    failures
}

/// Whether `value` has the named type; `None` for types this check
/// does not know.
fn matches_type(value: &Document, expected: &str) -> Option<bool> {
    let matched = match expected {
        "string" => matches!(value, Document::Scalar(Scalar::String(_))),
        "number" => matches!(
            value,
            Document::Scalar(Scalar::Int(_)) | Document::Scalar(Scalar::Float(_))
        ),
        "boolean" => matches!(value, Document::Scalar(Scalar::Bool(_))),
        "array" => matches!(value, Document::Sequence(_)),
        "object" => matches!(value, Document::Mapping(_)),
        _ => return None,
    };
    Some(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_json;

    fn schema() -> Document {
        parse_json(
            r#"{
                "required": ["name", "replicas"],
                "properties": {
                    "name": {"type": "string"},
                    "replicas": {"type": "number"},
                    "enabled": {"type": "boolean"},
                    "ports": {"type": "array"},
                    "labels": {"type": "object"},
                    "ratio": {"type": "integer"}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_data() {
        let data = parse_json(
            r#"{"name": "web", "replicas": 2.5, "enabled": true, "ports": [80], "labels": {}, "ratio": "x"}"#,
        )
        .unwrap();
        assert!(validate_json_schema(&data, &schema(), &Subject::new("values.json")).is_empty());
    }

    #[test]
    fn test_missing_and_mistyped() {
        let data = parse_json(r#"{"replicas": "3", "enabled": 1, "ports": {}, "labels": []}"#).unwrap();
        let failures = validate_json_schema(&data, &schema(), &Subject::new("values.json"));
        let messages: Vec<_> = failures.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Missing required field: name",
                "Field enabled should be boolean, got number",
                "Field labels should be object, got array",
                "Field ports should be array, got object",
                "Field replicas should be number, got string",
            ]
        );
        assert_eq!(failures[0].code.as_str(), "JS1001");
        assert!(failures[1..].iter().all(|f| f.code.as_str() == "JS1002"));
    }

    #[test]
    fn test_boolean_is_not_a_number() {
        let data = parse_json(r#"{"name": "a", "replicas": true}"#).unwrap();
        let failures = validate_json_schema(&data, &schema(), &Subject::new("v.json"));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path.as_deref(), Some("replicas"));
    }
}
