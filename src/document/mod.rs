//! Parsed document model.
//!
//! A [`Document`] is an immutable mapping/sequence/scalar tree built from
//! YAML or JSON text. Validators only ever borrow documents.

pub mod parser;
pub mod path;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::ControlFlow;

pub use parser::{parse, parse_json, parse_stream, read_stream};
pub use path::{DocPath, Segment};

/// A scalar leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::String(s) => write!(f, "{}", s),
        }
    }
}

/// A node of a parsed document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// String-keyed mapping. Keys are kept sorted so traversal is deterministic.
    Mapping(BTreeMap<String, Document>),
    /// Ordered sequence.
    Sequence(Vec<Document>),
    /// Leaf value.
    Scalar(Scalar),
}

impl Default for Document {
    fn default() -> Self {
        Document::Scalar(Scalar::Null)
    }
}

impl Document {
    /// Look up a mapping key.
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Follow a chain of mapping keys.
    pub fn get_path(&self, keys: &[&str]) -> Option<&Document> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Look up a sequence element.
    pub fn index(&self, index: usize) -> Option<&Document> {
        match self {
            Document::Sequence(items) => items.get(index),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Document>> {
        match self {
            Document::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Document]> {
        match self {
            Document::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Document::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// String scalar contents.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Scalar(Scalar::Null))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Document::Mapping(_))
    }

    /// Render a scalar as text; numbers and booleans are stringified.
    ///
    /// Returns `None` for mappings and sequences.
    pub fn render_scalar(&self) -> Option<String> {
        self.as_scalar().map(|s| s.to_string())
    }

    /// Short name of the node type, as used in JSON-schema messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Mapping(_) => "object",
            Document::Sequence(_) => "array",
            Document::Scalar(Scalar::Null) => "null",
            Document::Scalar(Scalar::Bool(_)) => "boolean",
            Document::Scalar(Scalar::Int(_)) | Document::Scalar(Scalar::Float(_)) => "number",
            Document::Scalar(Scalar::String(_)) => "string",
        }
    }

    /// String items of a sequence node; other item types are skipped.
    pub fn string_items(&self) -> Vec<&str> {
        self.as_sequence()
            .map(|items| items.iter().filter_map(Document::as_str).collect())
            .unwrap_or_default()
    }

    /// Like [`Document::string_items`], but a bare string counts as a
    /// one-item list.
    pub fn string_values(&self) -> Vec<&str> {
        match self.as_str() {
            Some(value) => vec![value],
            None => self.string_items(),
        }
    }

    /// Depth-first pre-order walk: mapping values in key order, then
    /// sequence elements in order.
    ///
    /// Nodes deeper than `max_depth` are not visited. The visitor can stop
    /// the walk early by returning `ControlFlow::Break`.
    pub fn walk<F>(&self, max_depth: usize, visit: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&DocPath, &Document) -> ControlFlow<()>,
    {
        self.walk_from(&DocPath::root(), max_depth, visit)
    }

    fn walk_from<F>(&self, path: &DocPath, max_depth: usize, visit: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&DocPath, &Document) -> ControlFlow<()>,
    {
        if path.depth() > max_depth {
            log::debug!("Depth limit {} reached at {}", max_depth, path);
            return ControlFlow::Continue(());
        }

        visit(path, self)?;

        match self {
            Document::Mapping(map) => {
                for (key, value) in map {
                    value.walk_from(&path.key(key.as_str()), max_depth, visit)?;
                }
            }
            Document::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    item.walk_from(&path.index(i), max_depth, visit)?;
                }
            }
            Document::Scalar(_) => {}
        }
        ControlFlow::Continue(())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Document::Scalar(scalar) => write!(f, "{}", scalar),
            other => write!(f, "{}", serde_json::Value::from(other)),
        }
    }
}

impl From<serde_yaml::Value> for Document {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => Document::Scalar(Scalar::Null),
            Value::Bool(b) => Document::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Document::Scalar(number_scalar(n.as_i64(), n.as_f64())),
            Value::String(s) => Document::Scalar(Scalar::String(s)),
            Value::Sequence(items) => {
                Document::Sequence(items.into_iter().map(Document::from).collect())
            }
            Value::Mapping(map) => Document::Mapping(
                map.into_iter()
                    .map(|(k, v)| (yaml_key_to_string(k), Document::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Document::from(tagged.value),
        }
    }
}

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Document::Scalar(Scalar::Null),
            Value::Bool(b) => Document::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Document::Scalar(number_scalar(n.as_i64(), n.as_f64())),
            Value::String(s) => Document::Scalar(Scalar::String(s)),
            Value::Array(items) => {
                Document::Sequence(items.into_iter().map(Document::from).collect())
            }
            Value::Object(map) => Document::Mapping(
                map.into_iter().map(|(k, v)| (k, Document::from(v))).collect(),
            ),
        }
    }
}

impl From<&Document> for serde_json::Value {
    fn from(doc: &Document) -> Self {
        use serde_json::Value;

        match doc {
            Document::Scalar(Scalar::Null) => Value::Null,
            Document::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Document::Scalar(Scalar::Int(i)) => Value::from(*i),
            Document::Scalar(Scalar::Float(x)) => serde_json::Number::from_f64(*x)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Document::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            Document::Sequence(items) => Value::Array(items.iter().map(Value::from).collect()),
            Document::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

fn number_scalar(as_int: Option<i64>, as_float: Option<f64>) -> Scalar {
    match (as_int, as_float) {
        (Some(i), _) => Scalar::Int(i),
        (None, Some(x)) => Scalar::Float(x),
        (None, None) => Scalar::Null,
    }
}

fn yaml_key_to_string(key: serde_yaml::Value) -> String {
    match Document::from(key) {
        Document::Scalar(scalar) => scalar.to_string(),
        other => other.to_string(),
    }
}
