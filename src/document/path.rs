//! Key paths into a document tree.

use std::fmt;

/// One step of a [`DocPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A location inside a document, rendered as `spec.template.spec.containers[0].name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DocPath {
    segments: Vec<Segment>,
}

impl DocPath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from a list of mapping keys.
    pub fn from_keys(keys: &[&str]) -> Self {
        Self {
            segments: keys.iter().map(|k| Segment::Key((*k).to_string())).collect(),
        }
    }

    /// Child path through a mapping key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.into()));
        Self { segments }
    }

    /// Child path through a sequence index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The last mapping key on the path, if the path ends in one.
    pub fn last_key(&self) -> Option<&str> {
        match self.segments.last() {
            Some(Segment::Key(key)) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, ".");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path = DocPath::from_keys(&["spec", "template", "spec", "containers"])
            .index(0)
            .key("image");
        assert_eq!(path.to_string(), "spec.template.spec.containers[0].image");
        assert_eq!(path.depth(), 6);
        assert_eq!(path.last_key(), Some("image"));
    }

    #[test]
    fn test_root() {
        assert!(DocPath::root().is_root());
        assert_eq!(DocPath::root().to_string(), ".");
        assert_eq!(DocPath::root().index(3).to_string(), "[3]");
    }
}
