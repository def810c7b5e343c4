//! Schema path and scalar-type primitives shared by the schema index,
//! the target generator, and the submission validator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step in a schema path: an object key, or the template slot of a
/// list (schema paths describe the list's element template, never a
/// concrete numeric index — a list in the master schema has exactly one
/// template describing every element).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    Key(String),
    ListItem,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::ListItem => f.write_str("[]"),
        }
    }
}

/// A sequence of path segments locating a node in the master schema or
/// in a target payload. Stored as a `Vec` rather than a borrowed slice
/// so it can be owned by index entries, generator state, and records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SchemaPath(pub Vec<PathSegment>);

impl SchemaPath {
    pub fn root() -> Self {
        SchemaPath(Vec::new())
    }

    pub fn child_key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        SchemaPath(segments)
    }

    pub fn child_list_item(&self) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::ListItem);
        SchemaPath(segments)
    }

    /// The local key name of the final segment, if the path ends on an
    /// object key. Used to drive the local-key-name heuristics in the
    /// value generator and the `nom`/`*_nom`/`*_noms` name-coverage check.
    pub fn local_key(&self) -> Option<&str> {
        match self.0.last() {
            Some(PathSegment::Key(k)) => Some(k.as_str()),
            _ => None,
        }
    }

    pub fn starts_with(&self, prefix: &SchemaPath) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 && !matches!(seg, PathSegment::ListItem) {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

/// The declared scalar type of a schema leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    String,
    Integer,
    Number,
    Boolean,
    Date,
    Enum,
}

/// A schema leaf: a terminal path with its declared scalar type and, if
/// present, the closed set of values it may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafSpec {
    pub path: SchemaPath,
    pub scalar_type: ScalarType,
    pub allowed_values: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_dotted_path_with_list_markers() {
        let path = SchemaPath::root()
            .child_key("enfants")
            .child_list_item()
            .child_key("nom");
        assert_eq!(path.to_string(), "enfants[].nom");
    }

    #[test]
    fn starts_with_checks_prefix_membership() {
        let prefix = SchemaPath::root().child_key("contrats_assurance_vie");
        let leaf = prefix.child_list_item().child_key("beneficiaire_nom");
        assert!(leaf.starts_with(&prefix));
        assert!(!prefix.starts_with(&leaf));
    }

    #[test]
    fn local_key_is_none_for_list_item_segment() {
        let path = SchemaPath::root().child_key("enfants").child_list_item();
        assert_eq!(path.local_key(), None);
    }
}
