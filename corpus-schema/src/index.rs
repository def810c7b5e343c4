//! Parses the master schema file and indexes every leaf path and every
//! non-leaf prefix for constant-time lookup.
//!
//! The master schema is a custom nested description, not standard JSON
//! Schema. A node is one of three shapes:
//!
//! - an **object node**: a plain JSON object whose keys are field names,
//!   each mapping to a child node;
//! - a **list node**: `{"__list__": <template node>}`, wrapping exactly
//!   one template that describes every element of the list;
//! - a **leaf node**: `{"__type__": "string"|"integer"|"number"|
//!   "boolean"|"date", "__enum__": [...]}` (`__enum__` optional).
//!
//! Any other shape — a map with stray keys alongside `__list__`, an
//! unknown `__`-prefixed marker, a bare scalar at a position that isn't
//! wrapped in a leaf node — is a fatal [`SchemaError::MalformedNode`] at
//! load time. Nothing is silently skipped.

use crate::error::SchemaError;
use corpus_core::{LeafSpec, PathSegment, ScalarType, SchemaPath, TargetValue};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

const TYPE_KEY: &str = "__type__";
const ENUM_KEY: &str = "__enum__";
const LIST_KEY: &str = "__list__";

/// Indexes every leaf path (with its declared scalar type and optional
/// enum set) and every non-leaf prefix path discovered in the master
/// schema. Built once at startup and shared read-only thereafter.
#[derive(Debug, Clone)]
pub struct SchemaIndex {
    leaves: HashMap<SchemaPath, LeafSpec>,
    prefixes: HashSet<SchemaPath>,
}

impl SchemaIndex {
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root: Value = serde_json::from_str(&raw).map_err(|source| SchemaError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(&root)
    }

    pub fn from_value(root: &Value) -> Result<Self, SchemaError> {
        let mut index = SchemaIndex {
            leaves: HashMap::new(),
            prefixes: HashSet::new(),
        };
        index.index_node(&SchemaPath::root(), root)?;
        Ok(index)
    }

    fn index_node(&mut self, path: &SchemaPath, node: &Value) -> Result<(), SchemaError> {
        let obj = node.as_object().ok_or_else(|| SchemaError::MalformedNode {
            path: path.clone(),
            reason: "expected a JSON object node".to_string(),
        })?;

        if let Some(type_value) = obj.get(TYPE_KEY) {
            return self.index_leaf(path, obj, type_value);
        }

        if let Some(template) = obj.get(LIST_KEY) {
            if obj.len() != 1 {
                return Err(SchemaError::MalformedNode {
                    path: path.clone(),
                    reason: format!(
                        "a list node must contain only '{LIST_KEY}', found {} keys",
                        obj.len()
                    ),
                });
            }
            self.prefixes.insert(path.clone());
            let item_path = path.child_list_item();
            self.prefixes.insert(item_path.clone());
            return self.index_node(&item_path, template);
        }

        // Plain object node: every key must be a well-formed field name,
        // and no stray dunder-marker keys are tolerated.
        for key in obj.keys() {
            if key.starts_with("__") && key.ends_with("__") {
                return Err(SchemaError::MalformedNode {
                    path: path.clone(),
                    reason: format!("unknown marker key '{key}'"),
                });
            }
        }
        self.prefixes.insert(path.clone());
        for (key, child) in obj {
            self.index_node(&path.child_key(key), child)?;
        }
        Ok(())
    }

    fn index_leaf(
        &mut self,
        path: &SchemaPath,
        obj: &serde_json::Map<String, Value>,
        type_value: &Value,
    ) -> Result<(), SchemaError> {
        for key in obj.keys() {
            if key != TYPE_KEY && key != ENUM_KEY {
                return Err(SchemaError::MalformedNode {
                    path: path.clone(),
                    reason: format!("unknown key '{key}' in leaf node"),
                });
            }
        }

        let type_str = type_value.as_str().ok_or_else(|| SchemaError::MalformedNode {
            path: path.clone(),
            reason: format!("'{TYPE_KEY}' must be a string"),
        })?;
        let scalar_type = match type_str {
            "string" => ScalarType::String,
            "integer" => ScalarType::Integer,
            "number" => ScalarType::Number,
            "boolean" => ScalarType::Boolean,
            "date" => ScalarType::Date,
            "enum" => ScalarType::Enum,
            other => {
                return Err(SchemaError::MalformedNode {
                    path: path.clone(),
                    reason: format!("unknown scalar type '{other}'"),
                })
            }
        };

        let allowed_values = match obj.get(ENUM_KEY) {
            None => None,
            Some(Value::Array(items)) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let s = item.as_str().ok_or_else(|| SchemaError::MalformedNode {
                        path: path.clone(),
                        reason: format!("'{ENUM_KEY}' entries must be strings"),
                    })?;
                    values.push(s.to_string());
                }
                Some(values)
            }
            Some(_) => {
                return Err(SchemaError::MalformedNode {
                    path: path.clone(),
                    reason: format!("'{ENUM_KEY}' must be an array of strings"),
                })
            }
        };

        if scalar_type == ScalarType::Enum && allowed_values.is_none() {
            return Err(SchemaError::MalformedNode {
                path: path.clone(),
                reason: format!("scalar type 'enum' requires '{ENUM_KEY}'"),
            });
        }

        self.leaves.insert(
            path.clone(),
            LeafSpec {
                path: path.clone(),
                scalar_type,
                allowed_values,
            },
        );
        Ok(())
    }

    pub fn is_leaf(&self, path: &SchemaPath) -> bool {
        self.leaves.contains_key(path)
    }

    pub fn leaf_spec(&self, path: &SchemaPath) -> Option<&LeafSpec> {
        self.leaves.get(path)
    }

    pub fn is_prefix(&self, path: &SchemaPath) -> bool {
        path.is_root() || self.prefixes.contains(path)
    }

    /// Every leaf path whose path starts with `prefix`, including
    /// `prefix` itself if it happens to name a leaf directly.
    pub fn leaves_under(&self, prefix: &SchemaPath) -> Vec<&LeafSpec> {
        self.leaves
            .values()
            .filter(|spec| spec.path.starts_with(prefix))
            .collect()
    }

    pub fn enum_values(&self, path: &SchemaPath) -> Option<&[String]> {
        self.leaves
            .get(path)
            .and_then(|spec| spec.allowed_values.as_deref())
    }

    pub fn all_leaves(&self) -> impl Iterator<Item = &LeafSpec> {
        self.leaves.values()
    }

    /// The immediate child segments of `path` — either object keys or a
    /// single [`PathSegment::ListItem`] if `path` names a list. Used by
    /// the generator to walk the schema tree structurally without
    /// knowing the domain-specific field names in advance.
    pub fn direct_children(&self, path: &SchemaPath) -> Vec<PathSegment> {
        let depth = path.0.len();
        let mut seen = HashSet::new();
        let mut children = Vec::new();
        let candidates = self.prefixes.iter().chain(self.leaves.keys());
        for candidate in candidates {
            if candidate.0.len() == depth + 1 && candidate.starts_with(path) {
                let seg = candidate.0[depth].clone();
                if seen.insert(seg.clone()) {
                    children.push(seg);
                }
            }
        }
        children
    }

    /// Whether `path` names a list container (its element template is
    /// indexed at `path` + [`PathSegment::ListItem`]).
    pub fn is_list(&self, path: &SchemaPath) -> bool {
        self.prefixes.contains(&path.child_list_item()) || self.leaves.contains_key(&path.child_list_item())
    }

    /// Validates a single leaf value against its declared spec: the
    /// path must be known, the runtime type must match (dates as
    /// ISO-8601 day strings, integers accepted where numbers are
    /// expected), and, if an enum set is declared, the value must
    /// belong to it.
    pub fn validate_leaf(&self, path: &SchemaPath, value: &TargetValue) -> Result<(), SchemaError> {
        let spec = self
            .leaf_spec(path)
            .ok_or_else(|| SchemaError::UnknownLeaf { path: path.clone() })?;

        let type_ok = match (spec.scalar_type, value) {
            (ScalarType::String, TargetValue::String(_)) => true,
            (ScalarType::Integer, TargetValue::Integer(_)) => true,
            (ScalarType::Number, TargetValue::Number(_) | TargetValue::Integer(_)) => true,
            (ScalarType::Boolean, TargetValue::Boolean(_)) => true,
            (ScalarType::Date, TargetValue::Date(_)) => true,
            (ScalarType::Enum, TargetValue::String(_)) => true,
            _ => false,
        };
        if !type_ok {
            return Err(SchemaError::TypeMismatch {
                path: path.clone(),
                expected: spec.scalar_type,
            });
        }

        if let Some(allowed) = &spec.allowed_values {
            let as_str = match value {
                TargetValue::String(s) => s.clone(),
                TargetValue::Date(d) => d.format("%Y-%m-%d").to_string(),
                TargetValue::Integer(i) => i.to_string(),
                TargetValue::Number(n) => n.to_string(),
                TargetValue::Boolean(b) => b.to_string(),
            };
            if !allowed.contains(&as_str) {
                return Err(SchemaError::NotInEnum {
                    path: path.clone(),
                    value: as_str,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> Value {
        json!({
            "defunt": {
                "nom": {"__type__": "string"},
                "statut_marital": {"__type__": "enum", "__enum__": ["celibataire", "marie", "veuf"]},
                "date_naissance": {"__type__": "date"}
            },
            "enfants": {
                "__list__": {
                    "nom": {"__type__": "string"},
                    "age": {"__type__": "integer"}
                }
            }
        })
    }

    #[test]
    fn indexes_leaves_and_prefixes() {
        let index = SchemaIndex::from_value(&sample_schema()).unwrap();
        let nom = SchemaPath::root().child_key("defunt").child_key("nom");
        assert!(index.is_leaf(&nom));
        assert!(index.is_prefix(&SchemaPath::root().child_key("defunt")));

        let enfant_nom = SchemaPath::root()
            .child_key("enfants")
            .child_list_item()
            .child_key("nom");
        assert!(index.is_leaf(&enfant_nom));
    }

    #[test]
    fn rejects_unknown_marker_key() {
        let bad = json!({ "defunt": { "__unknown__": 1, "nom": {"__type__": "string"} } });
        assert!(SchemaIndex::from_value(&bad).is_err());
    }

    #[test]
    fn load_reads_and_indexes_a_schema_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master_schema.json");
        std::fs::write(&path, sample_schema().to_string()).unwrap();

        let index = SchemaIndex::load(&path).unwrap();
        let nom = SchemaPath::root().child_key("defunt").child_key("nom");
        assert!(index.is_leaf(&nom));
    }

    #[test]
    fn load_reports_read_error_for_a_missing_file() {
        let missing = Path::new("/nonexistent-master-schema-file.json");
        assert!(matches!(SchemaIndex::load(missing), Err(SchemaError::Read { .. })));
    }

    #[test]
    fn rejects_list_node_with_stray_keys() {
        let bad = json!({ "enfants": { "__list__": {"nom": {"__type__": "string"}}, "extra": 1 } });
        assert!(SchemaIndex::from_value(&bad).is_err());
    }

    #[test]
    fn enum_without_enum_values_is_rejected() {
        let bad = json!({ "statut": {"__type__": "enum"} });
        assert!(SchemaIndex::from_value(&bad).is_err());
    }

    #[test]
    fn validate_leaf_enforces_enum_membership() {
        let index = SchemaIndex::from_value(&sample_schema()).unwrap();
        let path = SchemaPath::root().child_key("defunt").child_key("statut_marital");
        assert!(index
            .validate_leaf(&path, &TargetValue::String("marie".to_string()))
            .is_ok());
        assert!(index
            .validate_leaf(&path, &TargetValue::String("divorce".to_string()))
            .is_err());
    }

    #[test]
    fn validate_leaf_accepts_integer_for_number_type() {
        let schema = json!({ "montant": {"__type__": "number"} });
        let index = SchemaIndex::from_value(&schema).unwrap();
        let path = SchemaPath::root().child_key("montant");
        assert!(index.validate_leaf(&path, &TargetValue::Integer(100)).is_ok());
    }

    #[test]
    fn direct_children_and_is_list_walk_the_tree_structurally() {
        let index = SchemaIndex::from_value(&sample_schema()).unwrap();
        let root = SchemaPath::root();
        let children = index.direct_children(&root);
        assert_eq!(children.len(), 2);
        assert!(index.is_list(&root.child_key("enfants")));
        assert!(!index.is_list(&root.child_key("defunt")));

        let enfant_children = index.direct_children(&root.child_key("enfants"));
        assert_eq!(enfant_children, vec![PathSegment::ListItem]);
    }

    #[test]
    fn leaves_under_filters_by_prefix() {
        let index = SchemaIndex::from_value(&sample_schema()).unwrap();
        let prefix = SchemaPath::root().child_key("defunt");
        assert_eq!(index.leaves_under(&prefix).len(), 3);
    }
}
