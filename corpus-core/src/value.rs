//! The target payload tree: a tagged sum over scalar kinds and the
//! nested object/list structure that holds them, plus the sparse-target
//! invariant (no null, no empty string, no empty object, no empty list).

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A single scalar leaf value. `BTreeMap` (rather than `HashMap`) backs
/// [`TargetNode::Object`] so that two structurally equal payloads compare
/// equal and serialize identically regardless of insertion order — both
/// the TOON round-trip check and the property tests rely on this.
// `untagged` + serde_json's `Number` means a JSON integer always
// deserializes into `Integer`, never `Number` — the schema gate is what
// actually enforces integer-vs-float per leaf, not this derive.
//
// `Date` also serializes to a plain JSON string, which an `untagged`
// derive can't tell apart from `String` on the way back in — the manual
// `Deserialize` below tries `Date` before falling back to `String`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TargetValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
}

impl<'de> Deserialize<'de> for TargetValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Bool(b) => Ok(TargetValue::Boolean(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(TargetValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(TargetValue::Number(f))
                } else {
                    Err(D::Error::custom(format!("number out of range: {n}")))
                }
            }
            serde_json::Value::String(s) => match NaiveDate::from_str(&s) {
                Ok(date) => Ok(TargetValue::Date(date)),
                Err(_) => Ok(TargetValue::String(s)),
            },
            other => Err(D::Error::custom(format!("expected a scalar leaf value, found {other}"))),
        }
    }
}

impl TargetValue {
    /// True for the three empty-ish leaf forms the sparse gate rejects.
    /// Booleans, integers, numbers, and dates have no "empty" form.
    pub fn is_empty_leaf(&self) -> bool {
        matches!(self, TargetValue::String(s) if s.is_empty())
    }
}

/// A node in the target payload tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetNode {
    Leaf(TargetValue),
    Object(BTreeMap<String, TargetNode>),
    List(Vec<TargetNode>),
}

impl TargetNode {
    pub fn empty_object() -> Self {
        TargetNode::Object(BTreeMap::new())
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, TargetNode>> {
        match self {
            TargetNode::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut BTreeMap<String, TargetNode>> {
        match self {
            TargetNode::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<TargetNode>> {
        match self {
            TargetNode::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&TargetValue> {
        match self {
            TargetNode::Leaf(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this node is empty under the sparse-target invariant: an
    /// empty string leaf, an empty object, or an empty list. Non-empty
    /// scalars and non-empty containers are never empty.
    pub fn is_sparse_violation(&self) -> bool {
        match self {
            TargetNode::Leaf(v) => v.is_empty_leaf(),
            TargetNode::Object(m) => m.is_empty(),
            TargetNode::List(l) => l.is_empty(),
        }
    }

    /// Recursively removes every branch that is empty under the sparse
    /// invariant, innermost first, so a container left empty by
    /// removing its own children is itself removed by the caller.
    pub fn prune_empty(&mut self) {
        match self {
            TargetNode::Object(map) => {
                map.retain(|_, child| {
                    child.prune_empty();
                    !child.is_sparse_violation()
                });
            }
            TargetNode::List(items) => {
                for item in items.iter_mut() {
                    item.prune_empty();
                }
                items.retain(|item| !item.is_sparse_violation());
            }
            TargetNode::Leaf(_) => {}
        }
    }

    /// Walks the full tree, invoking `visit` with the path-building
    /// segments (as plain key/`None`-for-list-item strings already
    /// joined by callers) and the leaf value for every scalar terminal.
    /// Used by the sparse gate, the schema gate, and the name-coverage
    /// scan, each of which needs every `(path, value)` pair.
    pub fn walk_leaves<'a>(&'a self, path: &mut Vec<String>, visit: &mut dyn FnMut(&[String], &'a TargetValue)) {
        match self {
            TargetNode::Leaf(v) => visit(path, v),
            TargetNode::Object(map) => {
                for (k, child) in map {
                    path.push(k.clone());
                    child.walk_leaves(path, visit);
                    path.pop();
                }
            }
            TargetNode::List(items) => {
                for item in items {
                    path.push("[]".to_string());
                    item.walk_leaves(path, visit);
                    path.pop();
                }
            }
        }
    }

    /// True iff no subtree anywhere violates the sparse invariant.
    pub fn is_fully_sparse(&self) -> bool {
        if self.is_sparse_violation() {
            return false;
        }
        match self {
            TargetNode::Object(map) => map.values().all(|v| v.is_fully_sparse()),
            TargetNode::List(items) => items.iter().all(|v| v.is_fully_sparse()),
            TargetNode::Leaf(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(pairs: Vec<(&str, TargetNode)>) -> TargetNode {
        TargetNode::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn date_leaf_round_trips_as_date_not_string() {
        let value = TargetValue::Date(NaiveDate::from_ymd_opt(1975, 3, 14).unwrap());
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"1975-03-14\"");
        let decoded: TargetValue = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn non_date_string_leaf_still_decodes_as_string() {
        let value = TargetValue::String("Jean Dupont".to_string());
        let json = serde_json::to_string(&value).unwrap();
        let decoded: TargetValue = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn prune_empty_removes_nested_empty_branches() {
        let mut tree = obj(vec![
            ("nom", TargetNode::Leaf(TargetValue::String("Dupont".into()))),
            ("vide", TargetNode::Leaf(TargetValue::String(String::new()))),
            ("sous_arbre", obj(vec![("aussi_vide", TargetNode::List(vec![]))])),
        ]);
        tree.prune_empty();
        let map = tree.as_object().unwrap();
        assert!(map.contains_key("nom"));
        assert!(!map.contains_key("vide"));
        assert!(!map.contains_key("sous_arbre"));
    }

    #[test]
    fn is_fully_sparse_detects_deep_violations() {
        let tree = obj(vec![(
            "enfants",
            TargetNode::List(vec![obj(vec![(
                "nom",
                TargetNode::Leaf(TargetValue::String(String::new())),
            )])]),
        )]);
        assert!(!tree.is_fully_sparse());
    }

    #[test]
    fn walk_leaves_visits_every_scalar() {
        let tree = obj(vec![
            ("nom", TargetNode::Leaf(TargetValue::String("Dupont".into()))),
            (
                "enfants",
                TargetNode::List(vec![obj(vec![(
                    "nom",
                    TargetNode::Leaf(TargetValue::String("Martin".into())),
                )])]),
            ),
        ]);
        let mut seen = Vec::new();
        let mut path = Vec::new();
        tree.walk_leaves(&mut path, &mut |p, v| seen.push((p.join("."), v.clone())));
        assert_eq!(seen.len(), 2);
    }
}
