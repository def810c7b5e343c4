//! Generic, schema-shape-driven tree construction: walks whatever
//! structure the loaded master schema describes (object nesting, list
//! templates, leaves) without assuming fixed field names beyond the
//! root-level vocabulary resolved by `vocabulary.rs`.

use crate::values::generate_value;
use chrono::NaiveDate;
use corpus_core::{PathSegment, SchemaPath, TargetNode};
use corpus_schema::SchemaIndex;
use rand::Rng;
use std::collections::BTreeMap;

/// Finds the direct root child whose name matches one of `aliases`
/// (exact match first, then substring), if the loaded schema has one.
pub fn resolve_root_alias(schema: &SchemaIndex, aliases: &[&str]) -> Option<SchemaPath> {
    let root_children = schema.direct_children(&SchemaPath::root());
    let names: Vec<&str> = root_children
        .iter()
        .filter_map(|seg| match seg {
            PathSegment::Key(k) => Some(k.as_str()),
            PathSegment::ListItem => None,
        })
        .collect();

    for alias in aliases {
        if let Some(exact) = names.iter().find(|n| *n == alias) {
            return Some(SchemaPath::root().child_key(exact));
        }
    }
    for alias in aliases {
        if let Some(partial) = names.iter().find(|n| n.contains(alias)) {
            return Some(SchemaPath::root().child_key(partial));
        }
    }
    None
}

/// Builds a full subtree at `path`, including every leaf reachable from
/// it, with `inclusion_probability` governing whether each optional
/// sibling is kept (required leaves directly under an active path are
/// always included; this knob only thins out deeper optional fan-out).
/// Returns `None` if nothing ends up populated.
pub fn build_subtree(
    schema: &SchemaIndex,
    path: &SchemaPath,
    reference_date: NaiveDate,
    inclusion_probability: f64,
    min_list_instances: usize,
    rng: &mut impl Rng,
) -> Option<TargetNode> {
    if schema.is_leaf(path) {
        let spec = schema.leaf_spec(path)?;
        return Some(TargetNode::Leaf(generate_value(spec, reference_date, rng)));
    }

    if schema.is_list(path) {
        let item_path = path.child_list_item();
        let instance_count = min_list_instances.max(1);
        let mut items = Vec::new();
        for _ in 0..instance_count {
            if let Some(item) = build_subtree(schema, &item_path, reference_date, inclusion_probability, 1, rng) {
                items.push(item);
            }
        }
        if items.is_empty() {
            return None;
        }
        return Some(TargetNode::List(items));
    }

    let children = schema.direct_children(path);
    if children.is_empty() {
        return None;
    }
    let mut map = BTreeMap::new();
    for child in children {
        let PathSegment::Key(key) = child else { continue };
        let child_path = path.child_key(&key);
        if !map.is_empty() && rng.gen_bool(1.0 - inclusion_probability) {
            continue;
        }
        if let Some(node) = build_subtree(schema, &child_path, reference_date, inclusion_probability, min_list_instances, rng) {
            map.insert(key, node);
        }
    }
    if map.is_empty() {
        None
    } else {
        Some(TargetNode::Object(map))
    }
}

/// Merges `node` into `root` at the top level, overwriting any
/// existing key of the same name.
pub fn merge_into_root(root: &mut TargetNode, key: &str, node: TargetNode) {
    if let TargetNode::Object(map) = root {
        map.insert(key.to_string(), node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> SchemaIndex {
        SchemaIndex::from_value(&json!({
            "defunt": {
                "nom": {"__type__": "string"},
                "date_naissance": {"__type__": "date"}
            },
            "enfants": {
                "__list__": {
                    "nom": {"__type__": "string"},
                    "age": {"__type__": "integer"}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn resolve_root_alias_finds_exact_match() {
        let schema = schema();
        let path = resolve_root_alias(&schema, &["enfants", "children"]).unwrap();
        assert_eq!(path, SchemaPath::root().child_key("enfants"));
    }

    #[test]
    fn build_subtree_populates_every_leaf_under_identity() {
        let schema = schema();
        let reference = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut rng = rand::thread_rng();
        let node = build_subtree(&schema, &SchemaPath::root().child_key("defunt"), reference, 1.0, 1, &mut rng).unwrap();
        let map = node.as_object().unwrap();
        assert!(map.contains_key("nom"));
        assert!(map.contains_key("date_naissance"));
    }

    #[test]
    fn build_subtree_respects_minimum_list_instances() {
        let schema = schema();
        let reference = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut rng = rand::thread_rng();
        let node = build_subtree(&schema, &SchemaPath::root().child_key("enfants"), reference, 1.0, 2, &mut rng).unwrap();
        assert_eq!(node.as_list().unwrap().len(), 2);
    }
}
