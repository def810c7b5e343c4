//! The four validation gates every generation attempt must pass. Any
//! failure restarts the attempt; none of them mutate the candidate.

use corpus_core::{PathSegment, SchemaPath, TargetNode, Topic};
use corpus_schema::SchemaIndex;

use crate::builder::resolve_root_alias;
use crate::vocabulary::{topic_minimum_instances, topic_root_aliases};

pub fn sparse_gate(tree: &TargetNode) -> bool {
    tree.is_fully_sparse()
}

fn string_path_to_schema_path(segments: &[String]) -> SchemaPath {
    let segs = segments
        .iter()
        .map(|s| {
            if s == "[]" {
                PathSegment::ListItem
            } else {
                PathSegment::Key(s.clone())
            }
        })
        .collect();
    SchemaPath(segs)
}

pub fn schema_gate(tree: &TargetNode, schema: &SchemaIndex) -> bool {
    let mut all_valid = true;
    let mut path = Vec::new();
    tree.walk_leaves(&mut path, &mut |segments, value| {
        if all_valid {
            let schema_path = string_path_to_schema_path(segments);
            if schema.validate_leaf(&schema_path, value).is_err() {
                all_valid = false;
            }
        }
    });
    all_valid
}

/// Re-checks the business invariants the repair pass is supposed to
/// have already enforced, as an independent verification step: a
/// repair bug restarts the attempt instead of silently shipping an
/// incoherent target.
pub fn coherence_gate(root: &TargetNode) -> bool {
    let Some(map) = root.as_object() else { return true };

    if let Some(identity) = map.get("defunt") {
        if let (Some(birth), Some(death)) = (find_date(identity, "naissance"), find_date(identity, "deces")) {
            if birth >= death {
                return false;
            }
        }
    }

    if let Some(donations) = map.get("donations") {
        if let Some(items) = donations.as_list() {
            for item in items {
                let donor = find_name(item, "donateur");
                let beneficiary = find_name(item, "beneficiaire");
                if let (Some(d), Some(b)) = (donor, beneficiary) {
                    if d == b {
                        return false;
                    }
                }
            }
        }
    }

    true
}

/// Every drawn topic must have produced a subtree whose root alias the
/// generator could actually resolve against the loaded schema, and that
/// subtree must carry the topic's mandatory leaves: a list-shaped topic
/// needs at least `topic_minimum_instances` items (e.g. at least one
/// life-insurance contract), an object-shaped topic just needs to be
/// non-empty. Topics the schema has no matching subtree for are
/// vacuously aligned (nothing to check).
pub fn topic_alignment_gate(root: &TargetNode, schema: &SchemaIndex, topics: &[Topic]) -> bool {
    let Some(map) = root.as_object() else { return topics.is_empty() };
    for topic in topics {
        let Some(resolved) = resolve_root_alias(schema, topic_root_aliases(*topic)) else {
            continue;
        };
        let SchemaPath(segments) = &resolved;
        let Some(PathSegment::Key(root_key)) = segments.last() else { continue };
        let Some(subtree) = map.get(root_key) else { return false };
        let minimum = topic_minimum_instances(*topic);
        let satisfied = match subtree {
            TargetNode::List(items) => items.len() >= minimum.max(1),
            TargetNode::Object(obj) => !obj.is_empty(),
            TargetNode::Leaf(_) => true,
        };
        if !satisfied {
            return false;
        }
    }
    true
}

fn find_date(node: &TargetNode, key_substr: &str) -> Option<chrono::NaiveDate> {
    let mut found = None;
    walk_read(node, &mut |key, value| {
        if found.is_none() && key.contains(key_substr) {
            if let corpus_core::TargetValue::Date(d) = value {
                found = Some(*d);
            }
        }
    });
    found
}

fn find_name(node: &TargetNode, key_substr: &str) -> Option<String> {
    let mut found = None;
    walk_read(node, &mut |key, value| {
        if found.is_none() && key.contains(key_substr) && key.contains("nom") {
            if let corpus_core::TargetValue::String(s) = value {
                found = Some(s.clone());
            }
        }
    });
    found
}

fn walk_read(node: &TargetNode, visit: &mut dyn FnMut(&str, &corpus_core::TargetValue)) {
    match node {
        TargetNode::Leaf(_) => {}
        TargetNode::Object(map) => {
            for (key, child) in map {
                if let TargetNode::Leaf(value) = child {
                    visit(key, value);
                } else {
                    walk_read(child, visit);
                }
            }
        }
        TargetNode::List(items) => {
            for item in items {
                walk_read(item, visit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_core::TargetValue;
    use std::collections::BTreeMap;

    fn obj(pairs: Vec<(&str, TargetNode)>) -> TargetNode {
        TargetNode::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn schema_with_assurance_vie() -> SchemaIndex {
        SchemaIndex::from_value(&serde_json::json!({
            "assurance_vie": {
                "__list__": {
                    "assureur": {"__type__": "string"},
                    "montant": {"__type__": "number"}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn topic_alignment_gate_rejects_topic_root_present_but_list_empty() {
        let schema = schema_with_assurance_vie();
        let root = obj(vec![("assurance_vie", TargetNode::List(vec![]))]);
        assert!(!topic_alignment_gate(&root, &schema, &[Topic::AssuranceVie]));
    }

    #[test]
    fn topic_alignment_gate_rejects_topic_root_missing_entirely() {
        let schema = schema_with_assurance_vie();
        let root = obj(vec![]);
        assert!(!topic_alignment_gate(&root, &schema, &[Topic::AssuranceVie]));
    }

    #[test]
    fn topic_alignment_gate_accepts_topic_with_its_mandatory_instance() {
        let schema = schema_with_assurance_vie();
        let root = obj(vec![(
            "assurance_vie",
            TargetNode::List(vec![obj(vec![(
                "assureur",
                TargetNode::Leaf(TargetValue::String("Generali".into())),
            )])]),
        )]);
        assert!(topic_alignment_gate(&root, &schema, &[Topic::AssuranceVie]));
    }

    #[test]
    fn sparse_gate_rejects_empty_string_leaf() {
        let tree = obj(vec![("nom", TargetNode::Leaf(TargetValue::String(String::new())))]);
        assert!(!sparse_gate(&tree));
    }

    #[test]
    fn coherence_gate_rejects_inverted_birth_death() {
        let root = obj(vec![(
            "defunt",
            obj(vec![
                ("date_naissance", TargetNode::Leaf(TargetValue::Date(chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()))),
                ("date_deces", TargetNode::Leaf(TargetValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))),
            ]),
        )]);
        assert!(!coherence_gate(&root));
    }

    #[test]
    fn coherence_gate_rejects_donor_equals_beneficiary() {
        let root = obj(vec![(
            "donations",
            TargetNode::List(vec![obj(vec![
                ("donateur_nom", TargetNode::Leaf(TargetValue::String("Jean Dupont".into()))),
                ("beneficiaire_nom", TargetNode::Leaf(TargetValue::String("Jean Dupont".into()))),
            ])]),
        )]);
        assert!(!coherence_gate(&root));
    }
}
