//! Name-coverage check: every personal-name value in the decoded
//! target must appear in the case text, under the folded comparison,
//! with a partial-last-name fallback.

use crate::normalize::fold;
use corpus_core::{TargetNode, TargetValue};

/// Every leaf value whose local key is `nom`, ends in `_nom`, or ends
/// in `_noms` — the same key-name convention the generator's repair
/// pass and prompt builder use to find personal names.
pub fn names_in_target(root: &TargetNode) -> Vec<String> {
    let mut names = Vec::new();
    let mut path = Vec::new();
    root.walk_leaves(&mut path, &mut |segments, value| {
        let Some(key) = segments.last() else { return };
        if key == "nom" || key.ends_with("_nom") || key.ends_with("_noms") {
            if let TargetValue::String(s) = value {
                if !names.contains(s) {
                    names.push(s.clone());
                }
            }
        }
    });
    names
}

/// True if `name` (or, failing that, its last whitespace-separated
/// token) appears in the folded `case_text`.
pub fn name_is_covered(name: &str, folded_case_text: &str) -> bool {
    let folded_name = fold(name);
    if folded_name.is_empty() {
        return true;
    }
    if folded_case_text.contains(&folded_name) {
        return true;
    }
    match folded_name.rsplit(' ').next() {
        Some(last_token) if !last_token.is_empty() => folded_case_text.contains(last_token),
        _ => false,
    }
}

/// Returns the first name from `target` that fails coverage, if any.
pub fn first_uncovered_name(target: &TargetNode, case_text: &str) -> Option<String> {
    let folded_case_text = fold(case_text);
    names_in_target(target)
        .into_iter()
        .find(|name| !name_is_covered(name, &folded_case_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(pairs: Vec<(&str, TargetNode)>) -> TargetNode {
        TargetNode::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn names_in_target_collects_nom_suffixed_leaves() {
        let tree = obj(vec![(
            "defunt",
            obj(vec![("nom", TargetNode::Leaf(TargetValue::String("Jean Dupont".into())))]),
        )]);
        assert_eq!(names_in_target(&tree), vec!["Jean Dupont".to_string()]);
    }

    #[test]
    fn name_is_covered_accepts_diacritic_and_case_variance() {
        assert!(name_is_covered("Véronique Dupont", "the text mentions veronique dupont here"));
    }

    #[test]
    fn name_is_covered_accepts_partial_last_name() {
        assert!(name_is_covered("Jean-Baptiste Dupont", "we spoke with mr dupont yesterday"));
    }

    #[test]
    fn first_uncovered_name_reports_missing_name() {
        let tree = obj(vec![("nom", TargetNode::Leaf(TargetValue::String("Camille Petit".into())))]);
        assert_eq!(first_uncovered_name(&tree, "no names here"), Some("Camille Petit".to_string()));
        assert_eq!(first_uncovered_name(&tree, "camille petit is mentioned"), None);
    }
}
