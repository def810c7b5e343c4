//! The target-generation pipeline: mandatory identity, persona anchors,
//! topic blocks, cross-topic sprinkle, typed values, business-invariant
//! repair, the four validation gates, and TOON serialization with a
//! round-trip check. Each attempt is independent; failures restart from
//! the top, up to `max_attempts`.

use crate::builder::{build_subtree, merge_into_root, resolve_root_alias};
use crate::error::GeneratorError;
use crate::gates::{coherence_gate, schema_gate, sparse_gate, topic_alignment_gate};
use crate::prompt::build_prompt;
use crate::repair::{
    repair_donor_beneficiary_distinct, repair_identity_dates, repair_insured_name_matches_decedent,
    repair_widowed_has_no_partner,
};
use crate::vocabulary::{
    persona_anchor_roots, topic_leaf_inclusion_probability, topic_minimum_instances, topic_root_aliases,
    CROSS_TOPIC_SPRINKLE_PROBABILITY, IDENTITY_ROOT, PARTNER_ROOT,
};
use chrono::Utc;
use corpus_codec::ToonCodec;
use corpus_core::{PathSegment, Signature, TargetNode, TargetValue, Topic};
use corpus_schema::SchemaIndex;
use rand::Rng;

const WIDOWED_TOKENS: &[&str] = &["veuf", "veuve", "widowed"];

/// The outcome of a successful generation attempt: the validated
/// payload, its TOON encoding, and the material the instruction record
/// exposes to the agent.
pub struct GeneratedTarget {
    pub payload: TargetNode,
    pub server_target_toon: String,
    pub prompt: String,
    pub must_include: Vec<String>,
    pub must_avoid: Vec<String>,
}

pub struct TargetGenerator<'a> {
    schema: &'a SchemaIndex,
    codec: &'a ToonCodec,
    max_attempts: u32,
}

impl<'a> TargetGenerator<'a> {
    pub fn new(schema: &'a SchemaIndex, codec: &'a ToonCodec, max_attempts: u32) -> Self {
        TargetGenerator { schema, codec, max_attempts }
    }

    pub async fn generate(
        &self,
        signature: &Signature,
        rng: &mut impl Rng,
    ) -> Result<GeneratedTarget, GeneratorError> {
        for _ in 0..self.max_attempts {
            let Some(mut root) = self.build_candidate(signature, rng) else {
                continue;
            };

            self.repair(&mut root, rng);
            root.prune_empty();

            let topics: Vec<Topic> = std::iter::once(signature.primary_topic)
                .chain(signature.secondary_topic)
                .collect();

            if !sparse_gate(&root)
                || !schema_gate(&root, self.schema)
                || !coherence_gate(&root)
                || !topic_alignment_gate(&root, self.schema, &topics)
            {
                continue;
            }

            match self.codec.encode_with_round_trip_check(&root).await {
                Ok(toon) => {
                    let must_include = collect_names(&root);
                    let must_avoid = collect_avoid_patterns(&root);
                    return Ok(GeneratedTarget {
                        prompt: build_prompt(signature),
                        payload: root,
                        server_target_toon: toon,
                        must_include,
                        must_avoid,
                    });
                }
                Err(corpus_codec::CodecError::RoundTripMismatch) => {
                    tracing::debug!("codec round-trip mismatch, retrying generation");
                    continue;
                }
                Err(other) => return Err(GeneratorError::Codec(other)),
            }
        }
        tracing::warn!(attempts = self.max_attempts, "generation attempts exhausted");
        Err(GeneratorError::AttemptsExhausted { attempts: self.max_attempts })
    }

    fn build_candidate(&self, signature: &Signature, rng: &mut impl Rng) -> Option<TargetNode> {
        let reference_death_date = Utc::now().date_naive();
        let mut root = TargetNode::empty_object();

        // 1. Mandatory identity.
        let identity_path = resolve_root_alias(self.schema, &[IDENTITY_ROOT])?;
        let identity = build_subtree(self.schema, &identity_path, reference_death_date, 1.0, 1, rng)?;
        merge_into_root(&mut root, IDENTITY_ROOT, identity);

        // 2. Persona anchors.
        for &(alias, min_instances) in persona_anchor_roots(signature.persona) {
            if let Some(path) = resolve_root_alias(self.schema, &[alias]) {
                if let Some(node) = build_subtree(self.schema, &path, reference_death_date, 1.0, min_instances, rng) {
                    if let PathSegment::Key(key) = path.0.last().cloned().unwrap() {
                        merge_into_root(&mut root, &key, node);
                    }
                }
            }
        }

        // 3. Topic blocks.
        let topics: Vec<Topic> = std::iter::once(signature.primary_topic)
            .chain(signature.secondary_topic)
            .collect();
        for topic in &topics {
            if let Some(path) = resolve_root_alias(self.schema, topic_root_aliases(*topic)) {
                let probability = topic_leaf_inclusion_probability(signature.complexity);
                let min_instances = topic_minimum_instances(*topic);
                if let Some(node) = build_subtree(self.schema, &path, reference_death_date, probability, min_instances, rng) {
                    if let PathSegment::Key(key) = path.0.last().cloned().unwrap() {
                        merge_into_root(&mut root, &key, node);
                    }
                }
            }
        }

        // 4. Cross-topic sprinkle.
        if rng.gen_bool(CROSS_TOPIC_SPRINKLE_PROBABILITY) {
            let root_children = self.schema.direct_children(&corpus_core::SchemaPath::root());
            let active_keys: std::collections::HashSet<String> = root
                .as_object()
                .map(|m| m.keys().cloned().collect())
                .unwrap_or_default();
            let candidates: Vec<String> = root_children
                .into_iter()
                .filter_map(|seg| match seg {
                    PathSegment::Key(k) if !active_keys.contains(&k) => Some(k),
                    _ => None,
                })
                .collect();
            if !candidates.is_empty() {
                let idx = rng.gen_range(0..candidates.len());
                let key = &candidates[idx];
                let path = corpus_core::SchemaPath::root().child_key(key);
                if let Some(node) = build_subtree(self.schema, &path, reference_death_date, 0.3, 1, rng) {
                    merge_into_root(&mut root, key, node);
                }
            }
        }

        Some(root)
    }

    /// Step 6: business-invariant repair pass.
    fn repair(&self, root: &mut TargetNode, rng: &mut impl Rng) {
        let decedent_name = find_leaf_string(root, |k| k == "nom");
        let is_widowed = find_leaf_string(root, |k| k.contains("statut") && (k.contains("marital") || k.contains("civil")))
            .map(|status| WIDOWED_TOKENS.iter().any(|token| status.to_lowercase().contains(token)))
            .unwrap_or(false);

        let Some(map) = root.as_object_mut() else { return };

        if let Some(identity) = map.get_mut(IDENTITY_ROOT) {
            repair_identity_dates(identity, Utc::now().date_naive());
        }

        for contracts_key in ["contrats_assurance_vie", "assurance_vie"] {
            if let (Some(node), Some(name)) = (map.get_mut(contracts_key), decedent_name.as_deref()) {
                repair_insured_name_matches_decedent(node, name);
            }
        }

        if let Some(donations) = map.get_mut("donations") {
            repair_donor_beneficiary_distinct(donations, rng);
        }

        drop(map);
        repair_widowed_has_no_partner(root, PARTNER_ROOT, is_widowed);
    }
}

fn find_leaf_string(node: &TargetNode, predicate: impl Fn(&str) -> bool) -> Option<String> {
    let mut found = None;
    walk_strings(node, &mut |key, value| {
        if found.is_none() && predicate(key) {
            found = Some(value.to_string());
        }
    });
    found
}

fn walk_strings(node: &TargetNode, visit: &mut dyn FnMut(&str, &str)) {
    match node {
        TargetNode::Object(map) => {
            for (key, child) in map {
                if let TargetNode::Leaf(TargetValue::String(s)) = child {
                    visit(key, s);
                } else {
                    walk_strings(child, visit);
                }
            }
        }
        TargetNode::List(items) => {
            for item in items {
                walk_strings(item, visit);
            }
        }
        TargetNode::Leaf(_) => {}
    }
}

/// Every personal-name value in the target: any leaf whose local key is
/// `nom`, ends in `_nom`, or ends in `_noms`.
fn collect_names(root: &TargetNode) -> Vec<String> {
    let mut names = Vec::new();
    walk_strings(root, &mut |key, value| {
        if key == "nom" || key.ends_with("_nom") || key.ends_with("_noms") {
            if !names.contains(&value.to_string()) {
                names.push(value.to_string());
            }
        }
    });
    names
}

/// Literal schema key names used anywhere in the target: the agent's
/// prose should never contain these verbatim.
fn collect_avoid_patterns(root: &TargetNode) -> Vec<String> {
    let mut path = Vec::new();
    let mut keys = std::collections::BTreeSet::new();
    root.walk_leaves(&mut path, &mut |segments, _value| {
        for segment in segments {
            if segment != "[]" {
                keys.insert(segment.clone());
            }
        }
    });
    keys.into_iter().map(|k| format!(r"\b{k}\b")).collect()
}
