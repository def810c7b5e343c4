//! Data tables driving the generator: which schema root subtrees a
//! persona or topic entails, and which prompt clause a hard-negative
//! mode/intensity pair injects. Kept as plain data rather than branches
//! scattered through the pipeline, per the project's decision to model
//! persona anchors and hard-negative instructions as lookup tables.
//!
//! The master schema is loaded externally and its exact root key names
//! are not known at compile time, so root subtrees are matched by name
//! against this vocabulary rather than addressed by a fixed path.

use corpus_core::{Complexity, HardNegativeIntensity, HardNegativeMode, Persona, Topic};

/// The decedent identity subtree: always present.
pub const IDENTITY_ROOT: &str = "defunt";

/// The surviving spouse/partner identity subtree, present when the
/// decedent's marital status requires it.
pub const PARTNER_ROOT: &str = "conjoint_survivant";

/// The children list, mandatory for child-adjacent personas.
pub const CHILDREN_ROOT: &str = "enfants";

/// Root subtrees a given persona logically entails beyond the base
/// identity subtree, with the minimum number of list instances to
/// populate when the target is a list.
pub fn persona_anchor_roots(persona: Persona) -> &'static [(&'static str, usize)] {
    match persona {
        Persona::Enfant | Persona::BeauEnfant | Persona::PetitEnfant => {
            &[(CHILDREN_ROOT, 1)]
        }
        Persona::ConjointSurvivant | Persona::PartenairePacs | Persona::Concubin => {
            &[(PARTNER_ROOT, 1)]
        }
        Persona::Notaire => &[("observateur_professionnel", 1)],
        Persona::AssocieProfessionnel => &[("entreprise_associee", 1)],
    }
}

/// Root subtree names associated with a topic, by substring alias. The
/// first alias present as a direct root child of the loaded schema wins.
pub fn topic_root_aliases(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::RegimesMatrimoniaux => &["regime_matrimonial", "regimes_matrimoniaux"],
        Topic::AssuranceVie => &["contrats_assurance_vie", "assurance_vie"],
        Topic::Donation => &["donations", "donation"],
        Topic::PacteDutreil => &["entreprises_dutreil", "pacte_dutreil", "entreprises"],
        Topic::Indivision => &["biens_indivis", "indivision"],
        Topic::Legs => &["legataires", "legs"],
        Topic::Usufruit => &["usufruits", "usufruit"],
    }
}

/// Minimum list instances a topic's mandatory subtree requires when the
/// matched root is a list (e.g. at least one life-insurance contract).
pub fn topic_minimum_instances(topic: Topic) -> usize {
    match topic {
        Topic::RegimesMatrimoniaux => 0, // an object subtree, not a list
        _ => 1,
    }
}

/// Probability that an optional leaf under an active topic subtree is
/// included, rising with complexity (more detail at higher complexity).
pub fn topic_leaf_inclusion_probability(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Simple => 0.35,
        Complexity::Complexe => 0.6,
        Complexity::HardNegative => 0.6,
    }
}

/// Probability of sprinkling a leaf from an unrelated, not-otherwise-active
/// root subtree, modeling a multi-layer estate situation.
pub const CROSS_TOPIC_SPRINKLE_PROBABILITY: f64 = 0.08;

/// The prompt clause injected for a given hard-negative mode/intensity
/// pair. Only consulted when `complexity = hard_negative`.
pub fn hard_negative_clause(mode: HardNegativeMode, intensity: HardNegativeIntensity) -> &'static str {
    match (mode, intensity) {
        (HardNegativeMode::Ambiguite, HardNegativeIntensity::Leger) => {
            "Leave one minor relationship detail slightly unclear without contradicting the facts."
        }
        (HardNegativeMode::Ambiguite, HardNegativeIntensity::Modere) => {
            "Phrase at least one key relationship or date vaguely enough that it could be read two ways."
        }
        (HardNegativeMode::Ambiguite, HardNegativeIntensity::Fort) => {
            "Make the narrator's own relationship to the decedent genuinely ambiguous throughout the text."
        }
        (HardNegativeMode::Contradiction, HardNegativeIntensity::Leger) => {
            "Introduce one small inconsistency between two mentions of the same minor fact."
        }
        (HardNegativeMode::Contradiction, HardNegativeIntensity::Modere) => {
            "State a date or amount once, then restate it differently later in the text."
        }
        (HardNegativeMode::Contradiction, HardNegativeIntensity::Fort) => {
            "Contradict a central fact (a name, a date, or a monetary amount) between two passages."
        }
        (HardNegativeMode::IndicesManquants, HardNegativeIntensity::Leger) => {
            "Omit one minor supporting detail an attentive reader would expect."
        }
        (HardNegativeMode::IndicesManquants, HardNegativeIntensity::Modere) => {
            "Leave out a detail needed to fully resolve one of the secondary facts."
        }
        (HardNegativeMode::IndicesManquants, HardNegativeIntensity::Fort) => {
            "Withhold enough context that a key fact can only be guessed at, not confirmed."
        }
    }
}
