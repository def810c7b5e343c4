//! Compatibility predicates applied before bucket selection, and the
//! secondary-topic sampling policy. Kept as small free functions rather
//! than inline branches in the scheduler's draw loop so each rule reads
//! as a single named fact.

use corpus_core::{Complexity, DatePrecision, NumericDensity, Persona, Topic};

/// Topics that require a surviving spouse/partner to liquidate a
/// matrimonial regime; incompatible with personas that are not the
/// decedent's legal spouse. Only `regimes_matrimoniaux` qualifies today.
pub const SPOUSAL_LIQUIDATION_TOPICS: &[Topic] = &[Topic::RegimesMatrimoniaux];

/// Personas for whom a spousal-liquidation topic is nonsensical: a PACS
/// partner or a concubine has no matrimonial regime to liquidate.
pub const NON_SPOUSAL_PERSONAS: &[Persona] = &[Persona::PartenairePacs, Persona::Concubin];

/// Whether `topic` may be drawn as a primary or secondary topic given
/// the already-drawn persona.
pub fn topic_allowed_for_persona(topic: Topic, persona: Persona) -> bool {
    if NON_SPOUSAL_PERSONAS.contains(&persona) && SPOUSAL_LIQUIDATION_TOPICS.contains(&topic) {
        return false;
    }
    true
}

/// Whether hard-negative mode/intensity may be drawn at all: only
/// meaningful when `complexity = hard_negative`.
pub fn hard_negative_applicable(complexity: Complexity) -> bool {
    complexity == Complexity::HardNegative
}

/// Whether `precision` may be drawn given the already-drawn numeric
/// density: a numeric-heavy signature (`montants_et_dates`) restricts
/// date precision to {approx, exacte} — a dense-numeric narrative with
/// no dates at all reads as incoherent.
pub fn date_precision_allowed_for_numeric_density(
    precision: DatePrecision,
    numeric_density: NumericDensity,
) -> bool {
    if numeric_density == NumericDensity::MontantsEtDates {
        return precision != DatePrecision::Absente;
    }
    true
}

/// Probability of drawing a secondary topic at all, rising with
/// complexity: rare for `simple`, common for `complexe`/`hard_negative`.
pub fn secondary_topic_probability(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Simple => 0.1,
        Complexity::Complexe => 0.5,
        Complexity::HardNegative => 0.65,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_spousal_persona_excludes_matrimonial_regime_topic() {
        assert!(!topic_allowed_for_persona(
            Topic::RegimesMatrimoniaux,
            Persona::Concubin
        ));
        assert!(topic_allowed_for_persona(Topic::AssuranceVie, Persona::Concubin));
    }

    #[test]
    fn spousal_persona_allows_matrimonial_regime_topic() {
        assert!(topic_allowed_for_persona(
            Topic::RegimesMatrimoniaux,
            Persona::ConjointSurvivant
        ));
    }

    #[test]
    fn dense_numeric_signature_excludes_absent_date_precision() {
        assert!(!date_precision_allowed_for_numeric_density(
            DatePrecision::Absente,
            NumericDensity::MontantsEtDates
        ));
        assert!(date_precision_allowed_for_numeric_density(
            DatePrecision::Exacte,
            NumericDensity::MontantsEtDates
        ));
        assert!(date_precision_allowed_for_numeric_density(
            DatePrecision::Absente,
            NumericDensity::Faible
        ));
    }

    #[test]
    fn secondary_topic_probability_rises_with_complexity() {
        assert!(
            secondary_topic_probability(Complexity::Simple)
                < secondary_topic_probability(Complexity::Complexe)
        );
        assert!(
            secondary_topic_probability(Complexity::Complexe)
                <= secondary_topic_probability(Complexity::HardNegative)
        );
    }
}
