//! Assembles the text-generation prompt shown to the agent from the
//! drawn signature. The prompt never names schema keys or enum codes —
//! those are exactly what the submission validator's leakage check
//! rejects if they appear in the agent's prose.

use crate::vocabulary::hard_negative_clause;
use corpus_core::{Format, LengthBand, NarrativeVoice, Noise, Persona, Signature};

fn persona_phrase(persona: Persona) -> &'static str {
    match persona {
        Persona::Enfant => "a child of the deceased",
        Persona::ConjointSurvivant => "the surviving spouse",
        Persona::PartenairePacs => "the deceased's civil-union partner",
        Persona::Concubin => "the deceased's unmarried partner",
        Persona::PetitEnfant => "a grandchild of the deceased",
        Persona::BeauEnfant => "a stepchild of the deceased",
        Persona::Notaire => "the notary handling the estate",
        Persona::AssocieProfessionnel => "a business associate of the deceased",
    }
}

fn voice_phrase(voice: NarrativeVoice) -> &'static str {
    match voice {
        NarrativeVoice::PremierePersonne => "written in the first person",
        NarrativeVoice::TroisiemePersonne => "written in the third person",
        NarrativeVoice::RecitNotarial => "written in a formal notarial register",
    }
}

fn format_phrase(format: Format) -> &'static str {
    match format {
        Format::RecitLibre => "a free-form narrative account",
        Format::ListeAPuces => "a bulleted list of facts",
        Format::Courriel => "an email to an advisor",
        Format::NoteInterne => "an internal case note",
    }
}

fn length_phrase(band: LengthBand) -> &'static str {
    match band {
        LengthBand::Court => "short, a few sentences",
        LengthBand::Moyen => "medium length, a couple of paragraphs",
        LengthBand::Long => "long and detailed, several paragraphs",
    }
}

fn noise_phrase(noise: Noise) -> &'static str {
    match noise {
        Noise::Aucun => "clean and focused, no digressions",
        Noise::Leger => "with a few minor asides that don't affect the facts",
        Noise::Important => "with noticeable digressions and tangents surrounding the facts",
    }
}

pub fn build_prompt(signature: &Signature) -> String {
    let mut sections = vec![
        format!(
            "Write a case narrative from the point of view of {}, {}.",
            persona_phrase(signature.persona),
            voice_phrase(signature.narrative_voice)
        ),
        format!(
            "Present it as {}, {}, and {}.",
            format_phrase(signature.format),
            length_phrase(signature.length_band),
            noise_phrase(signature.noise)
        ),
        "Cover every fact below naturally in prose; do not use bullet-point field names or internal codes."
            .to_string(),
    ];

    if let (Some(mode), Some(intensity)) = (signature.hard_negative_mode, signature.hard_negative_intensity) {
        sections.push(hard_negative_clause(mode, intensity).to_string());
    }

    sections.join(" ")
}
