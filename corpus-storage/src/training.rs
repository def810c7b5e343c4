//! Builds rows for the two Mistral-chat-format training exports:
//! `generated_cases_train_mistral.jsonl` (synthetic submissions only,
//! appended) and `full_training_cases_mistral.jsonl` (seed corpus plus
//! synthetic, rewritten wholesale on each submission).

use corpus_core::InstructionRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRow {
    pub messages: Vec<ChatMessage>,
}

/// User content is the generation prompt wrapped around the agent's
/// case text; assistant content is the locked TOON target, per §4.6.
pub fn synthetic_training_row(instruction: &InstructionRecord, case_text: &str) -> TrainingRow {
    TrainingRow {
        messages: vec![
            ChatMessage {
                role: "user".to_string(),
                content: format!("{}\n\n{}", instruction.prompt, case_text),
            },
            ChatMessage {
                role: "assistant".to_string(),
                content: instruction.server_target_toon.clone(),
            },
        ],
    }
}

/// Seed-corpus rows carry only free text with no locked target, so they
/// enter the merged export as a bare assistant turn.
pub fn seed_training_row(text: &str) -> TrainingRow {
    TrainingRow {
        messages: vec![ChatMessage {
            role: "assistant".to_string(),
            content: text.to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use corpus_core::{Complexity, DatePrecision, Format, InstructionId, LengthBand, NarrativeVoice, Noise, NumericDensity, Persona, Signature, Topic};

    fn sample_signature() -> Signature {
        Signature {
            persona: Persona::Enfant,
            narrative_voice: NarrativeVoice::PremierePersonne,
            format: Format::RecitLibre,
            length_band: LengthBand::Moyen,
            noise: Noise::Aucun,
            numeric_density: NumericDensity::Faible,
            date_precision: DatePrecision::Exacte,
            complexity: Complexity::Simple,
            primary_topic: Topic::Donation,
            secondary_topic: None,
            hard_negative_mode: None,
            hard_negative_intensity: None,
        }
    }

    #[test]
    fn synthetic_training_row_wraps_prompt_and_case_text() {
        let instruction = InstructionRecord {
            instruction_id: InstructionId(1),
            agent_id: None,
            signature: sample_signature(),
            server_target_toon: "toon-payload".to_string(),
            prompt: "Write a narrative.".to_string(),
            must_include: vec![],
            must_avoid: vec![],
            issued_at: Utc::now(),
            submitted: false,
        };
        let row = synthetic_training_row(&instruction, "Jean Dupont passed away.");
        assert_eq!(row.messages.len(), 2);
        assert!(row.messages[0].content.contains("Write a narrative."));
        assert!(row.messages[0].content.contains("Jean Dupont"));
        assert_eq!(row.messages[1].content, "toon-payload");
    }
}
