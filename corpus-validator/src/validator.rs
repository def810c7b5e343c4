//! Orchestrates the submission checks from §4.5 against an already
//! decoded, locked target: instruction-state and client-target checks
//! are the caller's responsibility (they require the instruction
//! table), but are exposed here too since the spec names them as
//! validator duties.

use crate::coverage::first_uncovered_name;
use crate::error::ValidationError;
use crate::leakage::first_leaked_token;
use crate::similarity::SimilarityWindow;
use corpus_core::{InstructionId, SimilarityWarning, TargetNode, ValidationOutcome};
use serde_json::Value;

/// Keys that must never appear in a raw submission body: their
/// presence means the client tried to supply its own target rather
/// than letting the server's locked one stand as the source of truth.
const FORBIDDEN_BODY_KEYS: &[&str] = &["target", "server_target_toon", "target_toon", "payload"];

pub fn reject_client_supplied_target(raw_body: &Value) -> Result<(), ValidationError> {
    if let Some(map) = raw_body.as_object() {
        for key in FORBIDDEN_BODY_KEYS {
            if map.contains_key(*key) {
                return Err(ValidationError::ClientSuppliedTarget);
            }
        }
    }
    Ok(())
}

/// Runs leakage and name-coverage (both hard rejections) against
/// `case_text`, then the soft similarity check, and returns the
/// resulting [`ValidationOutcome`] for the submission record.
pub fn validate_case_text(
    target: &TargetNode,
    case_text: &str,
    instruction_id: InstructionId,
    similarity_window: &SimilarityWindow,
) -> Result<ValidationOutcome, ValidationError> {
    if let Some(token) = first_leaked_token(case_text) {
        return Err(ValidationError::Leakage(token.to_string()));
    }

    if let Some(missing) = first_uncovered_name(target, case_text) {
        return Err(ValidationError::MissingName(missing));
    }

    let similarity_warning = similarity_window
        .check(&instruction_id.to_string(), case_text)
        .map(|(matched_id, score)| {
            tracing::warn!(%instruction_id, matched_id, score, "near-duplicate submission");
            SimilarityWarning {
                score,
                matched_instruction_id: matched_id.parse().unwrap_or(instruction_id),
            }
        });

    Ok(ValidationOutcome {
        name_coverage_passed: true,
        leakage_passed: true,
        similarity_warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_core::TargetValue;
    use serde_json::json;

    #[test]
    fn reject_client_supplied_target_flags_forbidden_key() {
        let body = json!({"instruction_id": "INS-0001", "case_text": "...", "target": {"nom": "x"}});
        assert!(reject_client_supplied_target(&body).is_err());
    }

    #[test]
    fn reject_client_supplied_target_allows_clean_body() {
        let body = json!({"instruction_id": "INS-0001", "case_text": "..."});
        assert!(reject_client_supplied_target(&body).is_ok());
    }

    #[test]
    fn validate_case_text_rejects_leakage_before_coverage() {
        let target = TargetNode::Object(
            [("nom".to_string(), TargetNode::Leaf(TargetValue::String("Jean Dupont".into())))]
                .into_iter()
                .collect(),
        );
        let window = SimilarityWindow::new(10, 0.9);
        let err = validate_case_text(&target, "mentions ASSURANCE_VIE explicitly", InstructionId(1), &window)
            .unwrap_err();
        assert!(matches!(err, ValidationError::Leakage(_)));
    }

    #[test]
    fn validate_case_text_accepts_covered_clean_text() {
        let target = TargetNode::Object(
            [("nom".to_string(), TargetNode::Leaf(TargetValue::String("Jean Dupont".into())))]
                .into_iter()
                .collect(),
        );
        let window = SimilarityWindow::new(10, 0.9);
        let outcome = validate_case_text(&target, "Jean Dupont passed away last spring.", InstructionId(1), &window)
            .unwrap();
        assert!(outcome.name_coverage_passed);
        assert!(outcome.similarity_warning.is_none());
    }
}
