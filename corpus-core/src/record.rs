//! Instruction/submission record types and the axis/bucket counters.
//!
//! Instructions are created by the scheduler, marked submitted exactly
//! once, and never mutated afterwards; persistence is an append-only
//! log-and-rename pattern regardless of the record's shape.

use crate::axes::AxisId;
use crate::Signature;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A monotonically increasing instruction identifier with a stable,
/// zero-padded textual prefix (`INS-0001`, `INS-0002`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionId(pub u64);

impl InstructionId {
    pub const PREFIX: &'static str = "INS";

    pub fn first() -> Self {
        InstructionId(1)
    }

    #[must_use]
    pub fn next(self) -> Self {
        InstructionId(self.0 + 1)
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:04}", Self::PREFIX, self.0)
    }
}

/// Error returned when a textual instruction id does not match the
/// `PREFIX-dddd` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionIdParseError(pub String);

impl fmt::Display for InstructionIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid instruction id", self.0)
    }
}

impl std::error::Error for InstructionIdParseError {}

impl FromStr for InstructionId {
    type Err = InstructionIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suffix = s
            .strip_prefix(Self::PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(|| InstructionIdParseError(s.to_string()))?;
        suffix
            .parse::<u64>()
            .map(InstructionId)
            .map_err(|_| InstructionIdParseError(s.to_string()))
    }
}

/// A soft similarity flag attached to a submission: the Jaccard
/// shingle similarity met or exceeded the configured threshold against
/// a prior submission. Non-fatal — recorded, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWarning {
    pub score: f64,
    pub matched_instruction_id: InstructionId,
}

/// Outcome of running the submission validator against one `case_text`,
/// persisted alongside the submission for auditability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub name_coverage_passed: bool,
    pub leakage_passed: bool,
    pub similarity_warning: Option<SimilarityWarning>,
}

/// An issued generation instruction. Immutable once created, except for
/// the `submitted` flag which flips exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionRecord {
    pub instruction_id: InstructionId,
    pub agent_id: Option<String>,
    pub signature: Signature,
    /// The locked, TOON-encoded structured target — the single source
    /// of truth a submission is checked against.
    pub server_target_toon: String,
    pub prompt: String,
    pub must_include: Vec<String>,
    pub must_avoid: Vec<String>,
    pub issued_at: DateTime<Utc>,
    pub submitted: bool,
}

/// The agent-supplied text accepted for one instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub instruction_id: InstructionId,
    pub agent_id: Option<String>,
    pub case_text: String,
    pub signature: Signature,
    pub validation: ValidationOutcome,
    pub submitted_at: DateTime<Utc>,
}

/// Per-axis, per-bucket issuance counters plus the scalar `issued` and
/// `submitted` totals. `BTreeMap` keys (bucket strings) keep
/// `counters.json` diff-friendly and iteration order deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub issued: u64,
    pub submitted: u64,
    #[serde(default)]
    pub axis_buckets: BTreeMap<AxisId, BTreeMap<String, u64>>,
}

impl Counters {
    pub fn bucket_count(&self, axis: AxisId, bucket: &str) -> u64 {
        self.axis_buckets
            .get(&axis)
            .and_then(|buckets| buckets.get(bucket))
            .copied()
            .unwrap_or(0)
    }

    pub fn increment_bucket(&mut self, axis: AxisId, bucket: &str) {
        *self
            .axis_buckets
            .entry(axis)
            .or_default()
            .entry(bucket.to_string())
            .or_insert(0) += 1;
    }

    pub fn remaining(&self, generation_target: u64) -> u64 {
        generation_target.saturating_sub(self.issued)
    }
}

// `BTreeMap<AxisId, _>` needs `AxisId` to be an ordered map key; derive
// that here rather than on the enum definition, since ordering is only
// needed for this one serialization concern.
impl PartialOrd for AxisId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for AxisId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_id_formats_with_zero_padded_prefix() {
        assert_eq!(InstructionId(1).to_string(), "INS-0001");
        assert_eq!(InstructionId(42).to_string(), "INS-0042");
    }

    #[test]
    fn instruction_id_round_trips_through_display_and_from_str() {
        let id = InstructionId(123);
        assert_eq!(InstructionId::from_str(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn instruction_id_rejects_malformed_strings() {
        assert!(InstructionId::from_str("INS-abc").is_err());
        assert!(InstructionId::from_str("nope").is_err());
    }

    #[test]
    fn counters_increment_and_remaining() {
        let mut c = Counters::default();
        c.increment_bucket(AxisId::Persona, "enfant");
        c.increment_bucket(AxisId::Persona, "enfant");
        c.issued = 2;
        assert_eq!(c.bucket_count(AxisId::Persona, "enfant"), 2);
        assert_eq!(c.remaining(10), 8);
    }

    proptest::proptest! {
        #[test]
        fn instruction_id_round_trips_for_any_u64(n: u64) {
            let id = InstructionId(n);
            prop_assert_eq!(InstructionId::from_str(&id.to_string()).unwrap(), id);
        }
    }
}
