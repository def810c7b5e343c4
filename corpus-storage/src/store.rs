//! The coordinator's persistence façade: one `Store` bound to a state
//! directory, used under the single-writer lock described in the
//! concurrency model. `Store` itself does no locking — the caller
//! (`corpus-api`'s `CoordinatorState`) holds the `tokio::sync::Mutex`
//! and calls these methods from inside the critical section.

use crate::atomic::{append_line_fsync, write_atomic, write_atomic_json};
use crate::error::StorageError;
use crate::jsonl;
use crate::paths::StatePaths;
use crate::seed::{load_seed_corpus, SeedRow};
use crate::summary::{build_snapshot, render_markdown, DashboardSnapshot};
use crate::training::{seed_training_row, synthetic_training_row, TrainingRow};
use corpus_core::{AxisShares, Counters, InstructionId, InstructionRecord, SubmissionRecord};
use std::path::Path;

pub struct Store {
    paths: StatePaths,
}

impl Store {
    pub fn open(state_dir: &Path) -> Result<Self, StorageError> {
        let paths = StatePaths::new(state_dir);
        for dir in [paths.root(), &paths.instructions_dir(), &paths.submissions_dir()] {
            std::fs::create_dir_all(dir).map_err(|source| StorageError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        Ok(Store { paths })
    }

    /// Commits a newly issued instruction: log append, then the
    /// per-record audit copy. Called inside the single-writer section,
    /// after counters have already been bumped in memory.
    pub fn append_issued_instruction(&self, record: &InstructionRecord) -> Result<(), StorageError> {
        let line = serde_json::to_string(record).map_err(StorageError::Serialize)?;
        append_line_fsync(&self.paths.issued_instructions_log(), &line)?;
        write_atomic_json(&self.paths.instruction_file(record.instruction_id), record)?;
        Ok(())
    }

    /// Commits an accepted submission: log append, per-record audit
    /// copy, training-export append, and a wholesale rewrite of the
    /// merged training export.
    pub fn append_submission(
        &self,
        record: &SubmissionRecord,
        instruction: &InstructionRecord,
        seed_rows: &[SeedRow],
    ) -> Result<(), StorageError> {
        let line = serde_json::to_string(record).map_err(StorageError::Serialize)?;
        append_line_fsync(&self.paths.generated_cases_log(), &line)?;
        write_atomic_json(&self.paths.submission_file(record.instruction_id), record)?;

        let training_row = synthetic_training_row(instruction, &record.case_text);
        let training_line = serde_json::to_string(&training_row).map_err(StorageError::Serialize)?;
        append_line_fsync(&self.paths.train_mistral_log(), &training_line)?;

        self.rewrite_full_training_export(seed_rows)?;
        Ok(())
    }

    /// Rebuilds `full_training_cases_mistral.jsonl` from the seed rows
    /// plus every accepted synthetic submission logged so far.
    fn rewrite_full_training_export(&self, seed_rows: &[SeedRow]) -> Result<(), StorageError> {
        let synthetic: Vec<TrainingRow> = jsonl::read_all(&self.paths.train_mistral_log())?;
        let mut body = String::new();
        for row in seed_rows {
            body.push_str(&serde_json::to_string(&seed_training_row(&row.text)).map_err(StorageError::Serialize)?);
            body.push('\n');
        }
        for row in &synthetic {
            body.push_str(&serde_json::to_string(row).map_err(StorageError::Serialize)?);
            body.push('\n');
        }
        write_atomic(&self.paths.full_training_cases(), body.as_bytes())
    }

    pub fn load_counters(&self) -> Result<Counters, StorageError> {
        match std::fs::read(self.paths.counters_file()) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StorageError::MalformedJson {
                path: self.paths.counters_file(),
                line: 1,
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Counters::default()),
            Err(source) => Err(StorageError::Read {
                path: self.paths.counters_file(),
                source,
            }),
        }
    }

    pub fn save_counters(&self, counters: &Counters) -> Result<(), StorageError> {
        write_atomic_json(&self.paths.counters_file(), counters)
    }

    pub fn write_summary(
        &self,
        counters: &Counters,
        target_total: u64,
        generation_target: u64,
        shares: &AxisShares,
    ) -> Result<DashboardSnapshot, StorageError> {
        let snapshot = build_snapshot(counters, target_total, generation_target, shares);
        write_atomic_json(&self.paths.summary_json(), &snapshot)?;
        write_atomic(&self.paths.summary_md(), render_markdown(&snapshot).as_bytes())?;
        Ok(snapshot)
    }

    /// Loads every instruction issued so far, replaying
    /// `issued_instructions.jsonl` and overlaying `submitted = true` for
    /// every id that also appears in `generated_cases.jsonl`. Used at
    /// startup to answer "does this instruction exist / was it already
    /// submitted" without keeping a separate index file.
    ///
    /// Rows from a pre-rewrite log layout are sanitized away rather than
    /// failing the whole load: any row missing a non-empty
    /// `server_target_toon` string, or carrying its target under a
    /// legacy field name, is dropped.
    pub fn load_instruction_table(&self) -> Result<Vec<InstructionRecord>, StorageError> {
        let raw_rows: Vec<serde_json::Value> = jsonl::read_all(&self.paths.issued_instructions_log())?;
        let mut instructions = Vec::with_capacity(raw_rows.len());
        for row in raw_rows {
            let has_valid_target = row
                .get("server_target_toon")
                .and_then(|v| v.as_str())
                .is_some_and(|s| !s.is_empty());
            if !has_valid_target {
                continue;
            }
            match serde_json::from_value::<InstructionRecord>(row) {
                Ok(record) => instructions.push(record),
                Err(_) => continue,
            }
        }

        let submissions: Vec<SubmissionRecord> = jsonl::read_all(&self.paths.generated_cases_log())?;
        let submitted_ids: std::collections::HashSet<InstructionId> =
            submissions.iter().map(|s| s.instruction_id).collect();
        for instruction in &mut instructions {
            if submitted_ids.contains(&instruction.instruction_id) {
                instruction.submitted = true;
            }
        }
        Ok(instructions)
    }

    /// Rebuilds counters from the two append-only logs rather than
    /// trusting whatever `counters.json` last held, so a crash between
    /// the log fsync and the counters rewrite self-heals on restart.
    /// `seed_count` (the number of rows loaded from the seed corpus) is
    /// folded into `submitted` here, since the seed corpus counts toward
    /// the submitted total from startup onward.
    pub fn reconcile_counters(&self, seed_count: u64) -> Result<Counters, StorageError> {
        let instructions = self.load_instruction_table()?;
        let mut counters = Counters::default();
        counters.issued = instructions.len() as u64;
        counters.submitted = instructions.iter().filter(|i| i.submitted).count() as u64 + seed_count;
        for instruction in &instructions {
            for axis in corpus_core::AxisId::ALL {
                if let Some(bucket) = instruction.signature.bucket(axis) {
                    counters.increment_bucket(axis, bucket.as_str());
                }
            }
        }
        self.save_counters(&counters)?;
        tracing::info!(issued = counters.issued, submitted = counters.submitted, "counters reconciled from logs");
        Ok(counters)
    }

    /// Deletes legacy single-shot "last instruction" files that predate
    /// the per-id `instructions/<id>.json` layout, if present.
    pub fn delete_stale_legacy_files(&self) -> Result<(), StorageError> {
        for name in ["last_instruction.json", "latest_target.json"] {
            let path = self.paths.root().join(name);
            if path.exists() {
                std::fs::remove_file(&path).map_err(|source| StorageError::Write { path, source })?;
            }
        }
        Ok(())
    }

    pub fn load_seed_corpus(&self, path: &Path) -> Result<Vec<SeedRow>, StorageError> {
        load_seed_corpus(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use corpus_core::{
        Complexity, DatePrecision, Format, LengthBand, NarrativeVoice, Noise, NumericDensity, Persona, Signature,
        Topic, ValidationOutcome,
    };
    use tempfile::tempdir;

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

    fn sample_instruction(id: u64) -> InstructionRecord {
        InstructionRecord {
            instruction_id: InstructionId(id),
            agent_id: None,
            signature: sample_signature(),
            server_target_toon: "toon-payload".to_string(),
            prompt: "Write a narrative.".to_string(),
            must_include: vec!["Jean Dupont".to_string()],
            must_avoid: vec![],
            issued_at: Utc::now(),
            submitted: false,
        }
    }

    #[test]
    fn load_instruction_table_drops_rows_with_a_legacy_or_empty_target() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store.append_issued_instruction(&sample_instruction(1)).unwrap();

        let log = store.paths.issued_instructions_log();
        append_line_fsync(&log, r#"{"instruction_id":"INS-0002","target":"legacy-field-name"}"#).unwrap();
        append_line_fsync(&log, r#"{"instruction_id":"INS-0003","server_target_toon":""}"#).unwrap();

        let instructions = store.load_instruction_table().unwrap();
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].instruction_id, InstructionId(1));
    }

    #[test]
    fn append_issued_instruction_writes_log_and_record_file() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let instruction = sample_instruction(1);
        store.append_issued_instruction(&instruction).unwrap();

        let logged: Vec<InstructionRecord> = jsonl::read_all(&store.paths.issued_instructions_log()).unwrap();
        assert_eq!(logged.len(), 1);
        assert!(store.paths.instruction_file(InstructionId(1)).exists());
    }

    #[test]
    fn reconcile_counters_rebuilds_from_logs_without_trusting_counters_json() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store.append_issued_instruction(&sample_instruction(1)).unwrap();
        store.append_issued_instruction(&sample_instruction(2)).unwrap();

        let submission = SubmissionRecord {
            instruction_id: InstructionId(1),
            agent_id: None,
            case_text: "Jean Dupont passed away.".to_string(),
            signature: sample_signature(),
            validation: ValidationOutcome {
                name_coverage_passed: true,
                leakage_passed: true,
                similarity_warning: None,
            },
            submitted_at: Utc::now(),
        };
        store
            .append_submission(&submission, &sample_instruction(1), &[])
            .unwrap();

        let counters = store.reconcile_counters(0).unwrap();
        assert_eq!(counters.issued, 2);
        assert_eq!(counters.submitted, 1);
        assert_eq!(counters.bucket_count(corpus_core::AxisId::Persona, "enfant"), 2);
    }

    #[test]
    fn reconcile_counters_folds_the_seed_corpus_into_submitted() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store.append_issued_instruction(&sample_instruction(1)).unwrap();

        let counters = store.reconcile_counters(7).unwrap();
        assert_eq!(counters.issued, 1);
        assert_eq!(counters.submitted, 7);
    }

    #[test]
    fn full_training_export_merges_seed_rows_and_synthetic_submissions() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let instruction = sample_instruction(1);
        store.append_issued_instruction(&instruction).unwrap();

        let submission = SubmissionRecord {
            instruction_id: InstructionId(1),
            agent_id: None,
            case_text: "Jean Dupont passed away.".to_string(),
            signature: sample_signature(),
            validation: ValidationOutcome {
                name_coverage_passed: true,
                leakage_passed: true,
                similarity_warning: None,
            },
            submitted_at: Utc::now(),
        };
        let seed_rows = vec![SeedRow {
            text: "a pre-existing seed case".to_string(),
        }];
        store.append_submission(&submission, &instruction, &seed_rows).unwrap();

        let merged = std::fs::read_to_string(store.paths.full_training_cases()).unwrap();
        assert!(merged.contains("a pre-existing seed case"));
        assert!(merged.contains("toon-payload"));
    }
}
