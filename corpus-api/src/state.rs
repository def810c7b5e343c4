//! `CoordinatorState`: the single struct the spec's concurrency model
//! places behind one `tokio::sync::Mutex`, guarding bucket selection,
//! counter increment, instruction-id allocation, log append, and
//! per-instruction file write as one exclusive section. Target
//! generation and TOON encoding run *inside* the lock (across the
//! subprocess `.await`) so counters only ever advance for a target
//! that was actually produced and logged.

use chrono::Utc;
use corpus_core::{Config, Counters, InstructionId, InstructionRecord, SubmissionRecord, ValidationOutcome};
use corpus_generator::TargetGenerator;
use corpus_schema::SchemaIndex;
use corpus_storage::{SeedRow, Store};
use corpus_validator::SimilarityWindow;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("instruction {0} does not exist")]
    UnknownInstruction(String),
    #[error("instruction {0} has already been submitted")]
    AlreadySubmitted(String),
    #[error("generation target of {0} instructions has already been reached")]
    Exhausted(u64),
    #[error(transparent)]
    Scheduling(#[from] corpus_scheduler::SchedulerError),
    #[error(transparent)]
    Validation(#[from] corpus_validator::ValidationError),
    #[error(transparent)]
    Generation(#[from] corpus_generator::GeneratorError),
    #[error(transparent)]
    Codec(#[from] corpus_codec::CodecError),
    #[error(transparent)]
    Storage(#[from] corpus_storage::StorageError),
}

pub struct CoordinatorState {
    pub config: Config,
    pub schema: Arc<SchemaIndex>,
    pub codec: corpus_codec::ToonCodec,
    pub scheduler: corpus_scheduler::Scheduler,
    pub store: Store,
    pub counters: Counters,
    pub similarity_window: SimilarityWindow,
    pub instructions: HashMap<InstructionId, InstructionRecord>,
    pub next_id: InstructionId,
    pub seed_rows: Vec<SeedRow>,
}

impl CoordinatorState {
    /// Draws a signature, generates its target, and commits the
    /// instruction: this whole sequence runs inside the caller's lock
    /// guard, so a failed generation never advances `next_id` or the
    /// counters (the `?` on `generate()` returns before either mutates).
    pub async fn issue_instruction(
        &mut self,
        agent_id: Option<String>,
        rng: &mut impl rand::Rng,
    ) -> Result<InstructionRecord, CoordinatorError> {
        let generation_target = self.config.generation_target_given_seed_count(self.seed_rows.len() as u64);
        if self.counters.issued >= generation_target {
            return Err(CoordinatorError::Exhausted(generation_target));
        }

        let signature = self.scheduler.draw(&self.counters, rng)?;

        let generator = TargetGenerator::new(self.schema.as_ref(), &self.codec, self.config.max_generation_attempts);
        let generated = generator.generate(&signature, rng).await?;

        let instruction_id = self.next_id;
        self.next_id = self.next_id.next();

        let record = InstructionRecord {
            instruction_id,
            agent_id,
            signature: signature.clone(),
            server_target_toon: generated.server_target_toon,
            prompt: generated.prompt,
            must_include: generated.must_include,
            must_avoid: generated.must_avoid,
            issued_at: Utc::now(),
            submitted: false,
        };

        self.store.append_issued_instruction(&record)?;
        self.counters.issued += 1;
        for axis in corpus_core::AxisId::ALL {
            if let Some(bucket) = signature.bucket(axis) {
                self.counters.increment_bucket(axis, bucket.as_str());
            }
        }
        self.scheduler.record_issued(signature);
        self.instructions.insert(instruction_id, record.clone());
        self.persist_dashboard()?;

        Ok(record)
    }

    /// Decodes the locked target and validates `case_text` against it.
    /// Decoding and the regex/name-coverage scans are cheap and run
    /// without holding the exclusive section open any longer than the
    /// commit step requires — the caller is expected to do the decode
    /// before acquiring the lock for the commit half of this method
    /// where that separation matters; this single-process coordinator
    /// keeps it all under one lock for simplicity of the reference
    /// implementation.
    pub async fn submit_case(
        &mut self,
        instruction_id: InstructionId,
        case_text: String,
        agent_id: Option<String>,
    ) -> Result<ValidationOutcome, CoordinatorError> {
        let instruction = self
            .instructions
            .get(&instruction_id)
            .cloned()
            .ok_or_else(|| CoordinatorError::UnknownInstruction(instruction_id.to_string()))?;

        if instruction.submitted {
            return Err(CoordinatorError::AlreadySubmitted(instruction_id.to_string()));
        }

        let target = self.codec.decode(&instruction.server_target_toon).await?;
        let validation = corpus_validator::validate_case_text(&target, &case_text, instruction_id, &self.similarity_window)?;

        let submission = SubmissionRecord {
            instruction_id,
            agent_id,
            case_text: case_text.clone(),
            signature: instruction.signature.clone(),
            validation: validation.clone(),
            submitted_at: Utc::now(),
        };

        self.store.append_submission(&submission, &instruction, &self.seed_rows)?;
        self.counters.submitted += 1;
        self.similarity_window.record(instruction_id.to_string(), case_text);
        if let Some(stored) = self.instructions.get_mut(&instruction_id) {
            stored.submitted = true;
        }
        self.persist_dashboard()?;

        Ok(validation)
    }

    pub fn dashboard_snapshot(&self) -> corpus_storage::DashboardSnapshot {
        let generation_target = self.config.generation_target_given_seed_count(self.seed_rows.len() as u64);
        corpus_storage::build_snapshot(&self.counters, self.config.target_total, generation_target, &self.config.axis_shares)
    }

    fn persist_dashboard(&self) -> Result<(), corpus_storage::StorageError> {
        self.store.save_counters(&self.counters)?;
        let generation_target = self.config.generation_target_given_seed_count(self.seed_rows.len() as u64);
        self.store
            .write_summary(&self.counters, self.config.target_total, generation_target, &self.config.axis_shares)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<tokio::sync::Mutex<CoordinatorState>>,
}
