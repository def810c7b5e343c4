//! Every path under the state directory named in one place.

use corpus_core::InstructionId;
use std::path::{Path, PathBuf};

pub struct StatePaths {
    root: PathBuf,
}

impl StatePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StatePaths { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn issued_instructions_log(&self) -> PathBuf {
        self.root.join("issued_instructions.jsonl")
    }

    pub fn generated_cases_log(&self) -> PathBuf {
        self.root.join("generated_cases.jsonl")
    }

    pub fn train_mistral_log(&self) -> PathBuf {
        self.root.join("generated_cases_train_mistral.jsonl")
    }

    pub fn full_training_cases(&self) -> PathBuf {
        self.root.join("full_training_cases_mistral.jsonl")
    }

    pub fn instructions_dir(&self) -> PathBuf {
        self.root.join("instructions")
    }

    pub fn submissions_dir(&self) -> PathBuf {
        self.root.join("submissions")
    }

    pub fn instruction_file(&self, id: InstructionId) -> PathBuf {
        self.instructions_dir().join(format!("{id}.json"))
    }

    pub fn submission_file(&self, id: InstructionId) -> PathBuf {
        self.submissions_dir().join(format!("{id}.json"))
    }

    pub fn counters_file(&self) -> PathBuf {
        self.root.join("counters.json")
    }

    pub fn summary_json(&self) -> PathBuf {
        self.root.join("summary.json")
    }

    pub fn summary_md(&self) -> PathBuf {
        self.root.join("summary.md")
    }
}
