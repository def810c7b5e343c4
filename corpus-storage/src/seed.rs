//! Seed corpus ingestion: an externally supplied JSONL file of
//! pre-existing cases, loaded once at startup. Seed rows count toward
//! `submitted` and the merged training export but never pass through
//! the validator.

use crate::error::StorageError;
use crate::jsonl;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct SeedRow {
    pub text: String,
}

pub fn load_seed_corpus(path: &Path) -> Result<Vec<SeedRow>, StorageError> {
    jsonl::read_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_seed_corpus_parses_text_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seed.jsonl");
        std::fs::write(&path, "{\"text\":\"first case\"}\n{\"text\":\"second case\"}\n").unwrap();
        let rows = load_seed_corpus(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].text, "second case");
    }

    #[test]
    fn load_seed_corpus_tolerates_missing_file() {
        let dir = tempdir().unwrap();
        let rows = load_seed_corpus(&dir.path().join("missing.jsonl")).unwrap();
        assert!(rows.is_empty());
    }
}
