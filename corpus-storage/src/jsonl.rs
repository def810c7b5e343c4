//! Reads a JSONL log line by line, parsing each into `T` and skipping
//! blank trailing lines. Used by startup reconciliation to replay
//! `issued_instructions.jsonl` and `generated_cases.jsonl`.

use crate::error::StorageError;
use serde::de::DeserializeOwned;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Returns `Ok(vec![])` if the file does not exist yet (a fresh state
/// directory has no logs to replay).
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StorageError::Open {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| StorageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record: T = serde_json::from_str(&line).map_err(|source| StorageError::MalformedJson {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Deserialize)]
    struct Row {
        a: u32,
    }

    #[test]
    fn read_all_returns_empty_for_missing_file() {
        let dir = tempdir().unwrap();
        let rows: Vec<Row> = read_all(&dir.path().join("missing.jsonl")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn read_all_parses_one_record_per_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(&path, "{\"a\":1}\n{\"a\":2}\n\n").unwrap();
        let rows: Vec<Row> = read_all(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].a, 2);
    }
}
