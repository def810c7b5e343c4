//! Write-to-temp-and-rename: the pattern used for every file in the
//! state directory that is rewritten wholesale rather than appended to
//! (`counters.json`, `summary.json`, `summary.md`, the per-record audit
//! copies, the merged training export). A reader never observes a
//! partially written file.

use crate::error::StorageError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.write_all(contents).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.as_file().sync_all().map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.persist(path).map_err(|e| StorageError::Rename {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

pub fn write_atomic_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(StorageError::Serialize)?;
    write_atomic(path, &bytes)
}

/// Appends `line` (without its own trailing newline) to the file at
/// `path`, creating it if necessary, and fsyncs before returning so the
/// append is durable before the caller advances any counter.
pub fn append_line_fsync(path: &Path, line: &str) -> Result<(), StorageError> {
    let mut file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    writeln!(file, "{line}").map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    file.sync_all().map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_atomic_replaces_existing_contents_wholesale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counters.json");
        write_atomic(&path, b"{\"a\":1}").unwrap();
        write_atomic(&path, b"{\"a\":2}").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{\"a\":2}");
    }

    #[test]
    fn append_line_fsync_accumulates_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        append_line_fsync(&path, "{\"a\":1}").unwrap();
        append_line_fsync(&path, "{\"a\":2}").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    proptest::proptest! {
        #[test]
        fn appended_values_replay_in_order(values: Vec<u32>) {
            let dir = tempdir().unwrap();
            let path = dir.path().join("log.jsonl");
            for v in &values {
                append_line_fsync(&path, &serde_json::to_string(v).unwrap()).unwrap();
            }
            let replayed: Vec<u32> = crate::jsonl::read_all(&path).unwrap();
            prop_assert_eq!(replayed, values);
        }
    }
}
