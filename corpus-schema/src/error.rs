use corpus_core::SchemaPath;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or querying the master schema. Loading
/// errors are fatal (configuration errors): an unrecognized node shape
/// is rejected at load time rather than silently skipped, per the
/// project's decision to not guess at the custom schema format.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read master schema file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("master schema file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed schema node at {path}: {reason}")]
    MalformedNode { path: SchemaPath, reason: String },

    #[error("leaf path {path} is unknown in the master schema")]
    UnknownLeaf { path: SchemaPath },

    #[error("leaf {path} expected scalar type {expected:?}, got a value of a different kind")]
    TypeMismatch {
        path: SchemaPath,
        expected: corpus_core::ScalarType,
    },

    #[error("leaf {path} value '{value}' is not one of the allowed enum values")]
    NotInEnum { path: SchemaPath, value: String },
}
