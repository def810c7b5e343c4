use thiserror::Error;

/// Failures from the external TOON codec subprocess. All are treated as
/// transient server errors by callers: a failed encode never corrupts
/// already-committed state, it just aborts the current generation
/// attempt.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to spawn codec command {command:?}: {source}")]
    Spawn {
        command: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    #[error("codec command {command:?} timed out after {timeout_ms}ms")]
    Timeout { command: Vec<String>, timeout_ms: u64 },

    #[error("codec command {command:?} exited with status {status}: {stderr}")]
    NonZeroExit {
        command: Vec<String>,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("codec command {command:?} produced non-UTF-8 output")]
    NonUtf8 { command: Vec<String> },

    #[error("failed to serialize payload to canonical JSON: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse decoded codec output as JSON: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("round-trip decode of the encoded payload does not match the source payload")]
    RoundTripMismatch,
}
