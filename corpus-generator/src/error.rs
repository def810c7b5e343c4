use corpus_codec::CodecError;
use thiserror::Error;

/// Failure to produce a valid target after exhausting the retry budget,
/// or a codec failure propagated from the final serialization step.
/// Both are surfaced to the HTTP caller as a transient server error;
/// the scheduler reselects axes on the caller's next request.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("exhausted {attempts} generation attempts without producing a valid target")]
    AttemptsExhausted { attempts: u32 },

    #[error("codec failure while serializing the target: {0}")]
    Codec(#[from] CodecError),
}
