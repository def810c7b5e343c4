//! The validator's own error taxonomy. Every variant maps to a stable
//! `ErrorCode` the HTTP layer serializes verbatim, so a client can
//! branch on the code without parsing the reason string.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    UnknownInstruction,
    AlreadySubmitted,
    ClientSuppliedTarget,
    MissingName,
    Leakage,
    MalformedTarget,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnknownInstruction => "unknown_instruction",
            ErrorCode::AlreadySubmitted => "already_submitted",
            ErrorCode::ClientSuppliedTarget => "client_supplied_target",
            ErrorCode::MissingName => "missing_name",
            ErrorCode::Leakage => "leakage",
            ErrorCode::MalformedTarget => "malformed_target",
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("instruction {0} does not exist")]
    UnknownInstruction(String),
    #[error("instruction {0} has already been submitted")]
    AlreadySubmitted(String),
    #[error("submissions may not include a client-supplied target payload")]
    ClientSuppliedTarget,
    #[error("case text is missing the required personal name '{0}'")]
    MissingName(String),
    #[error("case text contains a schema-leakage token '{0}'")]
    Leakage(String),
    #[error("locked target could not be decoded: {0}")]
    MalformedTarget(String),
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::UnknownInstruction(_) => ErrorCode::UnknownInstruction,
            ValidationError::AlreadySubmitted(_) => ErrorCode::AlreadySubmitted,
            ValidationError::ClientSuppliedTarget => ErrorCode::ClientSuppliedTarget,
            ValidationError::MissingName(_) => ErrorCode::MissingName,
            ValidationError::Leakage(_) => ErrorCode::Leakage,
            ValidationError::MalformedTarget(_) => ErrorCode::MalformedTarget,
        }
    }
}
