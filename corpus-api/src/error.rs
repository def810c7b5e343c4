//! API error taxonomy: every request-level failure maps to a stable
//! `ErrorCode` and is serialized as `{"error_code": "...", "reason":
//! "..."}` with the matching HTTP status, mirroring the teacher's
//! `ApiError`/`ErrorCode` JSON body shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    UnknownInstruction,
    AlreadySubmitted,
    ClientSuppliedTarget,
    MissingName,
    Leakage,
    MalformedTarget,
    GenerationUnavailable,
    Exhausted,
    InternalError,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::UnknownInstruction => StatusCode::BAD_REQUEST,
            ErrorCode::AlreadySubmitted => StatusCode::BAD_REQUEST,
            ErrorCode::ClientSuppliedTarget => StatusCode::BAD_REQUEST,
            ErrorCode::MissingName => StatusCode::BAD_REQUEST,
            ErrorCode::Leakage => StatusCode::BAD_REQUEST,
            ErrorCode::MalformedTarget => StatusCode::BAD_REQUEST,
            ErrorCode::GenerationUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Exhausted => StatusCode::OK,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub error_code: ErrorCode,
    pub reason: String,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, reason: impl Into<String>) -> Self {
        ApiError {
            error_code,
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl std::fmt::Display) -> Self {
        tracing::error!(%reason, "internal error");
        ApiError::new(ErrorCode::InternalError, "internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error_code.status_code();
        (status, Json(self)).into_response()
    }
}

impl From<corpus_validator::ValidationError> for ApiError {
    fn from(err: corpus_validator::ValidationError) -> Self {
        let code = match err.code() {
            corpus_validator::ErrorCode::UnknownInstruction => ErrorCode::UnknownInstruction,
            corpus_validator::ErrorCode::AlreadySubmitted => ErrorCode::AlreadySubmitted,
            corpus_validator::ErrorCode::ClientSuppliedTarget => ErrorCode::ClientSuppliedTarget,
            corpus_validator::ErrorCode::MissingName => ErrorCode::MissingName,
            corpus_validator::ErrorCode::Leakage => ErrorCode::Leakage,
            corpus_validator::ErrorCode::MalformedTarget => ErrorCode::MalformedTarget,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<corpus_generator::GeneratorError> for ApiError {
    fn from(err: corpus_generator::GeneratorError) -> Self {
        ApiError::new(ErrorCode::GenerationUnavailable, err.to_string())
    }
}

impl From<corpus_storage::StorageError> for ApiError {
    fn from(err: corpus_storage::StorageError) -> Self {
        ApiError::internal(err)
    }
}
