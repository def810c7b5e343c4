//! The four HTTP endpoints from §4.7: liveness, dashboard, instruction
//! issuance, and submission. Each handler does the minimum outside the
//! lock (JSON extraction, raw-body target-leak check) and the rest
//! inside one `CoordinatorState` critical section.

use crate::error::{ApiError, ErrorCode};
use crate::state::{AppState, CoordinatorError};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use corpus_core::{InstructionId, ValidationOutcome};
use serde::{Deserialize, Serialize};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/dashboard", get(dashboard))
        .route("/next-instruction", get(next_instruction).post(next_instruction))
        .route("/submit-case", post(submit_case))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn dashboard(State(state): State<AppState>) -> Json<corpus_storage::DashboardSnapshot> {
    let coordinator = state.coordinator.lock().await;
    Json(coordinator.dashboard_snapshot())
}

#[derive(Debug, Deserialize)]
struct NextInstructionRequest {
    agent_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct NextInstructionResponse {
    instruction_id: String,
    target_toon: String,
    prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    must_include: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    must_avoid: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExhaustedResponse {
    exhausted: bool,
    generation_target: u64,
}

async fn next_instruction(
    State(state): State<AppState>,
    body: Option<Json<NextInstructionRequest>>,
) -> Result<Response, ApiError> {
    let agent_id = body.and_then(|Json(req)| req.agent_id);
    let mut coordinator = state.coordinator.lock().await;
    let mut rng = rand::thread_rng();

    match coordinator.issue_instruction(agent_id.clone(), &mut rng).await {
        Ok(record) => Ok(Json(NextInstructionResponse {
            instruction_id: record.instruction_id.to_string(),
            target_toon: record.server_target_toon,
            prompt: record.prompt,
            must_include: record.must_include,
            must_avoid: record.must_avoid,
            agent_id,
        })
        .into_response()),
        Err(CoordinatorError::Exhausted(generation_target)) => Ok(Json(ExhaustedResponse {
            exhausted: true,
            generation_target,
        })
        .into_response()),
        Err(e) => Err(coordinator_error_to_api(e)),
    }
}

#[derive(Debug, Deserialize)]
struct SubmitCaseRequest {
    instruction_id: String,
    case_text: String,
    agent_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct SubmitCaseResponse {
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity_warning: Option<corpus_core::SimilarityWarning>,
}

async fn submit_case(
    State(state): State<AppState>,
    raw_body: axum::extract::Json<serde_json::Value>,
) -> Result<Json<SubmitCaseResponse>, ApiError> {
    corpus_validator::reject_client_supplied_target(&raw_body.0)
        .map_err(|e| ApiError::new(ErrorCode::ClientSuppliedTarget, e.to_string()))?;

    let request: SubmitCaseRequest = serde_json::from_value(raw_body.0)
        .map_err(|e| ApiError::new(ErrorCode::MalformedTarget, format!("invalid request body: {e}")))?;

    let instruction_id: InstructionId = request
        .instruction_id
        .parse()
        .map_err(|_| ApiError::new(ErrorCode::UnknownInstruction, "malformed instruction id"))?;

    let mut coordinator = state.coordinator.lock().await;
    let validation: ValidationOutcome = coordinator
        .submit_case(instruction_id, request.case_text, request.agent_id)
        .await
        .map_err(coordinator_error_to_api)?;

    Ok(Json(SubmitCaseResponse {
        accepted: true,
        similarity_warning: validation.similarity_warning,
    }))
}

fn coordinator_error_to_api(err: CoordinatorError) -> ApiError {
    match err {
        CoordinatorError::UnknownInstruction(id) => ApiError::new(ErrorCode::UnknownInstruction, format!("instruction {id} does not exist")),
        CoordinatorError::AlreadySubmitted(id) => ApiError::new(ErrorCode::AlreadySubmitted, format!("instruction {id} has already been submitted")),
        CoordinatorError::Exhausted(target) => ApiError::new(ErrorCode::Exhausted, format!("generation target of {target} instructions has already been reached")),
        CoordinatorError::Scheduling(e) => ApiError::internal(e),
        CoordinatorError::Validation(e) => e.into(),
        CoordinatorError::Generation(e) => e.into(),
        CoordinatorError::Codec(e) => ApiError::new(ErrorCode::GenerationUnavailable, e.to_string()),
        CoordinatorError::Storage(e) => e.into(),
    }
}
