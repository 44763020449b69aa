//! Axum route handlers for the Mentorship API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::mentorship::models::{ExtractionFailure, MentorshipPlan, Turn};
use crate::mentorship::orchestrator::request_plan;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub student_input: String,
    /// Prior turns, owned and resupplied by the caller on each request.
    #[serde(default)]
    pub history: Vec<Turn>,
}

/// A plan on success, or the failure message plus the raw model text so the
/// caller can display it for debugging. Recovered faults are data, not HTTP
/// errors.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PlanResponse {
    Success {
        plan: MentorshipPlan,
    },
    Failure {
        error: String,
        raw_output: String,
    },
}

/// POST /api/v1/mentorship/plan
///
/// Single-turn request/response: one model invocation, one normalization
/// attempt, no retries.
pub async fn handle_plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    if request.student_input.trim().is_empty() {
        return Err(AppError::Validation(
            "student_input cannot be empty".to_string(),
        ));
    }

    let body = match request_plan(&state.llm, &request.student_input, &request.history).await {
        Ok(plan) => PlanResponse::Success { plan },
        Err(ExtractionFailure {
            message,
            raw_output,
        }) => PlanResponse::Failure {
            error: message,
            raw_output,
        },
    };

    Ok(Json(body))
}
