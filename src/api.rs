//! HTTP surface of the service.
//!
//! - `POST /jobs` with `{"proof_text": "..."}` answers `202 {"job_id": ...}`.
//! - `GET /jobs/{job_id}` answers the job record, or 404.
//! - `GET /health` is a static liveness probe.
//!
//! A failed job is still a successful poll: only its `status` and `error`
//! fields say what went wrong.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::SchedulerError;
use crate::jobs::{Job, JobScheduler};

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub proof_text: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
}

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    MissingProof,
    Scheduler(SchedulerError),
}

impl From<SchedulerError> for ApiError {
    fn from(e: SchedulerError) -> Self {
        ApiError::Scheduler(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingProof => (StatusCode::BAD_REQUEST, "No proof text provided".to_string()),
            ApiError::Scheduler(SchedulerError::JobNotFound(_)) => {
                (StatusCode::NOT_FOUND, "job not found".to_string())
            }
            ApiError::Scheduler(e @ (SchedulerError::QueueFull | SchedulerError::ShuttingDown)) => {
                (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(scheduler: Arc<JobScheduler>) -> Router {
    Router::new()
        .route("/jobs", post(submit_job))
        .route("/jobs/{job_id}", get(get_job))
        .route("/health", get(health))
        .with_state(scheduler)
}

async fn submit_job(
    State(scheduler): State<Arc<JobScheduler>>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    // A malformed body is treated like an empty one.
    let request = body.map(|Json(req)| req).unwrap_or_default();
    if request.proof_text.is_empty() {
        return Err(ApiError::MissingProof);
    }

    let job_id = scheduler.submit(request.proof_text)?;
    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { job_id })))
}

async fn get_job(
    State(scheduler): State<Arc<JobScheduler>>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    Ok(Json(scheduler.status(&job_id)?))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "Server is running" }))
}
