//! Worker-facing endpoints: poll for a ready task and report its outcome.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use calcflow_core::{ErrorResponse, TaskEnvelope, TaskReport};

use crate::state::AppState;

use super::{error_response, rejection_response, ApiResult};

/// Hand the oldest ready task to the calling worker.
#[utoipa::path(
    get,
    path = "/internal/task",
    tag = "Tasks",
    responses(
        (status = 200, description = "A task ready for computation", body = TaskEnvelope),
        (status = 404, description = "No task is ready", body = ErrorResponse)
    )
)]
pub async fn next_task(State(state): State<Arc<AppState>>) -> ApiResult<Json<TaskEnvelope>> {
    let task = state.scheduler.dispatch().map_err(error_response)?;
    Ok(Json(TaskEnvelope { task }))
}

/// Accept a worker's result, or its failure when `error` is set.
#[utoipa::path(
    post,
    path = "/internal/task",
    tag = "Tasks",
    request_body = TaskReport,
    responses(
        (status = 200, description = "Report accepted"),
        (status = 404, description = "Task unknown or not dispatched", body = ErrorResponse),
        (status = 422, description = "Malformed report", body = ErrorResponse)
    )
)]
pub async fn report_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TaskReport>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(report) = payload.map_err(rejection_response)?;
    let outcome = match &report.error {
        Some(reason) => state.scheduler.report_failure(report.id, reason),
        None => state.scheduler.report_result(report.id, report.result),
    };
    outcome.map_err(|e| {
        debug!(task_id = report.id, "Report refused: {}", e);
        error_response(e)
    })?;
    Ok(StatusCode::OK)
}
