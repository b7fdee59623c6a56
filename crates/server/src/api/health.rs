//! Health and scheduler metrics endpoints.
//!
//! SRP: server readiness and operational metrics.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use calcflow_compute::SchedulerMetrics;

use crate::state::AppState;

use super::{error_response, ApiResult};

// ── Health ────────────────────────────────────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: i64,
    pub profile: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        profile: state.config.profile_label().to_string(),
    })
}

// ── Scheduler metrics ─────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/scheduler/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Scheduler counters", body = Object)
    )
)]
pub async fn scheduler_metrics(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SchedulerMetrics>> {
    let metrics = state.scheduler.metrics().map_err(error_response)?;
    Ok(Json(metrics))
}
