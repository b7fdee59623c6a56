//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/", get(api::index).post(api::submit_form))
        .route("/health", get(api::health))
        .route("/scheduler/metrics", get(api::scheduler_metrics))
        .route("/api/v1/calculate", post(api::calculate))
        .route("/api/v1/expressions", get(api::list_expressions))
        .route("/api/v1/expressions/{id}", get(api::get_expression))
        .route("/internal/task", get(api::next_task).post(api::report_task))
        .layer(cors)
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

/// `*` allows any origin; anything else is taken as the single allowed origin.
fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::permissive().allow_origin(value),
        Err(e) => {
            warn!("Invalid CORS_ORIGIN {:?} ({}), allowing any origin", origin, e);
            CorsLayer::permissive()
        }
    }
}
