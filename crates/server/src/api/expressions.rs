//! Client-facing expression endpoints: submit, list, and look up.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use calcflow_core::{
    CalcError, CalculateRequest, CalculateResponse, ErrorResponse, ExpressionListResponse,
    ExpressionResponse, ExpressionView,
};

use crate::state::AppState;

use super::{error_response, rejection_response, ApiResult};

/// Submit an arithmetic expression for evaluation.
#[utoipa::path(
    post,
    path = "/api/v1/calculate",
    tag = "Expressions",
    request_body = CalculateRequest,
    responses(
        (status = 201, description = "Expression accepted", body = CalculateResponse),
        (status = 422, description = "Expression or body is not valid", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn calculate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CalculateResponse>)> {
    let Json(req) = payload.map_err(rejection_response)?;
    let id = state
        .scheduler
        .submit(&req.expression)
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(CalculateResponse { id })))
}

/// All expressions in submission order.
#[utoipa::path(
    get,
    path = "/api/v1/expressions",
    tag = "Expressions",
    responses(
        (status = 200, description = "Every submitted expression", body = ExpressionListResponse)
    )
)]
pub async fn list_expressions(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ExpressionListResponse>> {
    let expressions = state.scheduler.expressions().map_err(error_response)?;
    debug!("Listing {} expressions", expressions.len());
    Ok(Json(ExpressionListResponse {
        expressions: expressions.iter().map(ExpressionView::from).collect(),
    }))
}

/// One expression by id.
#[utoipa::path(
    get,
    path = "/api/v1/expressions/{id}",
    tag = "Expressions",
    params(
        ("id" = u64, Path, description = "Expression ID")
    ),
    responses(
        (status = 200, description = "Expression state", body = ExpressionResponse),
        (status = 404, description = "Expression not found", body = ErrorResponse)
    )
)]
pub async fn get_expression(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<ExpressionResponse>> {
    // A non-numeric id cannot name an expression.
    let Path(id) = id.map_err(|_| error_response(CalcError::ExpressionNotFound(0)))?;
    let expression = state.scheduler.expression(id).map_err(error_response)?;
    Ok(Json(ExpressionResponse {
        expression: ExpressionView::from(&expression),
    }))
}
