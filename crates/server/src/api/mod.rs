//! Domain-focused API endpoint modules.
//!
//! Each sub-module owns a single responsibility area.
//! Shared error mapping lives here in mod.rs.

pub mod doc;
mod expressions;
mod health;
mod tasks;
mod web;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;

use calcflow_core::{CalcError, ErrorResponse};

// ── Shared types ─────────────────────────────────────────────────

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

/// Map a scheduler error onto its HTTP status.
pub(crate) fn error_response(e: CalcError) -> ApiError {
    let status = match &e {
        CalcError::InvalidExpression(_) => StatusCode::UNPROCESSABLE_ENTITY,
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        CalcError::DivisionByZero | CalcError::Overflow => StatusCode::UNPROCESSABLE_ENTITY,
        _ => {
            error!("Internal error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

/// Any unreadable request body is reported as 422.
pub(crate) fn rejection_response(rejection: JsonRejection) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: format!("Invalid request body: {}", rejection.body_text()),
        }),
    )
}

// ── Re-exports ───────────────────────────────────────────────────
// Flat `api::foo` paths used by router.rs route registration.

pub use expressions::{calculate, get_expression, list_expressions};
pub use health::{health, scheduler_metrics};
pub use tasks::{next_task, report_task};
pub use web::{index, submit_form};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(error_response(CalcError::invalid("x")).0, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_response(CalcError::ExpressionNotFound(1)).0, StatusCode::NOT_FOUND);
        assert_eq!(error_response(CalcError::TaskNotDispatched(1)).0, StatusCode::NOT_FOUND);
        assert_eq!(error_response(CalcError::NoTaskReady).0, StatusCode::NOT_FOUND);
        assert_eq!(
            error_response(CalcError::Internal("boom".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_body_carries_message() {
        let (_, Json(body)) = error_response(CalcError::ExpressionNotFound(9));
        assert_eq!(body.error, "Expression not found: 9");
    }
}
