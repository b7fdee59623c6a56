//! JSON wire types shared by the HTTP service and the worker client.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{Expression, ExpressionId, ExpressionStatus, Operation, TaskId};

// ── Client-facing ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalculateRequest {
    pub expression: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalculateResponse {
    #[schema(value_type = u64)]
    pub id: ExpressionId,
}

/// Public view of an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExpressionView {
    #[schema(value_type = u64)]
    pub id: ExpressionId,
    pub status: ExpressionStatus,
    pub result: Option<f64>,
    pub error: Option<String>,
}

impl From<&Expression> for ExpressionView {
    fn from(expr: &Expression) -> Self {
        Self {
            id: expr.id,
            status: expr.status,
            result: expr.result,
            error: expr.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpressionListResponse {
    pub expressions: Vec<ExpressionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpressionResponse {
    pub expression: ExpressionView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// ── Worker-facing ─────────────────────────────────────────────

/// A ready task handed to a worker, with every placeholder already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskAssignment {
    #[schema(value_type = u64)]
    pub id: TaskId,
    pub arg1: f64,
    pub arg2: f64,
    pub operation: Operation,
    /// Simulated cost in milliseconds the worker sleeps before computing.
    pub operation_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskEnvelope {
    pub task: TaskAssignment,
}

/// A worker's report: `error` set means the task failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskReport {
    #[schema(value_type = u64)]
    pub id: TaskId,
    #[serde(default)]
    pub result: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskReport {
    pub fn success(id: TaskId, result: f64) -> Self {
        Self { id, result, error: None }
    }

    pub fn failure(id: TaskId, reason: impl Into<String>) -> Self {
        Self {
            id,
            result: 0.0,
            error: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_without_error_field_is_success() {
        let report: TaskReport = serde_json::from_str(r#"{"id": 3, "result": 1.5}"#).unwrap();
        assert_eq!(report, TaskReport::success(3, 1.5));
    }

    #[test]
    fn failure_report_omits_nothing_the_server_needs() {
        let json = serde_json::to_value(TaskReport::failure(9, "division by zero")).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["error"], "division by zero");
    }

    #[test]
    fn assignment_uses_operator_symbols() {
        let envelope = TaskEnvelope {
            task: TaskAssignment {
                id: 1,
                arg1: 2.0,
                arg2: 3.0,
                operation: Operation::Multiply,
                operation_time: 50,
            },
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["task"]["operation"], "*");
        assert_eq!(json["task"]["operation_time"], 50);
    }

    #[test]
    fn expression_view_status_is_lowercase() {
        let expr = Expression::completed(4, "2", 2.0);
        let json = serde_json::to_value(ExpressionView::from(&expr)).unwrap();
        assert_eq!(json["status"], "complete");
        assert_eq!(json["result"], 2.0);
        assert!(json["error"].is_null());
    }
}
