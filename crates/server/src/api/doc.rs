//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI 3.1 spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "calcflow API",
        version = "0.1.0",
        description = "Distributed arithmetic calculator: expressions are split into tasks and computed by polling agents.",
    ),
    tags(
        (name = "Expressions", description = "Submit expressions and read their status and results"),
        (name = "Tasks", description = "Internal worker protocol: fetch ready tasks and report outcomes"),
        (name = "Health", description = "Server readiness and scheduler metrics"),
    ),
    paths(
        // Expressions
        crate::api::expressions::calculate,
        crate::api::expressions::list_expressions,
        crate::api::expressions::get_expression,
        // Tasks
        crate::api::tasks::next_task,
        crate::api::tasks::report_task,
        // Health
        crate::api::health::health,
        crate::api::health::scheduler_metrics,
    ),
    components(schemas(
        // Shared
        calcflow_core::ErrorResponse,
        calcflow_core::Operation,
        calcflow_core::ExpressionStatus,
        // Expressions
        calcflow_core::CalculateRequest,
        calcflow_core::CalculateResponse,
        calcflow_core::ExpressionView,
        calcflow_core::ExpressionListResponse,
        calcflow_core::ExpressionResponse,
        // Tasks
        calcflow_core::TaskAssignment,
        calcflow_core::TaskEnvelope,
        calcflow_core::TaskReport,
        // Health
        crate::api::health::HealthResponse,
    ))
)]
pub struct ApiDoc;
