//! Minimal HTML front page: a submission form over the expression table.
//!
//! Rendered with minijinja. The `.html` template name turns on auto-escaping
//! for user-supplied expression text.

use std::sync::Arc;

use axum::extract::{Form, State};
use axum::response::Html;
use minijinja::{context, Environment};
use serde::Deserialize;
use tracing::debug;

use calcflow_core::{CalcError, ExpressionView};

use crate::state::AppState;

use super::{error_response, ApiResult};

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub expression: String,
}

pub async fn index(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    render_page(&state, "", None, None)
}

pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SubmitForm>,
) -> ApiResult<Html<String>> {
    match state.scheduler.submit(&form.expression) {
        Ok(id) => render_page(&state, "", Some(id), None),
        Err(CalcError::InvalidExpression(reason)) => {
            debug!("Form submission rejected: {}", reason);
            let message = CalcError::InvalidExpression(reason).to_string();
            render_page(&state, &form.expression, None, Some(message))
        }
        Err(e) => Err(error_response(e)),
    }
}

fn render_page(
    state: &AppState,
    expression: &str,
    submitted_id: Option<u64>,
    error: Option<String>,
) -> ApiResult<Html<String>> {
    let expressions: Vec<ExpressionView> = state
        .scheduler
        .expressions()
        .map_err(error_response)?
        .iter()
        .map(ExpressionView::from)
        .collect();

    let mut env = Environment::new();
    env.add_template("index.html", INDEX_TEMPLATE)
        .map_err(|e| error_response(CalcError::Internal(format!("template: {e}"))))?;
    let html = env
        .get_template("index.html")
        .and_then(|tmpl| {
            tmpl.render(context! {
                expression => expression,
                submitted_id => submitted_id,
                error => error,
                expressions => expressions,
            })
        })
        .map_err(|e| error_response(CalcError::Internal(format!("template render: {e}"))))?;
    Ok(Html(html))
}
