//! Where workers get tasks from and send results to.

use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use calcflow_compute::Scheduler;
use calcflow_core::{CalcError, TaskAssignment, TaskEnvelope, TaskReport};
use reqwest::StatusCode;

/// What the orchestrator made of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Accepted,
    /// The task is unknown or no longer dispatched (e.g. its expression
    /// already failed). The report was dropped.
    Unknown,
}

/// Trait for task source backends.
///
/// Implementations poll an orchestrator for ready tasks and deliver the
/// resulting reports.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Ask for the next ready task. `None` means nothing is ready right now.
    async fn fetch_task(&self) -> anyhow::Result<Option<TaskAssignment>>;

    /// Deliver a success or failure report for a task this worker holds.
    async fn report(&self, report: &TaskReport) -> anyhow::Result<ReportOutcome>;
}

// ── HTTP ──────────────────────────────────────────────────────

/// Talks to the orchestrator's `/internal/task` endpoint.
#[derive(Debug, Clone)]
pub struct HttpTaskSource {
    task_url: String,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl HttpTaskSource {
    /// `base_url` is the orchestrator root, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str) -> Self {
        Self {
            task_url: format!("{}/internal/task", base_url.trim_end_matches('/')),
            client: reqwest::Client::new(),
        }
    }

    pub fn task_url(&self) -> &str {
        &self.task_url
    }
}

#[async_trait]
impl TaskSource for HttpTaskSource {
    async fn fetch_task(&self) -> anyhow::Result<Option<TaskAssignment>> {
        let response = self.client.get(&self.task_url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let envelope: TaskEnvelope = response.json().await?;
                Ok(Some(envelope.task))
            }
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<unreadable body>".to_string());
                bail!("task poll returned {}: {}", status, body)
            }
        }
    }

    async fn report(&self, report: &TaskReport) -> anyhow::Result<ReportOutcome> {
        let response = self.client.post(&self.task_url).json(report).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(ReportOutcome::Unknown),
            status if status.is_success() => Ok(ReportOutcome::Accepted),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<unreadable body>".to_string());
                bail!("task report for {} returned {}: {}", report.id, status, body)
            }
        }
    }
}

// ── In-process ────────────────────────────────────────────────

/// Calls a [`Scheduler`] in the same process directly.
#[derive(Clone)]
pub struct LocalTaskSource {
    scheduler: Arc<Scheduler>,
}

impl LocalTaskSource {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self { scheduler }
    }
}

#[async_trait]
impl TaskSource for LocalTaskSource {
    async fn fetch_task(&self) -> anyhow::Result<Option<TaskAssignment>> {
        match self.scheduler.dispatch() {
            Ok(task) => Ok(Some(task)),
            Err(CalcError::NoTaskReady) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn report(&self, report: &TaskReport) -> anyhow::Result<ReportOutcome> {
        let outcome = match &report.error {
            Some(reason) => self.scheduler.report_failure(report.id, reason),
            None => self.scheduler.report_result(report.id, report.result),
        };
        match outcome {
            Ok(()) => Ok(ReportOutcome::Accepted),
            Err(e) if e.is_not_found() => Ok(ReportOutcome::Unknown),
            Err(e) => Err(e.into()),
        }
    }
}
