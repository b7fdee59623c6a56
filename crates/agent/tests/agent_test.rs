//! Integration tests for the Agent.
//!
//! Worker loops run against an in-process scheduler, or against a scripted
//! source when a specific orchestrator response is needed.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::timeout;

use calcflow_agent::{run_once, Agent, LocalTaskSource, ReportOutcome, TaskSource};
use calcflow_compute::{Scheduler, SchedulerConfig};
use calcflow_core::config::{AgentConfig, OperationTimings};
use calcflow_core::{ExpressionStatus, Operation, TaskAssignment, TaskReport};

const TIMEOUT: Duration = Duration::from_secs(10);

fn agent_config(computing_power: usize) -> AgentConfig {
    AgentConfig {
        computing_power,
        wait_time_ms: 1,
        ..AgentConfig::default()
    }
}

async fn wait_until_settled(scheduler: &Scheduler) {
    timeout(TIMEOUT, async {
        while scheduler.live_counts().unwrap().waiting_expressions > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("expressions did not settle in time");
}

/// Hands out a fixed list of tasks and records every report.
struct ScriptedSource {
    tasks: Mutex<Vec<TaskAssignment>>,
    reports: Mutex<Vec<TaskReport>>,
    outcome: ReportOutcome,
}

impl ScriptedSource {
    fn new(tasks: Vec<TaskAssignment>, outcome: ReportOutcome) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            reports: Mutex::new(Vec::new()),
            outcome,
        }
    }
}

#[async_trait]
impl TaskSource for ScriptedSource {
    async fn fetch_task(&self) -> anyhow::Result<Option<TaskAssignment>> {
        Ok(self.tasks.lock().unwrap().pop())
    }

    async fn report(&self, report: &TaskReport) -> anyhow::Result<ReportOutcome> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(self.outcome)
    }
}

#[tokio::test]
async fn agent_resolves_submitted_expressions() {
    let scheduler = Arc::new(Scheduler::default());
    let a = scheduler.submit("2+2*2").unwrap();
    let b = scheduler.submit("(1+2)*(3+4)-5").unwrap();
    let c = scheduler.submit("8/0+1").unwrap();

    let agent = Agent::new(
        Arc::new(LocalTaskSource::new(Arc::clone(&scheduler))),
        &agent_config(3),
    );
    let handles = agent.spawn();
    assert_eq!(handles.len(), 3);

    wait_until_settled(&scheduler).await;
    agent.stop();
    for handle in handles {
        timeout(TIMEOUT, handle).await.unwrap().unwrap();
    }

    assert_eq!(scheduler.expression(a).unwrap().result, Some(6.0));
    assert_eq!(scheduler.expression(b).unwrap().result, Some(16.0));
    let failed = scheduler.expression(c).unwrap();
    assert_eq!(failed.status, ExpressionStatus::Error);
    assert_eq!(failed.error.as_deref(), Some("division by zero"));
}

#[tokio::test]
async fn run_once_reports_nothing_when_idle() {
    let source = ScriptedSource::new(Vec::new(), ReportOutcome::Accepted);
    assert!(!run_once(&source).await.unwrap());
    assert!(source.reports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn run_once_honours_operation_time() {
    let task = TaskAssignment {
        id: 11,
        arg1: 7.0,
        arg2: 3.0,
        operation: Operation::Subtract,
        operation_time: 50,
    };
    let source = ScriptedSource::new(vec![task], ReportOutcome::Accepted);

    let started = Instant::now();
    assert!(run_once(&source).await.unwrap());
    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(
        source.reports.lock().unwrap().as_slice(),
        &[TaskReport::success(11, 4.0)]
    );
}

#[tokio::test]
async fn unknown_report_is_not_an_error() {
    let task = TaskAssignment {
        id: 3,
        arg1: 1.0,
        arg2: 1.0,
        operation: Operation::Add,
        operation_time: 0,
    };
    let source = ScriptedSource::new(vec![task], ReportOutcome::Unknown);
    assert!(run_once(&source).await.unwrap());
}

#[tokio::test]
async fn configured_timings_reach_the_worker() {
    let config = SchedulerConfig {
        timings: OperationTimings {
            multiplication_ms: 30,
            ..OperationTimings::default()
        },
    };
    let scheduler = Arc::new(Scheduler::new(config));
    let id = scheduler.submit("6*7").unwrap();
    let source = LocalTaskSource::new(Arc::clone(&scheduler));

    let started = Instant::now();
    assert!(run_once(&source).await.unwrap());
    assert!(started.elapsed() >= Duration::from_millis(30));
    assert_eq!(scheduler.expression(id).unwrap().result, Some(42.0));
}

#[tokio::test]
async fn stop_ends_idle_loops() {
    let source = Arc::new(ScriptedSource::new(Vec::new(), ReportOutcome::Accepted));
    let agent = Agent::new(source, &agent_config(2));
    let handles = agent.spawn();
    tokio::time::sleep(Duration::from_millis(20)).await;
    agent.stop();
    for handle in handles {
        timeout(TIMEOUT, handle).await.unwrap().unwrap();
    }
}
