use std::collections::HashMap;
use std::time::Duration;

use calcflow_core::Operation;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::LiveCounts;

/// Scheduler operational counters exposed over HTTP.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerMetrics {
    pub expressions_submitted: u64,
    pub expressions_completed: u64,
    pub expressions_failed: u64,
    /// Submissions rejected at compile time.
    pub expressions_rejected: u64,
    pub tasks_created: u64,
    pub tasks_dispatched: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    /// Tasks dropped because a sibling task failed.
    pub tasks_cancelled: u64,
    /// Dispatches by operator.
    pub dispatched_by_operation: HashMap<Operation, u64>,
    /// Successful reports by operator.
    pub completed_by_operation: HashMap<Operation, u64>,
    /// Average dispatch-to-report time by operator.
    pub avg_turnaround: HashMap<Operation, Duration>,
    pub last_report: Option<DateTime<Utc>>,
    pub live: LiveCounts,
}

impl SchedulerMetrics {
    /// Record an accepted submission that emitted `tasks` tasks.
    pub fn record_submission(&mut self, tasks: usize, completed_immediately: bool) {
        self.expressions_submitted += 1;
        self.tasks_created += tasks as u64;
        if completed_immediately {
            self.expressions_completed += 1;
        }
    }

    pub fn record_rejection(&mut self) {
        self.expressions_rejected += 1;
    }

    pub fn record_dispatch(&mut self, operation: Operation) {
        self.tasks_dispatched += 1;
        *self.dispatched_by_operation.entry(operation).or_default() += 1;
    }

    /// Record a successful report and fold its turnaround into the average.
    pub fn record_completion(&mut self, operation: Operation, turnaround: Duration) {
        self.tasks_completed += 1;
        self.last_report = Some(Utc::now());

        let count = {
            let c = self.completed_by_operation.entry(operation).or_default();
            *c += 1;
            *c
        };
        let prev_avg = self
            .avg_turnaround
            .get(&operation)
            .copied()
            .unwrap_or_default();

        // Incremental mean: new_avg = prev_avg + (turnaround - prev_avg) / count
        let new_avg = if count == 1 {
            turnaround
        } else {
            let prev_nanos = prev_avg.as_nanos() as f64;
            let cur_nanos = turnaround.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / count as f64;
            Duration::from_nanos(avg_nanos as u64)
        };
        self.avg_turnaround.insert(operation, new_avg);
    }

    /// Record a failed task and the siblings cascaded away with it.
    pub fn record_failure(&mut self, cancelled: usize) {
        self.tasks_failed += 1;
        self.tasks_cancelled += cancelled as u64;
        self.expressions_failed += 1;
        self.last_report = Some(Utc::now());
    }

    pub fn record_expression_completed(&mut self) {
        self.expressions_completed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_single_completion() {
        let mut m = SchedulerMetrics::default();
        m.record_completion(Operation::Add, Duration::from_millis(100));

        assert_eq!(m.tasks_completed, 1);
        assert!(m.last_report.is_some());
        assert_eq!(m.avg_turnaround[&Operation::Add], Duration::from_millis(100));
    }

    #[test]
    fn turnaround_averages_per_operation() {
        let mut m = SchedulerMetrics::default();
        m.record_completion(Operation::Multiply, Duration::from_millis(100));
        m.record_completion(Operation::Multiply, Duration::from_millis(200));
        m.record_completion(Operation::Divide, Duration::from_millis(10));

        assert_eq!(m.completed_by_operation[&Operation::Multiply], 2);
        // Average of 100ms and 200ms = 150ms
        let avg = m.avg_turnaround[&Operation::Multiply].as_millis();
        assert!((140..=160).contains(&avg), "expected ~150ms, got {}ms", avg);
        assert_eq!(m.avg_turnaround[&Operation::Divide], Duration::from_millis(10));
    }

    #[test]
    fn submission_and_failure_counters() {
        let mut m = SchedulerMetrics::default();
        m.record_submission(3, false);
        m.record_submission(0, true);
        m.record_rejection();
        m.record_dispatch(Operation::Add);
        m.record_failure(2);

        assert_eq!(m.expressions_submitted, 2);
        assert_eq!(m.expressions_completed, 1);
        assert_eq!(m.expressions_rejected, 1);
        assert_eq!(m.tasks_created, 3);
        assert_eq!(m.dispatched_by_operation[&Operation::Add], 1);
        assert_eq!(m.tasks_failed, 1);
        assert_eq!(m.tasks_cancelled, 2);
        assert_eq!(m.expressions_failed, 1);
    }

    #[test]
    fn metrics_serialize_operator_keys() {
        let mut m = SchedulerMetrics::default();
        m.record_dispatch(Operation::Divide);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["dispatched_by_operation"]["/"], 1);
        assert_eq!(json["live"]["live_tasks"], 0);
    }
}
