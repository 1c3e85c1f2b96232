//! Aggregated outcome of a pipeline run.

use crate::context::{ContextSnapshot, ContextValue};
use crate::core::{RunStatus, StepRunRecord, StepStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

/// The result of one pipeline run.
///
/// Holds the final context, the per-step trace in completion order, and the
/// overall status derived from the terminal key.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    /// Unique id of this run.
    pub id: Uuid,
    /// The pipeline name.
    pub pipeline: String,
    /// The key whose value is the run's result.
    pub terminal_key: String,
    /// The overall status.
    pub status: RunStatus,
    /// The cancellation reason, if the run was cancelled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Every resolved key at the end of the run.
    pub context: ContextSnapshot,
    /// One record per step, in completion order.
    pub trace: Vec<StepRunRecord>,
    /// Steps the terminal key transitively depends on.
    pub terminal_ancestors: BTreeSet<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run ended.
    pub ended_at: DateTime<Utc>,
    /// Total wall-clock time.
    pub duration_ms: f64,
}

impl PipelineRun {
    /// Returns the value of the terminal key.
    #[must_use]
    pub fn final_value(&self) -> ContextValue {
        self.context.get(&self.terminal_key)
    }

    /// Returns the per-step trace in completion order.
    #[must_use]
    pub fn trace(&self) -> &[StepRunRecord] {
        &self.trace
    }

    /// Returns the overall status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Returns true if the terminal key resolved to a present value.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    /// Looks up the record of one step.
    #[must_use]
    pub fn record(&self, step: &str) -> Option<&StepRunRecord> {
        self.trace.iter().find(|r| r.step == step)
    }

    /// Returns the status of one step.
    #[must_use]
    pub fn step_status(&self, step: &str) -> Option<StepStatus> {
        self.record(step).map(|r| r.status)
    }

    /// Returns every failed step, in completion order.
    #[must_use]
    pub fn failures(&self) -> Vec<&StepRunRecord> {
        self.trace
            .iter()
            .filter(|r| r.status == StepStatus::Failed)
            .collect()
    }

    /// Returns the ancestors of the terminal key that did not succeed.
    ///
    /// When the final value is absent these explain why.
    #[must_use]
    pub fn blockers(&self) -> Vec<&StepRunRecord> {
        self.trace
            .iter()
            .filter(|r| self.terminal_ancestors.contains(&r.step))
            .filter(|r| matches!(r.status, StepStatus::Failed | StepStatus::Skipped))
            .collect()
    }

    /// Returns the names of the steps whose transformation was invoked.
    #[must_use]
    pub fn invoked_steps(&self) -> Vec<&str> {
        self.trace
            .iter()
            .filter(|r| r.was_invoked())
            .map(|r| r.step.as_str())
            .collect()
    }

    /// Serializes the run as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Derives the overall status.
///
/// A present terminal value wins over everything. Otherwise cancellation,
/// then a failed ancestor, decide; a run that simply had nothing to work
/// with is `Skipped`.
pub(crate) fn overall_status(
    final_value: &ContextValue,
    cancelled: bool,
    terminal_ancestors: &BTreeSet<String>,
    records: &[StepRunRecord],
) -> RunStatus {
    if final_value.is_present() {
        RunStatus::Succeeded
    } else if cancelled {
        RunStatus::Cancelled
    } else if records
        .iter()
        .any(|r| r.status == StepStatus::Failed && terminal_ancestors.contains(&r.step))
    {
        RunStatus::Failed
    } else {
        RunStatus::Skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(step: &str, status: StepStatus) -> StepRunRecord {
        let mut record = StepRunRecord::pending(step);
        record.status = status;
        record
    }

    fn ancestors(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_present_value_succeeds_despite_failures() {
        let records = vec![record("a", StepStatus::Failed)];
        let status = overall_status(&ContextValue::text("x"), true, &ancestors(&["a"]), &records);
        assert_eq!(status, RunStatus::Succeeded);
    }

    #[test]
    fn test_failed_ancestor() {
        let records = vec![record("a", StepStatus::Failed), record("b", StepStatus::Skipped)];
        let status = overall_status(&ContextValue::Absent, false, &ancestors(&["a", "b"]), &records);
        assert_eq!(status, RunStatus::Failed);
    }

    #[test]
    fn test_unrelated_failure_is_not_blocking() {
        let records = vec![record("side", StepStatus::Failed), record("b", StepStatus::Skipped)];
        let status = overall_status(&ContextValue::Absent, false, &ancestors(&["b"]), &records);
        assert_eq!(status, RunStatus::Skipped);
    }

    #[test]
    fn test_cancelled() {
        let status = overall_status(&ContextValue::Absent, true, &ancestors(&[]), &[]);
        assert_eq!(status, RunStatus::Cancelled);
    }
}
