//! Per-step run records.

use super::StepStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An illegal status change; always an executor bug.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("illegal step status transition {from} -> {to}")]
pub struct StatusTransitionError {
    /// The current status.
    pub from: StepStatus,
    /// The requested status.
    pub to: StepStatus,
}

/// The trace entry of one step in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRunRecord {
    /// The step name.
    pub step: String,
    /// The current status.
    pub status: StepStatus,
    /// The captured error, if the step failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Why the step was skipped, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    /// When the transformation started. `None` if it never ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the step reached its terminal status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Wall-clock time spent in the transformation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// Position in completion order, starting at zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<usize>,
}

impl StepRunRecord {
    /// Creates a pending record.
    #[must_use]
    pub fn pending(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Pending,
            error: None,
            skip_reason: None,
            started_at: None,
            ended_at: None,
            duration_ms: None,
            sequence: None,
        }
    }

    /// Moves the record forward.
    ///
    /// # Errors
    ///
    /// Returns `StatusTransitionError` if the transition is not forward.
    pub fn advance(&mut self, next: StepStatus) -> Result<(), StatusTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(StatusTransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Returns true if the record reached a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns true if the transformation was invoked.
    #[must_use]
    pub const fn was_invoked(&self) -> bool {
        self.started_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_record() {
        let record = StepRunRecord::pending("draft");
        assert_eq!(record.status, StepStatus::Pending);
        assert!(!record.was_invoked());
        assert!(!record.is_terminal());
    }

    #[test]
    fn test_advance_forward() {
        let mut record = StepRunRecord::pending("draft");
        record.advance(StepStatus::Ready).unwrap();
        record.advance(StepStatus::Running).unwrap();
        record.advance(StepStatus::Succeeded).unwrap();
        assert!(record.is_terminal());
    }

    #[test]
    fn test_advance_backward_rejected() {
        let mut record = StepRunRecord::pending("draft");
        record.advance(StepStatus::Skipped).unwrap();

        let err = record.advance(StepStatus::Running).unwrap_err();
        assert_eq!(err.from, StepStatus::Skipped);
        assert_eq!(record.status, StepStatus::Skipped);
    }

    #[test]
    fn test_record_serialization_omits_empty_fields() {
        let record = StepRunRecord::pending("draft");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"step": "draft", "status": "pending"}));
    }
}
