//! Step and run status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle status of a step within one run.
///
/// Statuses only move forward; `Succeeded`, `Skipped` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Waiting for inputs to resolve.
    #[default]
    Pending,
    /// All inputs resolved, about to launch.
    Ready,
    /// The transformation is in flight.
    Running,
    /// The transformation returned outputs.
    Succeeded,
    /// Never ran, or ran and declined to produce anything.
    Skipped,
    /// The transformation returned an error.
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Ready => write!(f, "ready"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl StepStatus {
    /// Returns true if the status represents a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Skipped | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is a legal forward transition.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Ready | Self::Skipped)
                | (Self::Ready, Self::Running | Self::Skipped)
                | (Self::Running, Self::Succeeded | Self::Skipped | Self::Failed)
        )
    }
}

/// The overall outcome of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The terminal key resolved to a present value.
    Succeeded,
    /// An ancestor of the terminal key failed.
    Failed,
    /// The terminal key is absent and no ancestor failed.
    Skipped,
    /// The caller cancelled the run before the terminal key resolved.
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_status_display() {
        assert_eq!(StepStatus::Pending.to_string(), "pending");
        assert_eq!(StepStatus::Succeeded.to_string(), "succeeded");
        assert_eq!(StepStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_step_status_is_terminal() {
        assert!(StepStatus::Succeeded.is_terminal());
        assert!(StepStatus::Skipped.is_terminal());
        assert!(StepStatus::Failed.is_terminal());
        assert!(!StepStatus::Pending.is_terminal());
        assert!(!StepStatus::Ready.is_terminal());
        assert!(!StepStatus::Running.is_terminal());
    }

    #[test]
    fn test_transitions_only_move_forward() {
        assert!(StepStatus::Pending.can_transition_to(StepStatus::Ready));
        assert!(StepStatus::Pending.can_transition_to(StepStatus::Skipped));
        assert!(StepStatus::Running.can_transition_to(StepStatus::Failed));

        assert!(!StepStatus::Pending.can_transition_to(StepStatus::Running));
        assert!(!StepStatus::Running.can_transition_to(StepStatus::Pending));
        assert!(!StepStatus::Succeeded.can_transition_to(StepStatus::Failed));
        assert!(!StepStatus::Skipped.can_transition_to(StepStatus::Skipped));
    }

    #[test]
    fn test_status_serialize() {
        let json = serde_json::to_string(&StepStatus::Skipped).unwrap();
        assert_eq!(json, r#""skipped""#);

        let back: RunStatus = serde_json::from_str(r#""cancelled""#).unwrap();
        assert_eq!(back, RunStatus::Cancelled);
    }
}
