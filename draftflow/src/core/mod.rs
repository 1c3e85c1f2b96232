//! Core domain model types for draftflow.
//!
//! This module contains the fundamental types used throughout the runner:
//! - Step and run status enums
//! - The step output type
//! - Per-step run records

mod output;
mod record;
mod status;

pub use output::StepOutput;
pub use record::{StatusTransitionError, StepRunRecord};
pub use status::{RunStatus, StepStatus};
