//! Testing utilities for draftflow pipelines.
//!
//! This module provides:
//! - Mock steps
//! - Scripted model providers
//! - Assertions over run traces

mod assertions;
mod mocks;
mod providers;

pub use assertions::{
    assert_all_terminal, assert_final_text, assert_not_invoked, assert_started_after,
    assert_step_status,
};
pub use mocks::{FailingStep, MockStep, PanickingStep, SlowStep};
pub use providers::{ScriptedCompletion, ScriptedTranscriber, TranscriptionCall};
