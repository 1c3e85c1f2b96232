//! Run-scoped context for pipeline execution.
//!
//! This module provides:
//! - Present/Absent values with typed payloads
//! - The write-once context store and its snapshots
//! - Resolved, declaration-checked inputs for a single step

mod inputs;
mod store;
mod value;

pub use inputs::StepInputs;
pub use store::{ContextEntry, ContextSnapshot, ContextStore};
pub use value::{AudioClip, ContextValue, ExamplePost, Payload};
