//! Lifecycle events emitted during a pipeline run.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event type names emitted by the executor.
pub mod event_types {
    /// A run began executing.
    pub const PIPELINE_STARTED: &str = "pipeline.started";
    /// A run finished; carries the overall status.
    pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
    /// The caller cancelled a run.
    pub const PIPELINE_CANCELLED: &str = "pipeline.cancelled";
    /// A step's transformation was launched.
    pub const STEP_STARTED: &str = "step.started";
    /// A step produced its outputs.
    pub const STEP_SUCCEEDED: &str = "step.succeeded";
    /// A step was skipped.
    pub const STEP_SKIPPED: &str = "step.skipped";
    /// A step's transformation failed.
    pub const STEP_FAILED: &str = "step.failed";
}
