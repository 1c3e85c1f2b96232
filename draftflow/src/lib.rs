//! # Draftflow
//!
//! A dependency-driven workflow runner for asynchronous steps, with the
//! AI blog-draft pipeline built on top of it.
//!
//! Draftflow wires independently written steps into a graph over a shared
//! write-once context:
//!
//! - **Key-based wiring**: steps declare required inputs, optional inputs and outputs
//! - **Validated graphs**: ambiguous producers, unresolved inputs and cycles are rejected before anything runs
//! - **Concurrent execution**: every step whose inputs have resolved runs at once
//! - **Absence as a value**: a missing input cascades as `Absent` instead of an error
//! - **Failure isolation**: a failing step only affects its own descendants
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use draftflow::prelude::*;
//!
//! let pipeline = PipelineBuilder::new("greeting")
//!     .input("name")
//!     .step(
//!         StepDescriptor::new("greet", Arc::new(GreetStep))
//!             .requires(["name"])
//!             .produces(["greeting"]),
//!     )
//!     .terminal("greeting")
//!     .build()?;
//!
//! let run = pipeline.run([("name", ContextValue::text("Ada"))]).await?;
//! println!("{:?}", run.final_value());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod blog;
pub mod cancellation;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod steps;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{LogConfig, RunnerConfig};
    pub use crate::context::{
        AudioClip, ContextSnapshot, ContextStore, ContextValue, ExamplePost, Payload, StepInputs,
    };
    pub use crate::core::{RunStatus, StepOutput, StepRunRecord, StepStatus};
    pub use crate::errors::{
        ConfigurationError, ContractErrorInfo, CycleDetectedError, DraftflowError,
        DuplicateWriteError, InputAccessError, StepExecutionError, ValidationError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{
        run, Pipeline, PipelineBuilder, PipelineRun, RunOptions, StepDescriptor, StepGraph,
    };
    pub use crate::steps::{FnStep, Step};
    pub use std::sync::Arc;
}
