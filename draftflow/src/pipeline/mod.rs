//! Pipeline building and execution.
//!
//! This module provides:
//! - Step descriptors
//! - Graph construction with validation
//! - The concurrent executor
//! - Run results

mod builder;
mod executor;
mod graph;
mod result;
mod runner;
mod spec;


pub use builder::PipelineBuilder;
pub(crate) use executor::Executor;
pub use executor::RunOptions;
pub use graph::StepGraph;
pub use result::PipelineRun;
pub use runner::{run, Pipeline};
pub use spec::StepDescriptor;
