//! Pipeline builder with validation.

use super::{Pipeline, StepDescriptor, StepGraph};
use crate::errors::ConfigurationError;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

/// Builder for creating validated pipelines.
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    /// The pipeline name.
    name: String,
    /// Keys the caller supplies when running.
    inputs: BTreeSet<String>,
    /// Step descriptors in declaration order.
    steps: Vec<StepDescriptor>,
    /// The key whose value is the final result.
    terminal: Option<String>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declares an initial-input key.
    #[must_use]
    pub fn input(mut self, key: impl Into<String>) -> Self {
        self.inputs.insert(key.into());
        self
    }

    /// Declares several initial-input keys.
    #[must_use]
    pub fn inputs(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.inputs.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Adds a step.
    #[must_use]
    pub fn step(mut self, step: StepDescriptor) -> Self {
        self.steps.push(step);
        self
    }

    /// Adds several steps in order.
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = StepDescriptor>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Sets the terminal key.
    #[must_use]
    pub fn terminal(mut self, key: impl Into<String>) -> Self {
        self.terminal = Some(key.into());
        self
    }

    /// Returns the number of steps added so far.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Validates the configuration and builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found. No step runs until a
    /// pipeline has been built successfully.
    pub fn build(self) -> Result<Pipeline, ConfigurationError> {
        if self.steps.is_empty() {
            return Err(ConfigurationError::EmptyPipeline { pipeline: self.name });
        }
        let Some(terminal) = self.terminal else {
            return Err(ConfigurationError::MissingTerminal { pipeline: self.name });
        };

        let graph = StepGraph::build(self.inputs, self.steps)?;

        if !graph.is_known_key(&terminal) {
            return Err(ConfigurationError::UnknownTerminal { key: terminal });
        }

        for key in graph.initial_inputs() {
            if !graph.steps().iter().any(|s| s.reads(key)) && *key != terminal {
                warn!(pipeline = %self.name, key = %key, "Declared input is never read");
            }
        }

        Ok(Pipeline::new(self.name, Arc::new(graph), terminal))
    }
}
