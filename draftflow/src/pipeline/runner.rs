//! Runnable pipelines and the one-shot `run` entry point.

use super::{Executor, PipelineBuilder, PipelineRun, RunOptions, StepDescriptor, StepGraph};
use crate::context::ContextValue;
use crate::errors::{ConfigurationError, DraftflowError, DuplicateWriteError, ValidationError};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// A validated pipeline, ready to run any number of times.
///
/// Each run gets its own context store; nothing carries over between runs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    graph: Arc<StepGraph>,
    terminal_key: String,
}

impl Pipeline {
    pub(crate) fn new(name: String, graph: Arc<StepGraph>, terminal_key: String) -> Self {
        Self {
            name,
            graph,
            terminal_key,
        }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the terminal key.
    #[must_use]
    pub fn terminal_key(&self) -> &str {
        &self.terminal_key
    }

    /// Returns the validated step graph.
    #[must_use]
    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    /// Returns the declared initial-input keys.
    #[must_use]
    pub fn declared_inputs(&self) -> &BTreeSet<String> {
        self.graph.initial_inputs()
    }

    /// Checks caller-supplied keys against the declaration.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateWrite` if a supplied key is also a step output, or
    /// `UnknownInput` for any other key the pipeline does not declare.
    pub fn validate_inputs<'k>(
        &self,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> Result<(), DraftflowError> {
        for key in keys {
            if let Some(producer) = self.graph.producer_of(key) {
                return Err(ConfigurationError::from(
                    DuplicateWriteError::new(key).with_writer(&producer.name),
                )
                .into());
            }
            if !self.graph.initial_inputs().contains(key) {
                return Err(ValidationError::UnknownInput {
                    key: key.to_string(),
                    declared: self.graph.initial_inputs().iter().cloned().collect(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Runs the pipeline with default options.
    ///
    /// Declared inputs that are not supplied resolve to `Absent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs fail validation. Step failures are
    /// recorded in the returned trace, never returned here.
    pub async fn run<K, V>(
        &self,
        inputs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<PipelineRun, DraftflowError>
    where
        K: Into<String>,
        V: Into<ContextValue>,
    {
        self.run_with(inputs, RunOptions::default()).await
    }

    /// Runs the pipeline with explicit options.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run`].
    pub async fn run_with<K, V>(
        &self,
        inputs: impl IntoIterator<Item = (K, V)>,
        options: RunOptions,
    ) -> Result<PipelineRun, DraftflowError>
    where
        K: Into<String>,
        V: Into<ContextValue>,
    {
        let mut supplied = BTreeMap::new();
        for (key, value) in inputs {
            let key = key.into();
            if supplied.contains_key(&key) {
                return Err(ConfigurationError::from(DuplicateWriteError::new(key)).into());
            }
            supplied.insert(key, value.into());
        }
        self.validate_inputs(supplied.keys().map(String::as_str))?;

        for key in self.graph.initial_inputs() {
            supplied.entry(key.clone()).or_insert(ContextValue::Absent);
        }

        Executor::new(&self.graph, &self.name, &self.terminal_key, options)
            .execute(supplied)
            .await
    }
}

/// Builds and runs an ad-hoc pipeline in one call.
///
/// The declared initial inputs are every key some step reads but no step
/// produces, plus the terminal key when no step produces it.
///
/// # Errors
///
/// Returns a configuration error for a malformed graph or a supplied key
/// that a step also produces, and a validation error for any other key no
/// step reads.
pub async fn run<K, V>(
    initial_inputs: impl IntoIterator<Item = (K, V)>,
    steps: Vec<StepDescriptor>,
    terminal_key: impl Into<String>,
) -> Result<PipelineRun, DraftflowError>
where
    K: Into<String>,
    V: Into<ContextValue>,
{
    let terminal_key = terminal_key.into();
    let produced: BTreeSet<&String> = steps.iter().flat_map(|s| s.outputs.iter()).collect();

    let mut declared: BTreeSet<String> = steps
        .iter()
        .flat_map(StepDescriptor::inputs)
        .filter(|key| !produced.contains(key))
        .cloned()
        .collect();
    if !produced.contains(&terminal_key) {
        declared.insert(terminal_key.clone());
    }

    let pipeline = PipelineBuilder::new("pipeline")
        .inputs(declared)
        .steps(steps)
        .terminal(terminal_key)
        .build()?;

    pipeline.run(initial_inputs).await
}
