//! Step descriptors: the declared interface of each step.

use crate::errors::ConfigurationError;
use crate::steps::Step;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Declares a step's name, input keys, output keys and transformation.
///
/// Steps are wired together only through these key sets: a consumer depends
/// on the producer of every key it reads.
#[derive(Debug, Clone)]
pub struct StepDescriptor {
    /// The unique name of the step.
    pub name: String,
    /// Keys that must be present for the step to run.
    pub required_inputs: BTreeSet<String>,
    /// Keys the step reads if present.
    pub optional_inputs: BTreeSet<String>,
    /// Keys the step writes.
    pub outputs: BTreeSet<String>,
    /// The step implementation.
    pub runner: Arc<dyn Step>,
}

impl StepDescriptor {
    /// Creates a descriptor with no inputs or outputs.
    #[must_use]
    pub fn new(name: impl Into<String>, runner: Arc<dyn Step>) -> Self {
        Self {
            name: name.into(),
            required_inputs: BTreeSet::new(),
            optional_inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            runner,
        }
    }

    /// Adds required input keys.
    #[must_use]
    pub fn requires(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.required_inputs.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Adds optional input keys.
    #[must_use]
    pub fn optional(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.optional_inputs.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Adds output keys.
    #[must_use]
    pub fn produces(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.outputs.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Iterates over every input key, required first.
    pub fn inputs(&self) -> impl Iterator<Item = &String> {
        self.required_inputs.iter().chain(self.optional_inputs.iter())
    }

    /// Returns true if the step reads the key.
    #[must_use]
    pub fn reads(&self, key: &str) -> bool {
        self.required_inputs.contains(key) || self.optional_inputs.contains(key)
    }

    /// Validates the descriptor on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, a key is both required and
    /// optional, or the step reads its own output.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::InvalidStep {
                step: self.name.clone(),
                reason: "step name cannot be empty or whitespace-only".to_string(),
            });
        }

        if let Some(key) = self.required_inputs.intersection(&self.optional_inputs).next() {
            return Err(ConfigurationError::InvalidStep {
                step: self.name.clone(),
                reason: format!("key '{key}' is declared both required and optional"),
            });
        }

        if self.outputs.iter().any(|key| self.reads(key)) {
            return Err(crate::errors::CycleDetectedError::new(vec![
                self.name.clone(),
                self.name.clone(),
            ])
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockStep;

    fn runner() -> Arc<dyn Step> {
        Arc::new(MockStep::new())
    }

    #[test]
    fn test_descriptor_creation() {
        let desc = StepDescriptor::new("write_draft", runner())
            .requires(["structuredIdeas"])
            .optional(["styleSummary"])
            .produces(["draft"]);

        assert_eq!(desc.name, "write_draft");
        assert!(desc.reads("structuredIdeas"));
        assert!(desc.reads("styleSummary"));
        assert!(!desc.reads("draft"));
        assert_eq!(desc.inputs().count(), 2);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let desc = StepDescriptor::new("  ", runner());
        assert!(matches!(desc.validate(), Err(ConfigurationError::InvalidStep { .. })));
    }

    #[test]
    fn test_required_and_optional_overlap_rejected() {
        let desc = StepDescriptor::new("s", runner())
            .requires(["a"])
            .optional(["a"])
            .produces(["b"]);
        assert!(matches!(desc.validate(), Err(ConfigurationError::InvalidStep { .. })));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let desc = StepDescriptor::new("loop", runner()).requires(["x"]).produces(["x"]);
        let err = desc.validate().unwrap_err();
        assert_eq!(err.code(), "CONFIG-003-CYCLE");
    }
}
