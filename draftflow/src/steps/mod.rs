//! The step trait and closure-backed steps.
//!
//! A step is the asynchronous transformation behind a [`StepDescriptor`].
//! It sees only its declared inputs and returns values for its declared
//! outputs, a step-level skip, or an error.
//!
//! [`StepDescriptor`]: crate::pipeline::StepDescriptor

use crate::context::StepInputs;
use crate::core::StepOutput;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt::Debug;

/// Trait for step transformations.
#[async_trait]
pub trait Step: Send + Sync + Debug {
    /// Runs the transformation.
    ///
    /// Only called when every required input is present.
    async fn execute(&self, inputs: &StepInputs) -> anyhow::Result<StepOutput>;
}

type StepFn = dyn Fn(StepInputs) -> BoxFuture<'static, anyhow::Result<StepOutput>> + Send + Sync;

/// A step backed by an async closure.
///
/// The closure receives an owned copy of the inputs so the returned future
/// can be `'static`.
pub struct FnStep {
    label: String,
    func: Box<StepFn>,
}

impl FnStep {
    /// Creates a new closure-backed step.
    pub fn new<F, Fut>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(StepInputs) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<StepOutput>> + Send + 'static,
    {
        Self {
            label: label.into(),
            func: Box::new(move |inputs| Box::pin(func(inputs))),
        }
    }
}

impl Debug for FnStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStep").field("label", &self.label).finish()
    }
}

#[async_trait]
impl Step for FnStep {
    async fn execute(&self, inputs: &StepInputs) -> anyhow::Result<StepOutput> {
        (self.func)(inputs.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextValue;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_fn_step_reads_inputs() {
        let step = FnStep::new("upper", |inputs: StepInputs| async move {
            let text = inputs.require_text("in")?;
            Ok::<_, anyhow::Error>(StepOutput::value("out", text.to_uppercase()))
        });

        let mut values = BTreeMap::new();
        values.insert("in".to_string(), ContextValue::text("abc"));
        let output = step.execute(&StepInputs::new("upper", values)).await.unwrap();

        assert_eq!(output.get("out").and_then(ContextValue::as_text), Some("ABC"));
    }

    #[tokio::test]
    async fn test_fn_step_propagates_errors() {
        let step = FnStep::new("boom", |_inputs: StepInputs| async move {
            Err::<StepOutput, _>(anyhow::anyhow!("upstream unavailable"))
        });

        let err = step.execute(&StepInputs::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "upstream unavailable");
    }

    #[test]
    fn test_fn_step_debug() {
        let step = FnStep::new("noop", |_inputs: StepInputs| async { Ok(StepOutput::empty()) });
        assert!(format!("{step:?}").contains("noop"));
    }
}
