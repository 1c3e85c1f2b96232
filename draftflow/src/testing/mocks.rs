//! Mock steps for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::context::StepInputs;
use crate::core::StepOutput;
use crate::steps::Step;

/// A mock step that records calls and returns a configurable output.
#[derive(Debug, Default)]
pub struct MockStep {
    output: Mutex<StepOutput>,
    delay: Option<Duration>,
    calls: Mutex<Vec<StepInputs>>,
}

impl MockStep {
    /// Creates a mock step that produces nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock step that returns the given output.
    #[must_use]
    pub fn returning(output: StepOutput) -> Self {
        Self {
            output: Mutex::new(output),
            ..Self::default()
        }
    }

    /// Creates a mock step that writes one text value.
    #[must_use]
    pub fn producing(key: impl Into<String>, text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self::returning(StepOutput::value(key, text))
    }

    /// Delays every call by `delay` before returning.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the output to return.
    pub fn set_output(&self, output: StepOutput) {
        *self.output.lock() = output;
    }

    /// Returns the number of times the step was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the inputs of every call, in order.
    #[must_use]
    pub fn recorded_inputs(&self) -> Vec<StepInputs> {
        self.calls.lock().clone()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl Step for MockStep {
    async fn execute(&self, inputs: &StepInputs) -> anyhow::Result<StepOutput> {
        self.calls.lock().push(inputs.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.output.lock().clone())
    }
}

/// A step that always returns an error.
#[derive(Debug)]
pub struct FailingStep {
    error: String,
}

impl FailingStep {
    /// Creates a new failing step.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[async_trait]
impl Step for FailingStep {
    async fn execute(&self, _inputs: &StepInputs) -> anyhow::Result<StepOutput> {
        Err(anyhow::anyhow!("{}", self.error))
    }
}

/// A step that panics when run.
#[derive(Debug, Default)]
pub struct PanickingStep;

#[async_trait]
impl Step for PanickingStep {
    async fn execute(&self, _inputs: &StepInputs) -> anyhow::Result<StepOutput> {
        panic!("step exploded");
    }
}

/// A step that sleeps before producing its output.
#[derive(Debug)]
pub struct SlowStep {
    delay: Duration,
    output: StepOutput,
}

impl SlowStep {
    /// Creates a slow step producing nothing.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            output: StepOutput::empty(),
        }
    }

    /// Creates a slow step with delay in milliseconds.
    #[must_use]
    pub const fn with_delay_ms(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Sets the output returned after the delay.
    #[must_use]
    pub fn producing(mut self, output: StepOutput) -> Self {
        self.output = output;
        self
    }
}

#[async_trait]
impl Step for SlowStep {
    async fn execute(&self, _inputs: &StepInputs) -> anyhow::Result<StepOutput> {
        tokio::time::sleep(self.delay).await;
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextValue;
    use std::collections::BTreeMap;

    fn inputs(step: &str) -> StepInputs {
        StepInputs::new(step, BTreeMap::new())
    }

    #[tokio::test]
    async fn test_mock_step() {
        let step = MockStep::producing("out", "hello");

        let output = step.execute(&inputs("mock")).await.unwrap();
        assert_eq!(output.get("out"), Some(&ContextValue::text("hello")));
        assert_eq!(step.call_count(), 1);

        step.set_output(StepOutput::skip("nothing to do"));
        let output = step.execute(&inputs("mock")).await.unwrap();
        assert!(output.is_skip());
        assert_eq!(step.call_count(), 2);
        assert_eq!(step.recorded_inputs()[0].step_name(), "mock");

        step.reset();
        assert_eq!(step.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_step() {
        let step = FailingStep::new("boom");
        let err = step.execute(&inputs("fail")).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_slow_step() {
        let step = SlowStep::with_delay_ms(10);

        let start = std::time::Instant::now();
        let output = step.execute(&inputs("slow")).await.unwrap();

        assert_eq!(output, StepOutput::empty());
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
