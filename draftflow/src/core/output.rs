//! The value a step's transformation returns.

use crate::context::ContextValue;
use std::collections::BTreeMap;

/// The result of running a step's transformation.
///
/// A step either produces values for its declared outputs or declines to
/// run (a step-level skip). Errors are reported through the `Err` side of
/// the step's `Result`, not here.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutput {
    /// Values for declared output keys. Declared keys left out resolve to `Absent`.
    Produced(BTreeMap<String, ContextValue>),
    /// The step had nothing to work with; every output resolves to `Absent`.
    Skip {
        /// Why the step skipped.
        reason: String,
    },
}

impl StepOutput {
    /// Creates an output with no values.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Produced(BTreeMap::new())
    }

    /// Creates an output with a single value.
    #[must_use]
    pub fn value(key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        Self::empty().with(key, value)
    }

    /// Creates an output that explicitly resolves a key to `Absent`.
    #[must_use]
    pub fn absent(key: impl Into<String>) -> Self {
        Self::empty().with(key, ContextValue::Absent)
    }

    /// Creates a step-level skip.
    #[must_use]
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skip {
            reason: reason.into(),
        }
    }

    /// Adds a value. Has no effect on a skip.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        if let Self::Produced(values) = &mut self {
            values.insert(key.into(), value.into());
        }
        self
    }

    /// Returns true if this is a step-level skip.
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::Skip { .. })
    }

    /// Gets a produced value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        match self {
            Self::Produced(values) => values.get(key),
            Self::Skip { .. } => None,
        }
    }
}

impl Default for StepOutput {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_output() {
        let output = StepOutput::value("draft", "hello");
        assert_eq!(output.get("draft").and_then(ContextValue::as_text), Some("hello"));
        assert!(!output.is_skip());
    }

    #[test]
    fn test_absent_output() {
        let output = StepOutput::absent("styleSummary");
        assert_eq!(output.get("styleSummary"), Some(&ContextValue::Absent));
    }

    #[test]
    fn test_skip_ignores_values() {
        let output = StepOutput::skip("nothing to do").with("draft", "ignored");
        assert!(output.is_skip());
        assert!(output.get("draft").is_none());
    }
}
