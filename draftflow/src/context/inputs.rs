//! Resolved inputs handed to a step.

use super::{AudioClip, ContextValue, ExamplePost, Payload};
use crate::errors::InputAccessError;
use std::collections::BTreeMap;

/// An immutable view of the keys a step declared as inputs.
///
/// Every declared key is resolved by the time the step runs: required keys
/// are `Present`, optional keys may be `Absent`. Reading a key the step did
/// not declare is an error.
#[derive(Debug, Clone, Default)]
pub struct StepInputs {
    step: String,
    values: BTreeMap<String, ContextValue>,
}

impl StepInputs {
    /// Creates inputs for a step.
    #[must_use]
    pub fn new(step: impl Into<String>, values: BTreeMap<String, ContextValue>) -> Self {
        Self {
            step: step.into(),
            values,
        }
    }

    /// Returns the name of the step these inputs belong to.
    #[must_use]
    pub fn step_name(&self) -> &str {
        &self.step
    }

    /// Gets the value for a declared key.
    ///
    /// # Errors
    ///
    /// Returns `InputAccessError::Undeclared` if the key is not an input of the step.
    pub fn get(&self, key: &str) -> Result<&ContextValue, InputAccessError> {
        self.values.get(key).ok_or_else(|| InputAccessError::Undeclared {
            step: self.step.clone(),
            key: key.to_string(),
        })
    }

    /// Returns true if a declared key holds a payload.
    #[must_use]
    pub fn is_present(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(ContextValue::is_present)
    }

    /// Reads an optional text input.
    ///
    /// # Errors
    ///
    /// Fails if the key is undeclared or holds a non-text payload.
    pub fn text(&self, key: &str) -> Result<Option<&str>, InputAccessError> {
        self.typed(key, "text", Payload::as_text)
    }

    /// Reads an optional audio input.
    ///
    /// # Errors
    ///
    /// Fails if the key is undeclared or holds a non-audio payload.
    pub fn audio(&self, key: &str) -> Result<Option<&AudioClip>, InputAccessError> {
        self.typed(key, "audio", Payload::as_audio)
    }

    /// Reads an optional list of posts.
    ///
    /// # Errors
    ///
    /// Fails if the key is undeclared or holds a non-posts payload.
    pub fn posts(&self, key: &str) -> Result<Option<&[ExamplePost]>, InputAccessError> {
        self.typed(key, "posts", Payload::as_posts)
    }

    /// Reads a text input that must be present.
    ///
    /// # Errors
    ///
    /// Fails if the key is undeclared, absent, or not text.
    pub fn require_text(&self, key: &str) -> Result<&str, InputAccessError> {
        self.text(key)?.ok_or_else(|| self.missing(key))
    }

    /// Reads an audio input that must be present.
    ///
    /// # Errors
    ///
    /// Fails if the key is undeclared, absent, or not audio.
    pub fn require_audio(&self, key: &str) -> Result<&AudioClip, InputAccessError> {
        self.audio(key)?.ok_or_else(|| self.missing(key))
    }

    /// Reads a list of posts that must be present.
    ///
    /// # Errors
    ///
    /// Fails if the key is undeclared, absent, or not a posts payload.
    pub fn require_posts(&self, key: &str) -> Result<&[ExamplePost], InputAccessError> {
        self.posts(key)?.ok_or_else(|| self.missing(key))
    }

    /// Iterates over all declared inputs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn typed<'a, T: ?Sized>(
        &'a self,
        key: &str,
        expected: &'static str,
        extract: impl FnOnce(&'a Payload) -> Option<&'a T>,
    ) -> Result<Option<&'a T>, InputAccessError> {
        let Some(payload) = self.get(key)?.payload() else {
            return Ok(None);
        };
        extract(payload)
            .map(Some)
            .ok_or_else(|| InputAccessError::TypeMismatch {
                step: self.step.clone(),
                key: key.to_string(),
                expected,
                found: payload.kind(),
            })
    }

    fn missing(&self, key: &str) -> InputAccessError {
        InputAccessError::Missing {
            step: self.step.clone(),
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> StepInputs {
        let mut values = BTreeMap::new();
        values.insert("notesText".to_string(), ContextValue::text("idea"));
        values.insert("transcript".to_string(), ContextValue::Absent);
        values.insert("examplePosts".to_string(), ContextValue::from(Vec::<ExamplePost>::new()));
        StepInputs::new("structure_notes", values)
    }

    #[test]
    fn test_reads_declared_text() {
        let inputs = inputs();
        assert_eq!(inputs.text("notesText").unwrap(), Some("idea"));
        assert_eq!(inputs.require_text("notesText").unwrap(), "idea");
    }

    #[test]
    fn test_absent_optional_reads_none() {
        let inputs = inputs();
        assert_eq!(inputs.text("transcript").unwrap(), None);
        assert!(!inputs.is_present("transcript"));
    }

    #[test]
    fn test_require_absent_fails() {
        let err = inputs().require_text("transcript").unwrap_err();
        assert!(matches!(err, InputAccessError::Missing { .. }));
    }

    #[test]
    fn test_undeclared_key_rejected() {
        let err = inputs().get("draft").unwrap_err();
        assert_eq!(
            err,
            InputAccessError::Undeclared {
                step: "structure_notes".to_string(),
                key: "draft".to_string(),
            }
        );
    }

    #[test]
    fn test_type_mismatch_reported() {
        let err = inputs().audio("notesText").unwrap_err();
        assert!(matches!(
            err,
            InputAccessError::TypeMismatch { expected: "audio", found: "text", .. }
        ));
    }

    #[test]
    fn test_empty_posts_are_present() {
        let inputs = inputs();
        assert_eq!(inputs.require_posts("examplePosts").unwrap().len(), 0);
    }
}
