//! Scripted model providers for testing the blog steps.

use crate::blog::{ProviderError, SpeechToText, TextCompletion};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;

type Responder = dyn Fn(&str, &str) -> Result<String, ProviderError> + Send + Sync;

/// A text-completion provider that answers from a script and records prompts.
pub struct ScriptedCompletion {
    responder: Box<Responder>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedCompletion {
    /// Answers every prompt by calling `responder(prompt, model)`.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str, &str) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every prompt with the same text.
    #[must_use]
    pub fn replying(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::from_fn(move |_, _| Ok(reply.clone()))
    }

    /// Answers every prompt with `"<model> reply"`.
    #[must_use]
    pub fn echoing_model() -> Self {
        Self::from_fn(|_, model| Ok(format!("{model} reply")))
    }

    /// Rejects every prompt.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_fn(move |_, _| Err(ProviderError::Rejected(message.clone())))
    }

    /// Waits `delay` before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns the number of completions requested.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns every prompt, in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(p, _)| p.clone()).collect()
    }

    /// Returns every model requested, in call order.
    #[must_use]
    pub fn models(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(_, m)| m.clone()).collect()
    }
}

impl fmt::Debug for ScriptedCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedCompletion")
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, ProviderError> {
        self.calls.lock().push((prompt.to_string(), model.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(prompt, model)
    }
}

/// One recorded transcription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionCall {
    /// Size of the audio buffer.
    pub bytes: usize,
    /// MIME type passed along with the audio.
    pub mime_type: String,
    /// The requested model.
    pub model: String,
}

/// A speech-to-text provider that answers from a script and records calls.
#[derive(Debug)]
pub struct ScriptedTranscriber {
    reply: Result<String, ProviderError>,
    calls: Mutex<Vec<TranscriptionCall>>,
}

impl ScriptedTranscriber {
    /// Returns the same transcript for every clip.
    #[must_use]
    pub fn replying(transcript: impl Into<String>) -> Self {
        Self {
            reply: Ok(transcript.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every request.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(ProviderError::Rejected(message.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of transcriptions requested.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns every recorded request.
    #[must_use]
    pub fn calls(&self) -> Vec<TranscriptionCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SpeechToText for ScriptedTranscriber {
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        model: &str,
    ) -> Result<String, ProviderError> {
        self.calls.lock().push(TranscriptionCall {
            bytes: audio.len(),
            mime_type: mime_type.to_string(),
            model: model.to_string(),
        });
        self.reply.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_completion_records_prompts() {
        let completion = ScriptedCompletion::echoing_model();
        let reply = completion.complete("hello", "small").await.unwrap();

        assert_eq!(reply, "small reply");
        assert_eq!(completion.prompts(), vec!["hello"]);
        assert_eq!(completion.models(), vec!["small"]);
    }

    #[tokio::test]
    async fn test_failing_transcriber_still_counts() {
        let transcriber = ScriptedTranscriber::failing("offline");
        let err = transcriber.transcribe(&[0; 4], "audio/wav", "m").await.unwrap_err();

        assert_eq!(err, ProviderError::Rejected("offline".to_string()));
        assert_eq!(transcriber.call_count(), 1);
    }
}
