//! Contracts for the external model providers the blog steps call.

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

/// Error raised by a model provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// No API key is available.
    #[error("no API key configured")]
    MissingApiKey,

    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// The response body.
        body: String,
    },

    /// The response could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The provider refused the request.
    #[error("provider rejected the request: {0}")]
    Rejected(String),
}

/// Produces a text completion for a prompt.
#[async_trait]
pub trait TextCompletion: Send + Sync + Debug {
    /// Completes `prompt` with the given model.
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, ProviderError>;
}

/// Transcribes recorded speech to text.
#[async_trait]
pub trait SpeechToText: Send + Sync + Debug {
    /// Transcribes `audio` encoded as `mime_type` with the given model.
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        model: &str,
    ) -> Result<String, ProviderError>;
}
