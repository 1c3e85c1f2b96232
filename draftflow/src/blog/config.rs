//! Model, credential and transport configuration for the blog steps.

use super::ProviderError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment variable read by [`Credentials::from_env`].
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Model identifiers used by each blog step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftModels {
    /// Model that structures notes.
    #[serde(default = "default_structure_model")]
    pub structure: String,
    /// Model that analyzes example posts.
    #[serde(default = "default_style_model")]
    pub style: String,
    /// Model that writes the draft.
    #[serde(default = "default_draft_model")]
    pub draft: String,
    /// Model that transcribes voice notes.
    #[serde(default = "default_transcription_model")]
    pub transcription: String,
}

fn default_structure_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_style_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_draft_model() -> String {
    "gpt-4.1".to_string()
}

fn default_transcription_model() -> String {
    "gpt-4o-mini-transcribe".to_string()
}

impl Default for DraftModels {
    fn default() -> Self {
        Self {
            structure: default_structure_model(),
            style: default_style_model(),
            draft: default_draft_model(),
            transcription: default_transcription_model(),
        }
    }
}

/// API credentials for a model provider.
///
/// Never serialized; `Debug` output hides the key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Creates credentials from an API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Reads the API key from `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MissingApiKey` if the variable is unset or blank.
    pub fn from_env() -> Result<Self, ProviderError> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(ProviderError::MissingApiKey),
        }
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Persists credentials between sessions.
pub trait CredentialStore: Send + Sync {
    /// Loads stored credentials.
    fn load(&self) -> Option<Credentials>;

    /// Stores credentials, replacing any previous ones.
    fn persist(&self, credentials: &Credentials);

    /// Removes stored credentials.
    fn clear(&self);

    /// Persists the credentials if `remember` is set, otherwise clears the store.
    fn remember(&self, credentials: &Credentials, remember: bool) {
        if remember {
            self.persist(credentials);
        } else {
            self.clear();
        }
    }
}

/// A process-local credential store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: RwLock<Option<Credentials>>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Option<Credentials> {
        self.credentials.read().clone()
    }

    fn persist(&self, credentials: &Credentials) {
        *self.credentials.write() = Some(credentials.clone());
    }

    fn clear(&self) {
        *self.credentials.write() = None;
    }
}

/// Transport settings for the OpenAI client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL of the API, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

const fn default_timeout_secs() -> u64 {
    120
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OpenAiConfig {
    /// Overrides the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_default_from_empty_json() {
        let models: DraftModels = serde_json::from_str("{}").unwrap();
        assert_eq!(models, DraftModels::default());
        assert_eq!(models.draft, "gpt-4.1");
        assert_eq!(models.transcription, "gpt-4o-mini-transcribe");
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials::new("sk-secret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("sk-secret"));
        assert_eq!(creds.api_key(), "sk-secret");
    }

    #[test]
    fn test_in_memory_store_remember() {
        let store = InMemoryCredentialStore::new();
        assert!(store.load().is_none());

        let creds = Credentials::new("sk-1");
        store.remember(&creds, true);
        assert_eq!(store.load(), Some(creds.clone()));

        store.remember(&creds, false);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_openai_config_trims_base_url() {
        let config = OpenAiConfig::default().with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }
}
