//! OpenAI transport for the blog steps.

use super::{Credentials, OpenAiConfig, ProviderError, SpeechToText, TextCompletion};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Client for the OpenAI Responses and audio transcription endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    credentials: Credentials,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Transport` if the HTTP client cannot be built.
    pub fn new(credentials: Credentials, config: OpenAiConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            credentials,
            config,
        })
    }

    /// Creates a client with the default configuration and the key from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MissingApiKey` if no key is set.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(Credentials::from_env()?, OpenAiConfig::default())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url)
    }
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize, Debug)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize, Debug)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize, Debug)]
struct ContentPart {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Concatenates every `output_text` part of a Responses API body.
fn output_text(body: ResponsesBody) -> Option<String> {
    let parts: Vec<String> = body
        .output
        .into_iter()
        .flat_map(|item| item.content)
        .filter(|part| part.r#type == "output_text")
        .filter_map(|part| part.text)
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.concat())
    }
}

async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "OpenAI request failed");
    Err(ProviderError::Http {
        status: status.as_u16(),
        body,
    })
}

/// File name with an extension matching the MIME type, e.g. `audio.webm`.
fn audio_file_name(mime_type: &str) -> String {
    let subtype = mime_type
        .split(';')
        .next()
        .and_then(|essence| essence.split('/').nth(1))
        .filter(|s| !s.is_empty())
        .unwrap_or("webm");
    format!("audio.{subtype}")
}

#[async_trait]
impl TextCompletion for OpenAiClient {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, ProviderError> {
        debug!(model = %model, prompt_chars = prompt.len(), "Requesting completion");

        let response = self
            .http
            .post(self.url("responses"))
            .bearer_auth(self.credentials.api_key())
            .json(&ResponsesRequest {
                model,
                input: prompt,
            })
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let body: ResponsesBody = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        output_text(body)
            .ok_or_else(|| ProviderError::InvalidResponse("response has no output text".to_string()))
    }
}

#[async_trait]
impl SpeechToText for OpenAiClient {
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        model: &str,
    ) -> Result<String, ProviderError> {
        debug!(model = %model, bytes = audio.len(), mime_type = %mime_type, "Requesting transcription");

        let file = Part::bytes(audio.to_vec())
            .file_name(audio_file_name(mime_type))
            .mime_str(mime_type)
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("model", model.to_string())
            .text("response_format", "text");

        let response = self
            .http
            .post(self.url("audio/transcriptions"))
            .bearer_auth(self.credentials.api_key())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let text = check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(text.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_text_joins_text_parts() {
        let body: ResponsesBody = serde_json::from_value(serde_json::json!({
            "output": [
                {"type": "reasoning", "content": []},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "Hello, "},
                    {"type": "refusal", "refusal": "no"},
                    {"type": "output_text", "text": "world"}
                ]}
            ]
        }))
        .unwrap();

        assert_eq!(output_text(body).as_deref(), Some("Hello, world"));
    }

    #[test]
    fn test_output_text_missing() {
        let body: ResponsesBody = serde_json::from_value(serde_json::json!({ "output": [] })).unwrap();
        assert_eq!(output_text(body), None);
    }

    #[test]
    fn test_audio_file_name() {
        assert_eq!(audio_file_name("audio/webm"), "audio.webm");
        assert_eq!(audio_file_name("audio/ogg; codecs=opus"), "audio.ogg");
        assert_eq!(audio_file_name("garbage"), "audio.webm");
    }

    #[test]
    fn test_client_url() {
        let client = OpenAiClient::new(
            Credentials::new("sk-test"),
            OpenAiConfig::default().with_base_url("http://localhost:9999/v1/"),
        )
        .unwrap();
        assert_eq!(client.url("responses"), "http://localhost:9999/v1/responses");
    }
}
