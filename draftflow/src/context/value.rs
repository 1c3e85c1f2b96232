//! Present/Absent context values and their typed payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value stored under a context key.
///
/// `Absent` is a first-class value: it resolves a key without carrying data,
/// and steps that require it are skipped instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ContextValue {
    /// The key holds a payload.
    Present(Payload),
    /// The key resolved to nothing.
    #[default]
    Absent,
}

impl ContextValue {
    /// Wraps a payload.
    #[must_use]
    pub fn present(payload: impl Into<Payload>) -> Self {
        Self::Present(payload.into())
    }

    /// Creates a text value.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Present(Payload::Text(text.into()))
    }

    /// Returns true if the value holds a payload.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Returns true if the value is `Absent`.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns the payload, if present.
    #[must_use]
    pub const fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Present(payload) => Some(payload),
            Self::Absent => None,
        }
    }

    /// Returns the text payload, if this is present text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.payload().and_then(Payload::as_text)
    }

    /// Converts into an `Option` of the payload.
    #[must_use]
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            Self::Present(payload) => Some(payload),
            Self::Absent => None,
        }
    }
}

impl<T: Into<Payload>> From<Option<T>> for ContextValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, |v| Self::Present(v.into()))
    }
}

impl From<Payload> for ContextValue {
    fn from(value: Payload) -> Self {
        Self::Present(value)
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::Present(Payload::Text(value))
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<AudioClip> for ContextValue {
    fn from(value: AudioClip) -> Self {
        Self::Present(Payload::Audio(value))
    }
}

impl From<Vec<ExamplePost>> for ContextValue {
    fn from(value: Vec<ExamplePost>) -> Self {
        Self::Present(Payload::Posts(value))
    }
}

/// The data carried by a present context value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// Free text (notes, transcripts, drafts).
    Text(String),
    /// A recorded audio clip.
    Audio(AudioClip),
    /// An ordered list of reference posts.
    Posts(Vec<ExamplePost>),
    /// Arbitrary structured data.
    Json(serde_json::Value),
}

impl Payload {
    /// Returns a short name for the payload kind, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Audio(_) => "audio",
            Self::Posts(_) => "posts",
            Self::Json(_) => "json",
        }
    }

    /// Returns the text, if this is a text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the audio clip, if this is an audio payload.
    #[must_use]
    pub const fn as_audio(&self) -> Option<&AudioClip> {
        match self {
            Self::Audio(clip) => Some(clip),
            _ => None,
        }
    }

    /// Returns the posts, if this is a posts payload.
    #[must_use]
    pub fn as_posts(&self) -> Option<&[ExamplePost]> {
        match self {
            Self::Posts(posts) => Some(posts),
            _ => None,
        }
    }

    /// Returns the JSON value, if this is a JSON payload.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<AudioClip> for Payload {
    fn from(value: AudioClip) -> Self {
        Self::Audio(value)
    }
}

impl From<Vec<ExamplePost>> for Payload {
    fn from(value: Vec<ExamplePost>) -> Self {
        Self::Posts(value)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// An audio recording handed over by the capture widget.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioClip {
    /// Raw encoded audio bytes.
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    /// MIME type of the encoding, e.g. `audio/webm`.
    pub mime_type: String,
}

impl AudioClip {
    /// Creates a new audio clip.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Returns the clip size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the clip holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// A published post used as a style reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamplePost {
    /// The post title.
    pub title: String,
    /// The post body.
    pub content: String,
}

impl ExamplePost {
    /// Creates a new example post.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_default() {
        assert!(ContextValue::default().is_absent());
    }

    #[test]
    fn test_option_conversion() {
        let absent: ContextValue = Option::<String>::None.into();
        assert!(absent.is_absent());

        let present: ContextValue = Some("idea about X").into();
        assert_eq!(present.as_text(), Some("idea about X"));
    }

    #[test]
    fn test_empty_text_is_present() {
        let value = ContextValue::text("");
        assert!(value.is_present());
        assert_eq!(value.as_text(), Some(""));
    }

    #[test]
    fn test_payload_accessors_reject_other_kinds() {
        let payload = Payload::from(vec![ExamplePost::new("t", "c")]);
        assert_eq!(payload.kind(), "posts");
        assert!(payload.as_text().is_none());
        assert_eq!(payload.as_posts().map(<[ExamplePost]>::len), Some(1));
    }

    #[test]
    fn test_audio_serializes_as_base64() {
        let value = ContextValue::present(AudioClip::new(vec![1_u8, 2, 3], "audio/webm"));
        let json = serde_json::to_value(&value).unwrap();

        assert_eq!(json["state"], "present");
        assert_eq!(json["value"]["kind"], "audio");
        assert_eq!(json["value"]["data"]["bytes"], "AQID");

        let back: ContextValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_audio_debug_hides_bytes() {
        let clip = AudioClip::new(vec![0_u8; 2048], "audio/wav");
        let debug = format!("{clip:?}");
        assert!(debug.contains("<2048 bytes>"));
    }
}
