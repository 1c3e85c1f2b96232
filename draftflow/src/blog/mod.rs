//! The blog-draft pipeline.
//!
//! Four steps turn written notes, a voice note and example posts into a
//! draft. The model providers are injected through the [`TextCompletion`]
//! and [`SpeechToText`] ports; the `openai` feature adds an HTTP client
//! implementing both.

mod config;
#[cfg(feature = "openai")]
mod openai;
mod pipeline;
mod ports;
pub mod prompts;
mod steps;

pub use config::{
    CredentialStore, Credentials, DraftModels, InMemoryCredentialStore, OpenAiConfig, API_KEY_ENV,
};
#[cfg(feature = "openai")]
pub use openai::OpenAiClient;
pub use pipeline::{blog_draft_pipeline, BlogDraftRequest};
pub use ports::{ProviderError, SpeechToText, TextCompletion};
pub use steps::{StructureNotes, TranscribeVoiceNote, UnderstandStyle, WriteDraft};

/// Context keys used by the blog-draft pipeline.
pub mod keys {
    /// Written notes (text). Initial input.
    pub const NOTES_TEXT: &str = "notesText";
    /// Recorded voice note (audio). Initial input.
    pub const AUDIO: &str = "audio";
    /// Style reference posts. Initial input.
    pub const EXAMPLE_POSTS: &str = "examplePosts";
    /// Transcript of the voice note.
    pub const TRANSCRIPT: &str = "transcript";
    /// Structured ideas for the post.
    pub const STRUCTURED_IDEAS: &str = "structuredIdeas";
    /// Description of the example posts' style.
    pub const STYLE_SUMMARY: &str = "styleSummary";
    /// The draft. Terminal key.
    pub const DRAFT: &str = "draft";
}

/// Step names used by the blog-draft pipeline.
pub mod names {
    /// Transcribes the voice note.
    pub const TRANSCRIBE_VOICE_NOTE: &str = "transcribe_voice_note";
    /// Structures notes and transcript.
    pub const STRUCTURE_NOTES: &str = "structure_notes";
    /// Analyzes the example posts.
    pub const UNDERSTAND_STYLE: &str = "understand_style";
    /// Writes the draft.
    pub const WRITE_DRAFT: &str = "write_draft";
}
