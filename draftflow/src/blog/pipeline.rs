//! Wiring of the blog-draft pipeline.

use super::steps::{StructureNotes, TranscribeVoiceNote, UnderstandStyle, WriteDraft};
use super::{keys, names, DraftModels, SpeechToText, TextCompletion};
use crate::context::{AudioClip, ContextValue, ExamplePost};
use crate::errors::ConfigurationError;
use crate::pipeline::{Pipeline, PipelineBuilder, StepDescriptor};
use std::sync::Arc;

/// Builds the blog-draft pipeline.
///
/// ```text
/// audio ─▶ transcribe_voice_note ─▶ transcript ─┐
/// notesText ───────────────────────────────────┴▶ structure_notes ─▶ structuredIdeas ─┐
/// examplePosts ─▶ understand_style ─▶ styleSummary ───────────────────────────────────┴▶ write_draft ─▶ draft
/// ```
///
/// # Errors
///
/// Returns a configuration error if the wiring is invalid.
pub fn blog_draft_pipeline(
    completion: Arc<dyn TextCompletion>,
    transcriber: Arc<dyn SpeechToText>,
    models: &DraftModels,
) -> Result<Pipeline, ConfigurationError> {
    PipelineBuilder::new("blog_draft")
        .inputs([keys::NOTES_TEXT, keys::AUDIO, keys::EXAMPLE_POSTS])
        .step(
            StepDescriptor::new(
                names::TRANSCRIBE_VOICE_NOTE,
                Arc::new(TranscribeVoiceNote::new(transcriber, &models.transcription)),
            )
            .requires([keys::AUDIO])
            .produces([keys::TRANSCRIPT]),
        )
        .step(
            StepDescriptor::new(
                names::STRUCTURE_NOTES,
                Arc::new(StructureNotes::new(Arc::clone(&completion), &models.structure)),
            )
            .optional([keys::NOTES_TEXT, keys::TRANSCRIPT])
            .produces([keys::STRUCTURED_IDEAS]),
        )
        .step(
            StepDescriptor::new(
                names::UNDERSTAND_STYLE,
                Arc::new(UnderstandStyle::new(Arc::clone(&completion), &models.style)),
            )
            .requires([keys::EXAMPLE_POSTS])
            .produces([keys::STYLE_SUMMARY]),
        )
        .step(
            StepDescriptor::new(
                names::WRITE_DRAFT,
                Arc::new(WriteDraft::new(completion, &models.draft)),
            )
            .requires([keys::STRUCTURED_IDEAS])
            .optional([keys::STYLE_SUMMARY])
            .produces([keys::DRAFT]),
        )
        .terminal(keys::DRAFT)
        .build()
}

/// Caller data for one blog-draft run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogDraftRequest {
    /// Written notes, if any.
    pub notes: Option<String>,
    /// A recorded voice note, if any.
    pub audio: Option<AudioClip>,
    /// Style reference posts; may be empty.
    pub example_posts: Vec<ExamplePost>,
}

impl BlogDraftRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the written notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the voice note.
    #[must_use]
    pub fn with_audio(mut self, audio: AudioClip) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Adds a style reference post.
    #[must_use]
    pub fn with_example(mut self, post: ExamplePost) -> Self {
        self.example_posts.push(post);
        self
    }

    /// Converts the request into initial inputs.
    #[must_use]
    pub fn into_inputs(self) -> Vec<(&'static str, ContextValue)> {
        vec![
            (keys::NOTES_TEXT, self.notes.into()),
            (keys::AUDIO, self.audio.into()),
            (keys::EXAMPLE_POSTS, self.example_posts.into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedCompletion, ScriptedTranscriber};

    #[test]
    fn test_pipeline_shape() {
        let pipeline = blog_draft_pipeline(
            Arc::new(ScriptedCompletion::replying("x")),
            Arc::new(ScriptedTranscriber::replying("y")),
            &DraftModels::default(),
        )
        .unwrap();

        let graph = pipeline.graph();
        assert_eq!(pipeline.terminal_key(), keys::DRAFT);
        assert_eq!(graph.step_count(), 4);
        assert_eq!(
            graph.dependencies_of(names::WRITE_DRAFT),
            vec![names::STRUCTURE_NOTES, names::UNDERSTAND_STYLE]
        );
        assert_eq!(
            graph.dependencies_of(names::STRUCTURE_NOTES),
            vec![names::TRANSCRIBE_VOICE_NOTE]
        );
        assert_eq!(
            graph.ancestors_of_key(keys::DRAFT).len(),
            4,
            "every step feeds the draft"
        );
    }

    #[test]
    fn test_request_into_inputs() {
        let inputs = BlogDraftRequest::new().with_notes("idea").into_inputs();

        assert_eq!(inputs[0], (keys::NOTES_TEXT, ContextValue::text("idea")));
        assert_eq!(inputs[1], (keys::AUDIO, ContextValue::Absent));
        assert_eq!(
            inputs[2],
            (keys::EXAMPLE_POSTS, ContextValue::from(Vec::<ExamplePost>::new()))
        );
    }
}
