//! The four blog-draft steps.

use super::prompts::{combine_sources, draft_prompt, structure_notes_prompt, style_prompt};
use super::{keys, SpeechToText, TextCompletion};
use crate::context::StepInputs;
use crate::core::StepOutput;
use crate::steps::Step;
use anyhow::Context as _;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Turns a recorded voice note into text.
#[derive(Debug)]
pub struct TranscribeVoiceNote {
    transcriber: Arc<dyn SpeechToText>,
    model: String,
}

impl TranscribeVoiceNote {
    /// Creates the step.
    #[must_use]
    pub fn new(transcriber: Arc<dyn SpeechToText>, model: impl Into<String>) -> Self {
        Self {
            transcriber,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Step for TranscribeVoiceNote {
    async fn execute(&self, inputs: &StepInputs) -> anyhow::Result<StepOutput> {
        let audio = inputs.require_audio(keys::AUDIO)?;
        debug!(bytes = audio.len(), mime_type = %audio.mime_type, "Transcribing voice note");

        let transcript = self
            .transcriber
            .transcribe(&audio.bytes, &audio.mime_type, &self.model)
            .await
            .with_context(|| format!("transcribing voice note with {}", self.model))?;

        Ok(StepOutput::value(keys::TRANSCRIPT, transcript))
    }
}

/// Restructures written notes and a transcript into one list of ideas.
#[derive(Debug)]
pub struct StructureNotes {
    completion: Arc<dyn TextCompletion>,
    model: String,
}

impl StructureNotes {
    /// Creates the step.
    #[must_use]
    pub fn new(completion: Arc<dyn TextCompletion>, model: impl Into<String>) -> Self {
        Self {
            completion,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Step for StructureNotes {
    async fn execute(&self, inputs: &StepInputs) -> anyhow::Result<StepOutput> {
        let notes = inputs.text(keys::NOTES_TEXT)?;
        let transcript = inputs.text(keys::TRANSCRIPT)?;

        let Some(source) = combine_sources(notes, transcript) else {
            return Ok(StepOutput::skip("no written notes or transcript"));
        };

        let structured = self
            .completion
            .complete(&structure_notes_prompt(&source), &self.model)
            .await
            .with_context(|| format!("structuring notes with {}", self.model))?;

        Ok(StepOutput::value(keys::STRUCTURED_IDEAS, structured))
    }
}

/// Describes the writing style of the example posts.
#[derive(Debug)]
pub struct UnderstandStyle {
    completion: Arc<dyn TextCompletion>,
    model: String,
}

impl UnderstandStyle {
    /// Creates the step.
    #[must_use]
    pub fn new(completion: Arc<dyn TextCompletion>, model: impl Into<String>) -> Self {
        Self {
            completion,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Step for UnderstandStyle {
    async fn execute(&self, inputs: &StepInputs) -> anyhow::Result<StepOutput> {
        let posts = inputs.require_posts(keys::EXAMPLE_POSTS)?;
        if posts.is_empty() {
            return Ok(StepOutput::skip("no example posts to analyze"));
        }

        let summary = self
            .completion
            .complete(&style_prompt(posts), &self.model)
            .await
            .with_context(|| format!("analyzing style of {} posts with {}", posts.len(), self.model))?;

        Ok(StepOutput::value(keys::STYLE_SUMMARY, summary))
    }
}

/// Writes the draft from the structured ideas, in the analyzed style if known.
#[derive(Debug)]
pub struct WriteDraft {
    completion: Arc<dyn TextCompletion>,
    model: String,
}

impl WriteDraft {
    /// Creates the step.
    #[must_use]
    pub fn new(completion: Arc<dyn TextCompletion>, model: impl Into<String>) -> Self {
        Self {
            completion,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Step for WriteDraft {
    async fn execute(&self, inputs: &StepInputs) -> anyhow::Result<StepOutput> {
        let ideas = inputs.require_text(keys::STRUCTURED_IDEAS)?;
        let style = inputs.text(keys::STYLE_SUMMARY)?;

        let draft = self
            .completion
            .complete(&draft_prompt(ideas, style), &self.model)
            .await
            .with_context(|| format!("writing draft with {}", self.model))?;

        Ok(StepOutput::value(keys::DRAFT, draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AudioClip, ContextValue, ExamplePost};
    use crate::testing::{ScriptedCompletion, ScriptedTranscriber};
    use std::collections::BTreeMap;

    fn inputs(step: &str, values: &[(&str, ContextValue)]) -> StepInputs {
        let values: BTreeMap<String, ContextValue> = values
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        StepInputs::new(step, values)
    }

    #[tokio::test]
    async fn test_transcribe_passes_mime_and_model() {
        let transcriber = Arc::new(ScriptedTranscriber::replying("spoken idea"));
        let step = TranscribeVoiceNote::new(transcriber.clone(), "stt-model");
        let clip = AudioClip::new(vec![1, 2, 3], "audio/webm");

        let output = step
            .execute(&inputs("transcribe", &[(keys::AUDIO, clip.into())]))
            .await
            .unwrap();

        assert_eq!(output.get(keys::TRANSCRIPT), Some(&ContextValue::text("spoken idea")));
        let calls = transcriber.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].mime_type, "audio/webm");
        assert_eq!(calls[0].model, "stt-model");
        assert_eq!(calls[0].bytes, 3);
    }

    #[tokio::test]
    async fn test_structure_skips_without_sources() {
        let completion = Arc::new(ScriptedCompletion::replying("unused"));
        let step = StructureNotes::new(completion.clone(), "m");

        let output = step
            .execute(&inputs(
                "structure",
                &[
                    (keys::NOTES_TEXT, ContextValue::Absent),
                    (keys::TRANSCRIPT, ContextValue::Absent),
                ],
            ))
            .await
            .unwrap();

        assert!(output.is_skip());
        assert_eq!(completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_structure_uses_transcript_alone() {
        let completion = Arc::new(ScriptedCompletion::replying("- point"));
        let step = StructureNotes::new(completion.clone(), "m");

        let output = step
            .execute(&inputs(
                "structure",
                &[
                    (keys::NOTES_TEXT, ContextValue::Absent),
                    (keys::TRANSCRIPT, ContextValue::text("spoken")),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(output.get(keys::STRUCTURED_IDEAS), Some(&ContextValue::text("- point")));
        assert!(completion.prompts()[0].ends_with("spoken"));
    }

    #[tokio::test]
    async fn test_style_with_no_posts_makes_no_call() {
        let completion = Arc::new(ScriptedCompletion::replying("unused"));
        let step = UnderstandStyle::new(completion.clone(), "m");

        let output = step
            .execute(&inputs("style", &[(keys::EXAMPLE_POSTS, Vec::<ExamplePost>::new().into())]))
            .await
            .unwrap();

        assert!(output.is_skip());
        assert_eq!(completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_draft_provider_error_carries_context() {
        let completion = Arc::new(ScriptedCompletion::failing("quota exceeded"));
        let step = WriteDraft::new(completion, "gpt-4.1");

        let err = step
            .execute(&inputs(
                "draft",
                &[
                    (keys::STRUCTURED_IDEAS, ContextValue::text("ideas")),
                    (keys::STYLE_SUMMARY, ContextValue::Absent),
                ],
            ))
            .await
            .unwrap_err();

        let rendered = format!("{err:#}");
        assert!(rendered.contains("writing draft with gpt-4.1"));
        assert!(rendered.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_draft_rejects_wrong_payload_type() {
        let completion = Arc::new(ScriptedCompletion::replying("draft"));
        let step = WriteDraft::new(completion, "m");
        let posts: ContextValue = vec![ExamplePost::new("t", "c")].into();

        let result = step
            .execute(&inputs(
                "draft",
                &[
                    (keys::STRUCTURED_IDEAS, posts),
                    (keys::STYLE_SUMMARY, ContextValue::Absent),
                ],
            ))
            .await;

        assert!(result.is_err());
    }
}
