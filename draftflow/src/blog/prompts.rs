//! Prompt templates for the blog steps.

use crate::context::ExamplePost;

/// Builds the prompt that structures raw notes.
#[must_use]
pub fn structure_notes_prompt(notes: &str) -> String {
    format!(
        "Take the notes below that are a users thoughts about a blogpost and structure them. \
Make sure to include everything from the original in the structured version.\n\
Reply only with the structured version, no other text.\n\n{notes}"
    )
}

/// Merges written notes and a voice-note transcript into one text.
///
/// Returns `None` when neither source is available.
#[must_use]
pub fn combine_sources(notes: Option<&str>, transcript: Option<&str>) -> Option<String> {
    match (notes, transcript) {
        (Some(notes), Some(transcript)) => Some(format!(
            "## Written notes\n{notes}\n\n## Voice note transcript\n{transcript}"
        )),
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (None, None) => None,
    }
}

const STYLE_ASPECTS: &str = "\
1. Vocabulary & Word Choice: Common words, formality, jargon.
2. Sentence Structure: Typical length, complexity, punctuation habits.
3. Paragraph & Formatting Style: Paragraph length, use of headings/lists, formatting choices.
4. Tone & Voice: Overall mood, point of view, directness.
5. Rhythm & Flow: Repetition, cadence, pacing.
6. Storytelling Techniques: Anecdotes, dialogue, imagery.
7. Structural Patterns: Article structure, transitions.
8. Use of Questions & Calls to Action: Engagement tactics.
9. Recurring Themes & Motifs: Topics, analogies, cultural references.
10. Humor & Playfulness: Use of jokes, puns, or self-deprecation.";

/// Builds the style-analysis prompt over numbered example posts.
#[must_use]
pub fn style_prompt(posts: &[ExamplePost]) -> String {
    let examples = posts
        .iter()
        .enumerate()
        .map(|(i, post)| format!("Post {}\nTitle: {}\nContent: {}", i + 1, post.title, post.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Analyze the following blog posts and identify the writing style. \
Take a look at the following aspects:\n{STYLE_ASPECTS}\n\n\
Reply only with a description of the style, no other text.\n\n\
Here are the examples:\n{examples}\n"
    )
}

const NEUTRAL_STYLE: &str =
    "No style reference is available. Write in a clear, friendly and neutral voice.";

/// Builds the draft-writing prompt.
#[must_use]
pub fn draft_prompt(ideas: &str, style: Option<&str>) -> String {
    let style = style.unwrap_or(NEUTRAL_STYLE);
    format!(
        "Write a blogpost draft based on the following idea and style.\n\
Return only the draft and not other text.\n\n## Idea\n{ideas}\n\n## Style\n{style}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_combine_sources() {
        assert_eq!(combine_sources(None, None), None);
        assert_eq!(combine_sources(Some("notes"), None).as_deref(), Some("notes"));
        assert_eq!(combine_sources(None, Some("spoken")).as_deref(), Some("spoken"));

        let both = combine_sources(Some("notes"), Some("spoken")).unwrap();
        assert!(both.contains("notes"));
        assert!(both.contains("spoken"));
    }

    #[test]
    fn test_empty_notes_are_still_a_source() {
        assert_eq!(combine_sources(Some(""), None).as_deref(), Some(""));
    }

    #[test]
    fn test_style_prompt_numbers_posts() {
        let posts = vec![
            ExamplePost::new("First", "Hello"),
            ExamplePost::new("Second", "World"),
        ];
        let prompt = style_prompt(&posts);

        assert!(prompt.contains("Post 1\nTitle: First\nContent: Hello\n\nPost 2\nTitle: Second"));
        assert!(prompt.contains("10. Humor & Playfulness"));
    }

    #[test]
    fn test_draft_prompt_sections() {
        let prompt = draft_prompt("an idea", Some("terse"));
        assert!(prompt.ends_with("## Idea\nan idea\n\n## Style\nterse"));

        let neutral = draft_prompt("an idea", None);
        assert!(neutral.contains(NEUTRAL_STYLE));
    }

    #[test]
    fn test_structure_prompt_keeps_notes() {
        let prompt = structure_notes_prompt("raw thoughts");
        assert!(prompt.starts_with("Take the notes below"));
        assert!(prompt.ends_with("\n\nraw thoughts"));
    }
}
