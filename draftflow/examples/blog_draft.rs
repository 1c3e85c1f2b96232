//! Drafts a blog post from notes on the command line using the OpenAI API.
//!
//! ```text
//! OPENAI_API_KEY=... cargo run --example blog_draft -- "notes about a post" [example-post.md ...]
//! ```

use draftflow::blog::{blog_draft_pipeline, BlogDraftRequest, DraftModels, OpenAiClient};
use draftflow::config::LogConfig;
use draftflow::context::ExamplePost;
use draftflow::observability::init_tracing;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&LogConfig::default());

    let mut args = std::env::args().skip(1);
    let notes = args.next().unwrap_or_default();

    let mut request = BlogDraftRequest::new();
    if !notes.trim().is_empty() {
        request = request.with_notes(notes);
    }
    for path in args {
        let content = std::fs::read_to_string(&path)?;
        request = request.with_example(ExamplePost::new(path, content));
    }

    let client = Arc::new(OpenAiClient::from_env()?);
    let pipeline = blog_draft_pipeline(client.clone(), client, &DraftModels::default())?;
    let run = pipeline.run(request.into_inputs()).await?;

    match run.final_value().as_text() {
        Some(draft) => println!("{draft}"),
        None => {
            eprintln!("No draft produced (status: {})", run.status);
            for record in run.blockers() {
                eprintln!(
                    "  {}: {}",
                    record.step,
                    record
                        .error
                        .as_deref()
                        .or(record.skip_reason.as_deref())
                        .unwrap_or("no reason recorded")
                );
            }
        }
    }
    Ok(())
}
