//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is content-centric, not file-centric: the primary line for every
//! entity (stream, story) is its semantic identity — name, title,
//! positional index — with source file names as secondary context on
//! indented lines. The output reads as a content inventory while still
//! letting users trace entries back to files.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Streams
//! 001 stories (3 stories)
//!     001 Hello, World
//!         Source: hello-world.md
//!         By: Alice Cooper  On: 2013/1/1
//!     002 A Plain Note
//!         Source: plain-note.txt
//! 002 news: load failed (failed to fetch story news/gone.md: ...)
//!
//! Checked 2 streams, 3 stories
//! ```
//!
//! ## Build events (streamed while rendering)
//!
//! ```text
//! Loaded stories (3 stories)
//!     hello-world.md: rendered
//!     broken.md: render failed (body: markup conversion failed: ...)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::generate::{BuildSummary, LoadedStream, RenderEvent};
use chrono::Datelike;

/// Header line for an indexed entity: `NNN title (detail)`.
fn entity_header(index: usize, title: &str, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!("{:03} {} ({})", index, title, detail),
        None => format!("{:03} {}", index, title),
    }
}

fn story_count(count: usize) -> String {
    if count == 1 {
        "1 story".to_string()
    } else {
        format!("{count} stories")
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(loaded: &[LoadedStream]) -> Vec<String> {
    let mut lines = vec!["Streams".to_string()];
    let mut total_stories = 0;

    for (i, stream) in loaded.iter().enumerate() {
        match &stream.outcome {
            Ok(stories) => {
                total_stories += stories.len();
                lines.push(entity_header(
                    i + 1,
                    &stream.spec.name,
                    Some(&story_count(stories.len())),
                ));
                for (j, story) in stories.iter().enumerate() {
                    lines.push(format!("    {}", entity_header(j + 1, &story.title, None)));
                    lines.push(format!("        Source: {}", story.file_name));
                    let mut meta = Vec::new();
                    if let Some(author) = &story.author {
                        meta.push(format!("By: {author}"));
                    }
                    if let Some(date) = story.date {
                        meta.push(format!("On: {}/{}/{}", date.year(), date.month(), date.day()));
                    }
                    if !meta.is_empty() {
                        lines.push(format!("        {}", meta.join("  ")));
                    }
                }
            }
            Err(error) => {
                lines.push(format!(
                    "{}: load failed ({})",
                    entity_header(i + 1, &stream.spec.name, None),
                    error
                ));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Checked {} streams, {}",
        loaded.len(),
        story_count(total_stories)
    ));
    lines
}

pub fn print_check_output(loaded: &[LoadedStream]) {
    for line in format_check_output(loaded) {
        println!("{line}");
    }
}

// ============================================================================
// Render events
// ============================================================================

pub fn format_render_event(event: &RenderEvent) -> Vec<String> {
    match event {
        RenderEvent::StreamLoaded { stream, count } => {
            vec![format!("Loaded {} ({})", stream, story_count(*count))]
        }
        RenderEvent::StreamFailed { stream, error } => {
            vec![format!("Stream {} failed to load ({})", stream, error)]
        }
        RenderEvent::StoryRendered { file_name, .. } => {
            vec![format!("    {}: rendered", file_name)]
        }
        RenderEvent::StoryFailed {
            file_name, error, ..
        } => {
            vec![format!("    {}: render failed ({})", file_name, error)]
        }
    }
}

// ============================================================================
// Build summary
// ============================================================================

pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rendered = 0;

    for stream in &summary.streams {
        match &stream.error {
            Some(error) => {
                lines.push(format!("{}: left unfilled ({})", stream.name, error));
            }
            None => {
                rendered += stream.rendered;
                let mut line = format!(
                    "{}: {} loaded, {} rendered",
                    stream.name, stream.loaded, stream.rendered
                );
                if !stream.omitted.is_empty() {
                    line.push_str(&format!(", omitted: {}", stream.omitted.join(", ")));
                }
                lines.push(line);
            }
        }
    }

    lines.push(format!(
        "Rendered {} across {} streams",
        story_count(rendered),
        summary.streams.len()
    ));
    lines
}

pub fn print_build_summary(summary: &BuildSummary) {
    for line in format_build_summary(summary) {
        println!("{line}");
    }
}
