//! Story parsing — the micro-format grammar.
//!
//! A story file is plain text with three optional structural markers:
//!
//! ```text
//! <title line>
//! <excerpt text...>
//! +++           (optional excerpt delimiter, 3+ plus signs alone on a line)
//! <body text...>
//! ---           (optional metadata delimiter, 3+ hyphens alone on a line)
//! by <author>
//! on <year>-<month>-<day>
//! ```
//!
//! The first non-empty line is the title. Everything after it up to the
//! `+++` line is the excerpt; everything after `+++` up to the `---` line is
//! the body. Without a `+++` line there is no excerpt and the whole middle
//! is the body. The metadata section is free-form except for the `by`/`on`
//! token lines.
//!
//! Delimiter lines can be escaped with a leading backslash to appear as
//! literal content — see [`crate::microformat`].

use crate::microformat::{remove_trailing_breaks, unescape_delimiters};
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("story source is empty: {0}")]
    EmptySource(String),
    #[error("story has no title line: {0}")]
    MissingTitle(String),
}

/// Metadata section delimiter: three-or-more hyphens alone on a line.
static META_DELIMITER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^-{3,}\n").unwrap());

/// Excerpt delimiter: three-or-more plus signs alone on a line.
static EXCERPT_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\+{3,}\n").unwrap());

/// Author token: a line reading `by <author>` (case-insensitive).
static AUTHOR_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)^by\s+(.+)$").unwrap());

/// Date token: a line reading `on <date>` (case-insensitive).
static DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)^on\s+(.+)$").unwrap());

/// One parsed story, derived from a single text file.
///
/// `title` is always present and non-empty; every other field appears only
/// if the source carried it. `excerpt` is present iff the source had a
/// `+++` delimiter with text before it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    /// Last path segment of the source, used as a DOM id and in messages.
    pub file_name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Story {
    /// Parse raw story text.
    ///
    /// Fails fast on an empty or whitespace-only source, or on a content
    /// section with no title line (e.g. a file that starts at `---`).
    pub fn parse(source: &str, file_name: &str) -> Result<Story, ParseError> {
        if source.trim().is_empty() {
            return Err(ParseError::EmptySource(file_name.to_string()));
        }

        // Structural split happens before any unescaping, so escaped
        // delimiters never act as section boundaries.
        let (content, meta) = match META_DELIMITER.find(source) {
            Some(m) => (&source[..m.start()], &source[m.end()..]),
            None => (source, ""),
        };

        let (title, candidate) = split_title(content)
            .ok_or_else(|| ParseError::MissingTitle(file_name.to_string()))?;

        let (excerpt, body) = match EXCERPT_DELIMITER.find(candidate) {
            Some(m) => (
                normalize_section(&candidate[..m.start()]),
                normalize_section(&candidate[m.end()..]),
            ),
            None => (None, normalize_section(candidate)),
        };

        let (author, date) = parse_meta(meta);

        Ok(Story {
            file_name: file_name.to_string(),
            title: title.to_string(),
            excerpt,
            body,
            author,
            date,
        })
    }
}

/// Derive a story's file name from its path: the last `/` segment.
pub fn story_name_from_path(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Split the content section into (title, body candidate).
///
/// The title is the first non-empty physical line, trimmed. The candidate
/// is everything after that line's break.
fn split_title(content: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Some((trimmed, &content[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Normalize an excerpt/body section; empty sections become `None`.
fn normalize_section(section: &str) -> Option<String> {
    let trimmed = remove_trailing_breaks(section);
    if trimmed.is_empty() {
        None
    } else {
        Some(unescape_delimiters(trimmed))
    }
}

fn parse_meta(meta: &str) -> (Option<String>, Option<NaiveDate>) {
    let author = AUTHOR_TOKEN
        .captures(meta)
        .map(|caps| caps[1].trim().to_string());

    let date = DATE_TOKEN
        .captures(meta)
        .and_then(|caps| parse_date(caps[1].trim()));

    (author, date)
}

/// Parse `<year>-<month>-<day>` with exactly three integer components.
///
/// Months and days are 1-based and unpadded (`2013-1-1` is January 1st).
/// Wrong component counts, non-integers, and impossible calendar dates all
/// leave the date undefined.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let year: i32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let day: u32 = parts[2].trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_story_parses() {
        let story = Story::parse(
            "Title\nExcerpt\n+++\nBody\n---\nby Alice\non 2013-1-1",
            "full.md",
        )
        .unwrap();
        assert_eq!(story.title, "Title");
        assert_eq!(story.excerpt.as_deref(), Some("Excerpt"));
        assert_eq!(story.body.as_deref(), Some("Body"));
        assert_eq!(story.author.as_deref(), Some("Alice"));
        assert_eq!(story.date, NaiveDate::from_ymd_opt(2013, 1, 1));
    }

    #[test]
    fn title_and_body_only() {
        let story = Story::parse("Title\nBody", "s.md").unwrap();
        assert_eq!(story.title, "Title");
        assert_eq!(story.body.as_deref(), Some("Body"));
        assert_eq!(story.excerpt, None);
        assert_eq!(story.author, None);
        assert_eq!(story.date, None);
    }

    #[test]
    fn title_alone() {
        let story = Story::parse("Title", "s.md").unwrap();
        assert_eq!(story.title, "Title");
        assert_eq!(story.excerpt, None);
        assert_eq!(story.body, None);
    }

    #[test]
    fn empty_source_fails() {
        assert_eq!(
            Story::parse("", "empty.md"),
            Err(ParseError::EmptySource("empty.md".to_string()))
        );
        assert_eq!(
            Story::parse("  \n\n ", "blank.md"),
            Err(ParseError::EmptySource("blank.md".to_string()))
        );
    }

    #[test]
    fn metadata_only_source_has_no_title() {
        assert_eq!(
            Story::parse("---\nby Alice\n", "meta.md"),
            Err(ParseError::MissingTitle("meta.md".to_string()))
        );
    }

    #[test]
    fn leading_blank_lines_skipped_for_title() {
        let story = Story::parse("\n\n  Title  \nBody", "s.md").unwrap();
        assert_eq!(story.title, "Title");
        assert_eq!(story.body.as_deref(), Some("Body"));
    }

    #[test]
    fn excerpt_delimiter_with_empty_excerpt() {
        // Empty resulting sections become None rather than Some("").
        let story = Story::parse("Title\n+++\nBody", "s.md").unwrap();
        assert_eq!(story.excerpt, None);
        assert_eq!(story.body.as_deref(), Some("Body"));
    }

    #[test]
    fn excerpt_without_body() {
        let story = Story::parse("Title\nExcerpt\n+++\n", "s.md").unwrap();
        assert_eq!(story.excerpt.as_deref(), Some("Excerpt"));
        assert_eq!(story.body, None);
    }

    #[test]
    fn only_first_excerpt_delimiter_splits() {
        let story = Story::parse("Title\nExcerpt\n+++\nBody\n++++\nmore", "s.md").unwrap();
        assert_eq!(story.excerpt.as_deref(), Some("Excerpt"));
        assert_eq!(story.body.as_deref(), Some("Body\n++++\nmore"));
    }

    #[test]
    fn longer_delimiters_accepted() {
        let story =
            Story::parse("Title\nExcerpt\n+++++\nBody\n-----\nby Bob\n", "s.md").unwrap();
        assert_eq!(story.excerpt.as_deref(), Some("Excerpt"));
        assert_eq!(story.body.as_deref(), Some("Body"));
        assert_eq!(story.author.as_deref(), Some("Bob"));
    }

    #[test]
    fn escaped_delimiters_become_literal() {
        let story = Story::parse("Title\nBody\n\\+++\nmore\n", "s.md").unwrap();
        assert_eq!(story.body.as_deref(), Some("Body\n+++\nmore"));
    }

    #[test]
    fn escaped_delimiter_does_not_split() {
        // The backslash keeps the line out of the structural split entirely.
        let story = Story::parse("Title\nA\n\\+++\nB\n", "s.md").unwrap();
        assert_eq!(story.excerpt, None);
        assert_eq!(story.body.as_deref(), Some("A\n+++\nB"));
    }

    #[test]
    fn trailing_breaks_removed_from_sections() {
        let story = Story::parse("Title\nExcerpt\n\n+++\nBody\n\n\n", "s.md").unwrap();
        assert_eq!(story.excerpt.as_deref(), Some("Excerpt"));
        assert_eq!(story.body.as_deref(), Some("Body"));
    }

    #[test]
    fn author_token_is_case_insensitive() {
        let story = Story::parse("Title\nBody\n---\nBY Carol\n", "s.md").unwrap();
        assert_eq!(story.author.as_deref(), Some("Carol"));
    }

    #[test]
    fn author_token_must_start_its_line() {
        let story = Story::parse("Title\nBody\n---\nstandby Carol\n", "s.md").unwrap();
        assert_eq!(story.author, None);
    }

    #[test]
    fn date_with_wrong_component_count_is_undefined() {
        let story = Story::parse("Title\nBody\n---\non 2013-1\n", "s.md").unwrap();
        assert_eq!(story.date, None);
    }

    #[test]
    fn date_with_non_integer_component_is_undefined() {
        let story = Story::parse("Title\nBody\n---\non 2013-Jan-1\n", "s.md").unwrap();
        assert_eq!(story.date, None);
    }

    #[test]
    fn impossible_calendar_date_is_undefined() {
        let story = Story::parse("Title\nBody\n---\non 2013-13-45\n", "s.md").unwrap();
        assert_eq!(story.date, None);
    }

    #[test]
    fn metadata_tokens_found_anywhere_in_section() {
        let story = Story::parse(
            "Title\nBody\n---\nsome note\non 2020-6-15\nby Dana\n",
            "s.md",
        )
        .unwrap();
        assert_eq!(story.author.as_deref(), Some("Dana"));
        assert_eq!(story.date, NaiveDate::from_ymd_opt(2020, 6, 15));
    }

    #[test]
    fn story_name_taken_from_last_path_segment() {
        assert_eq!(story_name_from_path("streams/news/launch.md"), "launch.md");
        assert_eq!(story_name_from_path("launch.md"), "launch.md");
    }
}
