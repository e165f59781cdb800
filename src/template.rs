//! Story templates and the fragment emitter.
//!
//! A template is an HTML snippet whose elements carry slot markers as
//! `data-*` attributes:
//!
//! ```text
//! <article data-container>
//!   <header><h1 data-title></h1></header>
//!   <section data-excerpt></section>
//!   <section data-body></section>
//!   <aside>
//!     <p data-author></p>
//!     <time data-date></time>
//!   </aside>
//! </article>
//! ```
//!
//! [`Template::parse`] locates the marked elements once; the
//! [`TemplateEmitter`] then stamps any number of stories through the parsed
//! template. This is a bounded scanner for that marker grammar, not a
//! general HTML parser: attribute values may not contain `<`/`>`, slot
//! marker names must not appear inside attribute values, and value slots
//! (everything except `data-container`) must be closed elements that do not
//! nest further slot markers. The container slot wraps the others and keeps
//! its children; it is stamped with the story's file name as an `id`.
//!
//! A template need not declare every slot; missing markers are skipped.

use crate::render::{RenderError, Renderer, Slot, escape_html};
use crate::story::Story;
use chrono::Datelike;
use maud::{Markup, PreEscaped};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("slot element for data-{0} has no matching closing tag")]
    UnterminatedSlot(Slot),
}

/// Start tag carrying a slot marker attribute: `<tag ... data-<slot>[="..."] ...>`.
static SLOT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"<([a-zA-Z][a-zA-Z0-9-]*)"#,                        // tag name
        r#"([^<>]*?\s)"#,                                     // attributes before the marker
        r#"data-(container|title|excerpt|body|author|date)"#, // the marker
        r#"((?:\s*=\s*"[^"]*")?)"#,                           // optional marker value
        r#"((?:\s[^<>]*)?)>"#,                                // attributes after the marker
    ))
    .unwrap()
});

/// The default story template, embedded at compile time.
pub const DEFAULT_TEMPLATE: &str = include_str!("../static/story.html");

static STANDARD: LazyLock<Template> =
    LazyLock::new(|| Template::parse(DEFAULT_TEMPLATE).expect("embedded template parses"));

/// Slots that receive content (every slot except the container).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Title,
    Excerpt,
    Body,
    Author,
    Date,
}

impl ValueKind {
    fn slot(self) -> Slot {
        match self {
            ValueKind::Title => Slot::Title,
            ValueKind::Excerpt => Slot::Excerpt,
            ValueKind::Body => Slot::Body,
            ValueKind::Author => Slot::Author,
            ValueKind::Date => Slot::Date,
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    /// Markup between slots, emitted verbatim.
    Literal(String),
    /// Container start tag with the marker stripped; the emitter appends
    /// the story id and the closing `>`. The container's children follow
    /// as ordinary segments.
    Container { tag_head: String },
    /// A closed slot element. `open_tag` has the marker stripped; `inner`
    /// is the template's own placeholder content.
    Value {
        kind: ValueKind,
        open_tag: String,
        inner: String,
        close_tag: String,
    },
}

/// A parsed story template, reusable across emissions.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a markup string, locating its slot markers.
    pub fn parse(markup: &str) -> Result<Template, TemplateError> {
        let mut segments = Vec::new();
        let mut cursor = 0;

        while let Some(found) = SLOT_TAG.captures(&markup[cursor..]) {
            let tag_match = found.get(0).unwrap();
            let tag_start = cursor + tag_match.start();
            let tag_end = cursor + tag_match.end();

            if tag_start > cursor {
                segments.push(Segment::Literal(markup[cursor..tag_start].to_string()));
            }

            let tag = &found[1];
            let head = rebuild_tag_head(tag, &found[2], &found[5]);
            let kind = match &found[3] {
                "title" => Some(ValueKind::Title),
                "excerpt" => Some(ValueKind::Excerpt),
                "body" => Some(ValueKind::Body),
                "author" => Some(ValueKind::Author),
                "date" => Some(ValueKind::Date),
                _ => None,
            };

            match kind {
                None => {
                    // The container wraps the other slots, so its children
                    // stay in the scan.
                    segments.push(Segment::Container { tag_head: head });
                    cursor = tag_end;
                }
                Some(kind) => {
                    let (inner_end, close_end) = find_matching_close(markup, tag_end, tag)
                        .ok_or(TemplateError::UnterminatedSlot(kind.slot()))?;
                    segments.push(Segment::Value {
                        kind,
                        open_tag: format!("{head}>"),
                        inner: markup[tag_end..inner_end].to_string(),
                        close_tag: markup[inner_end..close_end].to_string(),
                    });
                    cursor = close_end;
                }
            }
        }

        if cursor < markup.len() {
            segments.push(Segment::Literal(markup[cursor..].to_string()));
        }

        Ok(Template { segments })
    }

    /// The parsed form of [`DEFAULT_TEMPLATE`].
    pub fn standard() -> &'static Template {
        &STANDARD
    }
}

/// Rebuild a start tag head without its slot marker, e.g.
/// `<article data-container class="c"` → `<article class="c"` (no `>`).
fn rebuild_tag_head(tag: &str, before: &str, after: &str) -> String {
    let mut head = format!("<{}{}{}", tag, before.trim_end(), after);
    while head.ends_with(char::is_whitespace) {
        head.pop();
    }
    head
}

/// Find the closing tag matching an already-consumed `<tag ...>`.
///
/// Returns (inner end, close-tag end). Depth counts same-name start tags so
/// a `<section>` inside a `<section data-body>` pairs correctly;
/// self-closing `<tag .../>` forms do not add depth.
fn find_matching_close(markup: &str, from: usize, tag: &str) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut i = from;
    while i < markup.len() {
        let lt = i + markup[i..].find('<')?;
        let rest = &markup[lt + 1..];
        if let Some(close_rest) = rest.strip_prefix('/') {
            if tag_name_at(close_rest, tag) {
                let gt = lt + markup[lt..].find('>')?;
                depth -= 1;
                if depth == 0 {
                    return Some((lt, gt + 1));
                }
                i = gt + 1;
                continue;
            }
        } else if tag_name_at(rest, tag) {
            let gt = lt + markup[lt..].find('>')?;
            if !markup[lt..gt].ends_with('/') {
                depth += 1;
            }
            i = gt + 1;
            continue;
        }
        i = lt + 1;
    }
    None
}

/// True when `rest` starts with `tag` followed by a name boundary.
fn tag_name_at(rest: &str, tag: &str) -> bool {
    if rest.len() < tag.len() || !rest[..tag.len()].eq_ignore_ascii_case(tag) {
        return false;
    }
    rest[tag.len()..]
        .chars()
        .next()
        .is_none_or(|c| !c.is_ascii_alphanumeric() && c != '-')
}

/// One render failure surfaced by [`TemplateEmitter::emit`].
///
/// The slot was left empty; the rest of the fragment still emitted.
#[derive(Debug)]
pub struct RenderFailure {
    pub file_name: String,
    pub slot: Slot,
    pub error: RenderError,
}

/// An emitted fragment plus whatever render failures occurred along the way.
pub struct Emitted {
    pub fragment: Markup,
    pub failures: Vec<RenderFailure>,
}

/// Stamps one story through a parsed template.
///
/// Excerpt and body slots go through the bound renderer; with no renderer
/// bound they pass through raw. A renderer failure empties that slot and is
/// reported in [`Emitted::failures`]; it never aborts the emission.
pub struct TemplateEmitter<'a> {
    story: &'a Story,
    template: &'a Template,
    render: Option<Arc<dyn Renderer>>,
}

enum SlotOutcome {
    Content(String),
    Absent,
    Failed(RenderError),
}

impl<'a> TemplateEmitter<'a> {
    pub fn new(
        story: &'a Story,
        template: &'a Template,
        render: Option<Arc<dyn Renderer>>,
    ) -> Self {
        Self {
            story,
            template,
            render,
        }
    }

    /// Produce the fragment: markers stripped, slots filled where the story
    /// has content, untouched placeholder content where it does not.
    pub fn emit(&self) -> Emitted {
        use std::fmt::Write;

        let mut html = String::new();
        let mut failures = Vec::new();

        for segment in &self.template.segments {
            match segment {
                Segment::Literal(text) => html.push_str(text),
                Segment::Container { tag_head } => {
                    html.push_str(tag_head);
                    let _ = write!(html, r#" id="{}">"#, escape_html(&self.story.file_name));
                }
                Segment::Value {
                    kind,
                    open_tag,
                    inner,
                    close_tag,
                } => {
                    html.push_str(open_tag);
                    match self.value_for(*kind) {
                        SlotOutcome::Content(content) => html.push_str(&content),
                        SlotOutcome::Absent => html.push_str(inner),
                        SlotOutcome::Failed(error) => failures.push(RenderFailure {
                            file_name: self.story.file_name.clone(),
                            slot: kind.slot(),
                            error,
                        }),
                    }
                    html.push_str(close_tag);
                }
            }
        }

        Emitted {
            fragment: PreEscaped(html),
            failures,
        }
    }

    /// Serialized convenience form of [`emit`](Self::emit).
    pub fn emit_html(&self) -> (String, Vec<RenderFailure>) {
        let emitted = self.emit();
        (emitted.fragment.into_string(), emitted.failures)
    }

    fn value_for(&self, kind: ValueKind) -> SlotOutcome {
        match kind {
            ValueKind::Title => SlotOutcome::Content(escape_html(&self.story.title)),
            ValueKind::Author => match &self.story.author {
                Some(author) => SlotOutcome::Content(escape_html(author)),
                None => SlotOutcome::Absent,
            },
            ValueKind::Date => match self.story.date {
                // year/month/day, 1-based, no zero-padding.
                Some(d) => SlotOutcome::Content(format!("{}/{}/{}", d.year(), d.month(), d.day())),
                None => SlotOutcome::Absent,
            },
            ValueKind::Excerpt => self.rendered(self.story.excerpt.as_deref(), Slot::Excerpt),
            ValueKind::Body => self.rendered(self.story.body.as_deref(), Slot::Body),
        }
    }

    fn rendered(&self, value: Option<&str>, slot: Slot) -> SlotOutcome {
        let Some(text) = value else {
            return SlotOutcome::Absent;
        };
        match &self.render {
            None => SlotOutcome::Content(text.to_string()),
            Some(render) => match render.render(text, slot) {
                Ok(markup) => SlotOutcome::Content(markup),
                Err(error) => SlotOutcome::Failed(error),
            },
        }
    }
}
