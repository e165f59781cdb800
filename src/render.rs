//! Pluggable text-to-markup renderers, selected by file extension.
//!
//! Excerpt and body text is raw; how it becomes HTML depends on the story
//! file's extension. `.md` files go through markdown conversion, `.txt`
//! files are escaped verbatim, and anything without a resolvable renderer
//! falls back to identity passthrough.
//!
//! The [`Renderer`] trait keeps the template emitter renderer-agnostic.
//! Markdown conversion itself sits behind [`MarkupConverter`], so the
//! markdown renderer treats it as an opaque, possibly-absent capability:
//! [`MarkdownRenderer::enabled`] reports whether the capability is actually
//! there.
//!
//! Registration is explicit: the host builds a [`RenderRegistry`] at startup
//! with the renderers it wants ([`RenderRegistry::with_builtins`] installs
//! the two standard ones), rather than scanning any ambient namespace.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("markup conversion failed: {0}")]
    Conversion(String),
    #[error("no markup converter available for .{0}")]
    Disabled(String),
}

/// Named insertion point in a story template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Container,
    Title,
    Excerpt,
    Body,
    Author,
    Date,
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::Container => "container",
            Slot::Title => "title",
            Slot::Excerpt => "excerpt",
            Slot::Body => "body",
            Slot::Author => "author",
            Slot::Date => "date",
        }
    }

    pub fn from_name(name: &str) -> Option<Slot> {
        match name {
            "container" => Some(Slot::Container),
            "title" => Some(Slot::Title),
            "excerpt" => Some(Slot::Excerpt),
            "body" => Some(Slot::Body),
            "author" => Some(Slot::Author),
            "date" => Some(Slot::Date),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Escape text for insertion into HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// An externally supplied markup-conversion capability.
///
/// The markdown renderer depends only on this contract, not on any
/// particular converter crate.
pub trait MarkupConverter: Send + Sync {
    fn convert(&self, text: &str) -> Result<String, RenderError>;
}

/// Markdown conversion backed by pulldown-cmark.
pub struct CmarkConverter;

impl MarkupConverter for CmarkConverter {
    fn convert(&self, text: &str) -> Result<String, RenderError> {
        let parser = pulldown_cmark::Parser::new(text);
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, parser);
        Ok(html)
    }
}

/// A renderer converts raw excerpt/body text into markup for one extension.
pub trait Renderer: Send + Sync {
    /// File extension this renderer handles, without the dot.
    fn extension(&self) -> &str;

    /// Whether the renderer can actually run. Checked at resolve time, so
    /// a renderer whose backing capability is absent is skipped in favor of
    /// the identity fallback.
    fn enabled(&self) -> bool {
        true
    }

    fn render(&self, text: &str, slot: Slot) -> Result<String, RenderError>;
}

/// Plain-text renderer: HTML-escapes its input. Always enabled.
pub struct PlainTextRenderer;

impl Renderer for PlainTextRenderer {
    fn extension(&self) -> &str {
        "txt"
    }

    fn render(&self, text: &str, _slot: Slot) -> Result<String, RenderError> {
        Ok(escape_html(text))
    }
}

/// Rich-text renderer: delegates to a [`MarkupConverter`] when one is
/// present. Without a converter the renderer registers but stays disabled.
pub struct MarkdownRenderer {
    converter: Option<Arc<dyn MarkupConverter>>,
}

impl MarkdownRenderer {
    pub fn new(converter: Option<Arc<dyn MarkupConverter>>) -> Self {
        Self { converter }
    }
}

impl Renderer for MarkdownRenderer {
    fn extension(&self) -> &str {
        "md"
    }

    fn enabled(&self) -> bool {
        self.converter.is_some()
    }

    fn render(&self, text: &str, _slot: Slot) -> Result<String, RenderError> {
        match &self.converter {
            Some(converter) => converter.convert(text),
            None => Err(RenderError::Disabled(self.extension().to_string())),
        }
    }
}

/// Fallback renderer: passes text through unchanged.
pub struct IdentityRenderer;

impl Renderer for IdentityRenderer {
    fn extension(&self) -> &str {
        ""
    }

    fn render(&self, text: &str, _slot: Slot) -> Result<String, RenderError> {
        Ok(text.to_string())
    }
}

/// Maps file extensions to renderers. At most one renderer per extension;
/// registering a second one for the same extension replaces the first.
#[derive(Default)]
pub struct RenderRegistry {
    renders: HashMap<String, Arc<dyn Renderer>>,
}

impl RenderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in renderers installed: plain text, and
    /// markdown bound to the given converter (pass `None` to register it
    /// disabled).
    pub fn with_builtins(converter: Option<Arc<dyn MarkupConverter>>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PlainTextRenderer));
        registry.register(Arc::new(MarkdownRenderer::new(converter)));
        registry
    }

    /// Store `renderer` under its extension, replacing any previous entry.
    ///
    /// Extensions are keyed lower-cased, so `MD` and `md` are one slot.
    pub fn register(&mut self, renderer: Arc<dyn Renderer>) {
        self.renders
            .insert(renderer.extension().to_lowercase(), renderer);
    }

    /// Register every renderer in `renderers`, in order.
    ///
    /// This is the explicit form of plugin discovery: the host passes the
    /// list of implementations it knows about at startup.
    pub fn register_all<I>(&mut self, renderers: I)
    where
        I: IntoIterator<Item = Arc<dyn Renderer>>,
    {
        for renderer in renderers {
            self.register(renderer);
        }
    }

    /// Remove the renderer stored for `renderer`'s extension, but only if
    /// it is this very instance. A registry holding a replacement is left
    /// alone.
    pub fn unregister(&mut self, renderer: &Arc<dyn Renderer>) {
        let key = renderer.extension().to_lowercase();
        let is_same_instance = self
            .renders
            .get(&key)
            .is_some_and(|stored| Arc::ptr_eq(stored, renderer));
        if is_same_instance {
            self.renders.remove(&key);
        }
    }

    /// The enabled renderer for `extension`, if any.
    pub fn resolve(&self, extension: &str) -> Option<Arc<dyn Renderer>> {
        self.renders
            .get(&extension.to_lowercase())
            .filter(|r| r.enabled())
            .cloned()
    }

    /// The renderer for a story path, chosen by the extension after the
    /// last `.`; identity passthrough when nothing resolves.
    pub fn renderer_for_path(&self, path: &str) -> Arc<dyn Renderer> {
        let extension = path.rfind('.').map(|i| &path[i + 1..]).unwrap_or("");
        self.resolve(extension)
            .unwrap_or_else(|| Arc::new(IdentityRenderer))
    }
}
