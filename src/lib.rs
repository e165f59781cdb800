//! # Simple Blog
//!
//! A minimal static blog generator for plain-text story streams. Stories
//! are text files in a tiny micro-format; streams are directories with an
//! `index` file naming their stories in order; the output is one static
//! HTML page with a section per stream.
//!
//! # Architecture: Fetch → Parse → Render
//!
//! The pipeline has three independent layers, joined by small contracts:
//!
//! ```text
//! 1. Fetch     index + story files     (Fetcher trait: fs or HTTP)
//! 2. Parse     text → Story records    (micro-format grammar)
//! 3. Render    Story → HTML fragment   (template slots + per-extension renderer)
//! ```
//!
//! Fetching and parsing are all-or-nothing per stream: a stream either
//! yields its complete, index-ordered story collection or a single error.
//! Rendering is the opposite: each story renders independently, and a
//! failure only costs that one story its place on the page. Keeping the
//! two failure policies distinct is a deliberate design decision.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`microformat`] | Trailing-break trimming and delimiter unescaping |
//! | [`story`] | `Story` value type and the micro-format parser |
//! | [`render`] | Renderer trait, extension registry, built-in renderers |
//! | [`template`] | Slot-marked templates and the fragment emitter |
//! | [`fetch`] | Resource fetch contract with fs and HTTP backends |
//! | [`stream`] | Index resolution and parallel story loading |
//! | [`generate`] | Stream discovery, batch rendering, page assembly |
//! | [`config`] | `config.toml` loading and validation |
//! | [`output`] | CLI output formatting: inventories and render events |
//!
//! # Design Decisions
//!
//! ## Plain Values Over Clever Accessors
//!
//! A [`story::Story`] is an immutable value built once by the parser —
//! plain public fields, no lazy computation, nothing to invalidate. Parsing
//! and emission are pure functions, so the whole pipeline re-derives its
//! state from the text inputs on every run; there is no cache to corrupt
//! and no store to migrate.
//!
//! ## Explicit Renderer Registration
//!
//! Renderers are looked up by file extension in a
//! [`render::RenderRegistry`] the host fills at startup. There is no
//! ambient plugin discovery: what you register is what can run, and a
//! renderer whose backing capability is missing (markdown without a
//! converter) simply reports itself disabled and the identity fallback
//! takes over.
//!
//! ## Runtime Templates, Compile-Time Shell
//!
//! Story fragments come from runtime templates — HTML snippets with
//! `data-*` slot markers — because templates are user-overridable content.
//! The page shell around them is [Maud](https://maud.lambda.xyz/), checked
//! at compile time. The two meet in `generate`, where emitted fragments
//! are spliced into the shell as pre-escaped markup.
//!
//! ## Parallel Fetch, Deterministic Order
//!
//! Story fetches fan out across rayon's thread pool, but the collected
//! results follow index order, not completion order, and nothing is stored
//! until every fetch has settled. Diagnostics stay deterministic: the
//! first failure in index order is the one reported.

pub mod config;
pub mod fetch;
pub mod generate;
pub mod microformat;
pub mod output;
pub mod render;
pub mod story;
pub mod stream;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
