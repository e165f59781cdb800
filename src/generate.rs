//! Site assembly — streams in, one HTML page out.
//!
//! This is the host-page side of the pipeline: it decides which streams
//! exist, loads each one, renders every story through the template engine,
//! and writes `dist/index.html`. Each stream gets a `<section>` placeholder
//! in the page; a stream that fails to load leaves its placeholder
//! unfilled while the others render normally.
//!
//! ## Two failure policies, on purpose
//!
//! Loading is all-or-nothing per stream (see [`crate::stream`]): a stream
//! either contributes its full story collection or nothing. Rendering is
//! the opposite, per-story catch-and-continue: a story whose renderer
//! fails is omitted from the output buffer, the failure goes to the event
//! channel, and the rest of the batch renders in order. Do not unify these.
//!
//! ## Progress events
//!
//! Rendering reports per-item progress through an optional
//! [`mpsc`](std::sync::mpsc) channel of [`RenderEvent`]s; the CLI drains it
//! from a printer thread. The channel doubles as the error channel for
//! render failures — they are logged, never fatal.

use crate::config::SiteConfig;
use crate::fetch::{FetchError, Fetcher};
use crate::render::{CmarkConverter, RenderRegistry};
use crate::story::Story;
use crate::stream::{ContentStream, StreamError};
use crate::template::{Template, TemplateEmitter, TemplateError};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("failed to fetch template {path}: {source}")]
    TemplateFetch {
        path: String,
        #[source]
        source: FetchError,
    },
}

/// Stream name used when neither config nor discovery yields any.
pub const DEFAULT_STREAM: &str = "stories";

const CSS: &str = include_str!("../static/style.css");

/// Where a stream lives and how to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSpec {
    pub name: String,
    /// Base path relative to the content source.
    pub path: String,
    /// Per-stream template override (a path fetched from the source).
    pub template: Option<String>,
}

/// A stream after loading: its spec plus stories or the load error.
pub struct LoadedStream {
    pub spec: StreamSpec,
    pub outcome: Result<Vec<Story>, StreamError>,
}

/// Per-item progress, drained by the CLI's printer thread.
#[derive(Debug)]
pub enum RenderEvent {
    StreamLoaded {
        stream: String,
        count: usize,
    },
    StreamFailed {
        stream: String,
        error: String,
    },
    StoryRendered {
        stream: String,
        file_name: String,
    },
    StoryFailed {
        stream: String,
        file_name: String,
        error: String,
    },
}

/// Outcome of rendering one stream's story batch.
pub struct RenderedStream {
    pub markup: Markup,
    pub rendered: usize,
    /// File names of stories omitted because their rendering failed.
    pub omitted: Vec<String>,
}

/// Build report for the whole site, consumed by [`crate::output`].
pub struct BuildSummary {
    pub streams: Vec<StreamSummary>,
}

pub struct StreamSummary {
    pub name: String,
    pub loaded: usize,
    pub rendered: usize,
    pub omitted: Vec<String>,
    pub error: Option<String>,
}

fn send(events: &Option<Sender<RenderEvent>>, event: RenderEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

/// The streams to build: config's explicit list when present, otherwise
/// directories under `source` containing an `index` file, otherwise the
/// single default stream.
pub fn resolve_streams(config: &SiteConfig, source: &str) -> Vec<StreamSpec> {
    if !config.streams.is_empty() {
        return config
            .streams
            .iter()
            .map(|s| StreamSpec {
                name: s.name.clone(),
                path: s.path.clone().unwrap_or_else(|| s.name.clone()),
                template: s.template.clone(),
            })
            .collect();
    }

    let root = Path::new(source);
    if root.is_dir() {
        let discovered = discover_streams(root);
        if !discovered.is_empty() {
            return discovered;
        }
    }

    vec![StreamSpec {
        name: DEFAULT_STREAM.to_string(),
        path: DEFAULT_STREAM.to_string(),
        template: None,
    }]
}

/// Scan a content directory for streams: any directory holding an `index`
/// file, however deep, named by its `/`-joined relative path.
pub fn discover_streams(root: &Path) -> Vec<StreamSpec> {
    let mut specs: Vec<StreamSpec> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir() && entry.path().join("index").is_file())
        .filter_map(|entry| {
            let rel = entry.path().strip_prefix(root).ok()?;
            let name = rel.to_string_lossy().replace('\\', "/");
            Some(StreamSpec {
                name: name.clone(),
                path: name,
                template: None,
            })
        })
        .collect();
    specs.sort_by(|a, b| a.name.cmp(&b.name));
    specs
}

/// Load every stream, reporting per-stream progress. Load failures are
/// captured per stream, not propagated; the build decides what an
/// unloaded placeholder looks like.
pub fn load_streams(
    specs: Vec<StreamSpec>,
    fetcher: &dyn Fetcher,
    events: &Option<Sender<RenderEvent>>,
) -> Vec<LoadedStream> {
    specs
        .into_iter()
        .map(|spec| {
            let mut stream = ContentStream::new(spec.name.as_str(), spec.path.as_str());
            let outcome = match stream.load(fetcher) {
                Ok(stories) => {
                    send(
                        events,
                        RenderEvent::StreamLoaded {
                            stream: spec.name.clone(),
                            count: stories.len(),
                        },
                    );
                    Ok(stories.to_vec())
                }
                Err(error) => {
                    send(
                        events,
                        RenderEvent::StreamFailed {
                            stream: spec.name.clone(),
                            error: error.to_string(),
                        },
                    );
                    Err(error)
                }
            };
            LoadedStream { spec, outcome }
        })
        .collect()
}

/// Render one stream's stories into an HTML buffer, in order.
///
/// Each story's renderer is resolved from its file extension. A story with
/// any render failure is omitted from the buffer entirely; the failure is
/// reported and the loop moves on.
pub fn render_stream(
    name: &str,
    stories: &[Story],
    template: &Template,
    registry: &RenderRegistry,
    events: &Option<Sender<RenderEvent>>,
) -> RenderedStream {
    let mut buffer = String::new();
    let mut rendered = 0;
    let mut omitted = Vec::new();

    for story in stories {
        let renderer = registry.renderer_for_path(&story.file_name);
        let emitter = TemplateEmitter::new(story, template, Some(renderer));
        let emitted = emitter.emit();

        if emitted.failures.is_empty() {
            buffer.push_str(&emitted.fragment.into_string());
            buffer.push('\n');
            rendered += 1;
            send(
                events,
                RenderEvent::StoryRendered {
                    stream: name.to_string(),
                    file_name: story.file_name.clone(),
                },
            );
        } else {
            let error = emitted
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.slot, f.error))
                .collect::<Vec<_>>()
                .join("; ");
            omitted.push(story.file_name.clone());
            send(
                events,
                RenderEvent::StoryFailed {
                    stream: name.to_string(),
                    file_name: story.file_name.clone(),
                    error,
                },
            );
        }
    }

    RenderedStream {
        markup: PreEscaped(buffer),
        rendered,
        omitted,
    }
}

/// Render every loaded stream and write the site to `output_dir`.
pub fn build_site(
    loaded: &[LoadedStream],
    config: &SiteConfig,
    fetcher: &dyn Fetcher,
    output_dir: &Path,
    events: &Option<Sender<RenderEvent>>,
) -> Result<BuildSummary, GenerateError> {
    let registry = RenderRegistry::with_builtins(Some(Arc::new(CmarkConverter)));

    let site_template = match &config.template {
        Some(path) => load_template(fetcher, path)?,
        None => Template::standard().clone(),
    };

    let mut sections = Vec::new();
    let mut summaries = Vec::new();

    for stream in loaded {
        let template = match &stream.spec.template {
            Some(path) => load_template(fetcher, path)?,
            None => site_template.clone(),
        };

        match &stream.outcome {
            Ok(stories) => {
                let result =
                    render_stream(&stream.spec.name, stories, &template, &registry, events);
                summaries.push(StreamSummary {
                    name: stream.spec.name.clone(),
                    loaded: stories.len(),
                    rendered: result.rendered,
                    omitted: result.omitted,
                    error: None,
                });
                sections.push((stream.spec.name.clone(), result.markup));
            }
            Err(error) => {
                // Placeholder stays unfilled; the load failure was already
                // reported on the event channel.
                summaries.push(StreamSummary {
                    name: stream.spec.name.clone(),
                    loaded: 0,
                    rendered: 0,
                    omitted: Vec::new(),
                    error: Some(error.to_string()),
                });
                sections.push((stream.spec.name.clone(), PreEscaped(String::new())));
            }
        }
    }

    let page = page_shell(config, &sections);
    fs::create_dir_all(output_dir)?;
    fs::write(output_dir.join("index.html"), page.into_string())?;

    Ok(BuildSummary { streams: summaries })
}

fn load_template(fetcher: &dyn Fetcher, path: &str) -> Result<Template, GenerateError> {
    let markup = fetcher
        .fetch(path, false)
        .map_err(|source| GenerateError::TemplateFetch {
            path: path.to_string(),
            source,
        })?;
    Ok(Template::parse(&markup)?)
}

/// The page shell wrapping every stream section.
fn page_shell(config: &SiteConfig, sections: &[(String, Markup)]) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (config.title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                header.site-header {
                    h1 { (config.title) }
                    @if let Some(description) = &config.description {
                        p { (description) }
                    }
                }
                main {
                    @for (name, fragment) in sections {
                        section.stream data-stream=(name) {
                            h2 { (name) }
                            (fragment)
                        }
                    }
                }
            }
        }
    }
}
