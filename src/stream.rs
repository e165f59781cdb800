//! Content streams — index discovery and parallel story loading.
//!
//! A stream is a named collection of stories under a base path, described
//! by an `index` resource: one story file name per line, blank lines
//! ignored, order significant. Loading is a two-step pipeline:
//!
//! 1. [`ContentStream::load_index`] fetches and parses `<path>/index`,
//!    resolving each entry against the base path. The result is cached on
//!    the stream; later loads reuse it.
//! 2. [`ContentStream::load_stories`] fans the story fetches out across
//!    rayon's thread pool. The ordered collect is a barrier: every fetch
//!    settles before any result is inspected, and the stored collection
//!    follows index order no matter which fetch finished first.
//!
//! Story loading is all-or-nothing: one failed fetch (or unparseable
//! story) fails the whole batch and leaves the stream's collection
//! untouched. That is deliberate, and deliberately different from the
//! rendering stage, which tolerates per-story failures (see
//! [`crate::generate`]).
//!
//! Every fetch carries cache-defeat semantics so a stale intermediate cache
//! cannot pin an old index or story revision.

use crate::fetch::{FetchError, Fetcher};
use crate::story::{ParseError, Story, story_name_from_path};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("failed to load index for stream at {path}: {source}")]
    Index {
        path: String,
        #[source]
        source: FetchError,
    },
    #[error("failed to fetch story {path}: {source}")]
    Story {
        path: String,
        #[source]
        source: FetchError,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The resolved, ordered list of story paths for a stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Index {
    pub paths: Vec<String>,
}

impl Index {
    /// Parse an index source: one story name per line, trimmed, blanks
    /// dropped, each resolved against the stream's base path. Source order
    /// is preserved.
    pub fn parse(source: &str, base_path: &str) -> Index {
        let paths = source
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| format!("{base_path}/{name}"))
            .collect();
        Index { paths }
    }
}

/// A named, ordered collection of stories under a base path.
///
/// Lifecycle: unloaded → index loaded → loaded. The index is fetched once
/// and cached; stories are re-fetched on every [`load`](Self::load). The
/// `&mut self` receivers serialize concurrent use by construction.
pub struct ContentStream {
    name: String,
    path: String,
    index: Option<Index>,
    stories: Vec<Story>,
}

impl ContentStream {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            index: None,
            stories: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Stories from the last successful load, in index order.
    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    /// Fetch and cache the stream's index. A cached index short-circuits:
    /// the fetch happens at most once per stream unless
    /// [`reload`](Self::reload) clears it.
    pub fn load_index(&mut self, fetcher: &dyn Fetcher) -> Result<&Index, StreamError> {
        let index = match self.index.take() {
            Some(index) => index,
            None => {
                let index_path = format!("{}/index", self.path);
                let source =
                    fetcher
                        .fetch(&index_path, true)
                        .map_err(|source| StreamError::Index {
                            path: self.path.clone(),
                            source,
                        })?;
                Index::parse(&source, &self.path)
            }
        };
        Ok(self.index.insert(index))
    }

    /// Fetch and parse every story in `paths`, in parallel.
    ///
    /// Waits for all fetches to settle, then fails with the first failure
    /// in path order if any fetch or parse failed. No partial collection
    /// is ever stored.
    pub fn load_stories(
        &mut self,
        fetcher: &dyn Fetcher,
        paths: &[String],
    ) -> Result<(), StreamError> {
        let fetched: Vec<(&String, Result<String, FetchError>)> = paths
            .par_iter()
            .map(|path| (path, fetcher.fetch(path, true)))
            .collect();

        let mut stories = Vec::with_capacity(fetched.len());
        for (path, result) in fetched {
            let source = result.map_err(|source| StreamError::Story {
                path: path.clone(),
                source,
            })?;
            stories.push(Story::parse(&source, story_name_from_path(path))?);
        }

        self.stories = stories;
        Ok(())
    }

    /// Load the index (cached after the first call) and then the stories.
    pub fn load(&mut self, fetcher: &dyn Fetcher) -> Result<&[Story], StreamError> {
        let paths = self.load_index(fetcher)?.paths.clone();
        self.load_stories(fetcher, &paths)?;
        Ok(&self.stories)
    }

    /// Like [`load`](Self::load), but refreshes the index first.
    pub fn reload(&mut self, fetcher: &dyn Fetcher) -> Result<&[Story], StreamError> {
        self.index = None;
        self.load(fetcher)
    }
}
