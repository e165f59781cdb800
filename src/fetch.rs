//! Resource fetching — the transport boundary.
//!
//! Streams and stories are fetched by path through the [`Fetcher`] trait, so
//! the loading pipeline never knows whether content lives on disk or behind
//! an HTTP server. Two backends ship:
//!
//! - [`FsFetcher`]: paths resolved under a root directory. The usual choice
//!   for local builds.
//! - [`HttpFetcher`]: paths resolved against a base URL with a pooled
//!   `ureq` agent and a global timeout, so one hung request cannot stall a
//!   parallel batch indefinitely.
//!
//! `cache_defeat` asks the backend to bypass any intermediate cache. The
//! HTTP backend appends a uniqueness token to the query string and sends
//! `Cache-Control: no-cache`; the filesystem backend has no cache to defeat
//! and ignores the flag.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use ureq::Agent;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("fetch of {path} failed with status {code}")]
    Status { code: u16, path: String },
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("transport error fetching {path}: {message}")]
    Transport { path: String, message: String },
}

/// Fetch a text resource by path.
///
/// `Sync` so a single fetcher can serve rayon's parallel fan-out.
pub trait Fetcher: Sync {
    fn fetch(&self, path: &str, cache_defeat: bool) -> Result<String, FetchError>;
}

/// Filesystem-backed fetcher.
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Fetcher for FsFetcher {
    fn fetch(&self, path: &str, _cache_defeat: bool) -> Result<String, FetchError> {
        let full = self.root.join(path);
        match fs::read_to_string(&full) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(path.to_string()))
            }
            Err(source) => Err(FetchError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

/// HTTP-backed fetcher over a pooled agent.
pub struct HttpFetcher {
    agent: Agent,
    base: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(HTTP_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            base: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, path: &str, cache_defeat: bool) -> Result<String, FetchError> {
        let mut url = format!("{}/{}", self.base, path);
        if cache_defeat {
            let uid = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0);
            let separator = if url.contains('?') { '&' } else { '?' };
            url.push(separator);
            url.push_str(&format!("uid={uid}"));
        }

        let response = self
            .agent
            .get(&url)
            .header("Cache-Control", "no-cache")
            .call()
            .map_err(|e| FetchError::Transport {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(FetchError::NotFound(path.to_string()));
        }
        if !(200..300).contains(&status) {
            return Err(FetchError::Status {
                code: status,
                path: path.to_string(),
            });
        }

        response
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::Transport {
                path: path.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock fetcher with canned responses and a recorded fetch log.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's
    /// par_iter.
    #[derive(Default)]
    pub struct MockFetcher {
        responses: HashMap<String, Result<String, u16>>,
        log: Mutex<Vec<(String, bool)>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a resource that fetches successfully.
        pub fn with_resource(mut self, path: &str, text: &str) -> Self {
            self.responses
                .insert(path.to_string(), Ok(text.to_string()));
            self
        }

        /// Add a resource whose fetch fails with `code`.
        pub fn with_failure(mut self, path: &str, code: u16) -> Self {
            self.responses.insert(path.to_string(), Err(code));
            self
        }

        /// Every `(path, cache_defeat)` pair fetched so far, in call order.
        pub fn fetched(&self) -> Vec<(String, bool)> {
            self.log.lock().unwrap().clone()
        }
    }

    impl Fetcher for MockFetcher {
        fn fetch(&self, path: &str, cache_defeat: bool) -> Result<String, FetchError> {
            self.log
                .lock()
                .unwrap()
                .push((path.to_string(), cache_defeat));
            match self.responses.get(path) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(code)) => Err(FetchError::Status {
                    code: *code,
                    path: path.to_string(),
                }),
                None => Err(FetchError::NotFound(path.to_string())),
            }
        }
    }

    #[test]
    fn fs_fetcher_reads_relative_paths() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("stories")).unwrap();
        std::fs::write(tmp.path().join("stories/a.md"), "Title\n").unwrap();

        let fetcher = FsFetcher::new(tmp.path());
        assert_eq!(fetcher.fetch("stories/a.md", true).unwrap(), "Title\n");
    }

    #[test]
    fn fs_fetcher_missing_file_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = FsFetcher::new(tmp.path());
        assert!(matches!(
            fetcher.fetch("nope.md", false),
            Err(FetchError::NotFound(path)) if path == "nope.md"
        ));
    }

    #[test]
    fn mock_records_fetches_in_order() {
        let fetcher = MockFetcher::new().with_resource("a", "A");
        fetcher.fetch("a", true).unwrap();
        let _ = fetcher.fetch("b", false);
        assert_eq!(
            fetcher.fetched(),
            vec![("a".to_string(), true), ("b".to_string(), false)]
        );
    }

    #[test]
    fn mock_failure_carries_status() {
        let fetcher = MockFetcher::new().with_failure("gone", 503);
        assert!(matches!(
            fetcher.fetch("gone", true),
            Err(FetchError::Status { code: 503, .. })
        ));
    }
}
