//! Site configuration.
//!
//! A single `config.toml` at the content root, loaded through the same
//! [`Fetcher`] as everything else so HTTP-backed sources are configured the
//! same way local directories are. Everything is optional; a missing
//! config file means stock defaults.
//!
//! ```toml
//! title = "Stories"            # Page title and header
//! description = "..."          # Optional header subtitle
//! template = "story.html"      # Optional template override for all streams
//!
//! # Explicit stream list. Omit entirely to discover streams by scanning
//! # the source for directories containing an `index` file.
//! [[streams]]
//! name = "stories"             # Display name, and the base path by default
//! path = "content/stories"    # Optional base path override
//! template = "cards.html"      # Optional per-stream template override
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::fetch::{FetchError, Fetcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to fetch config.toml: {0}")]
    Fetch(#[from] FetchError),
    #[error("invalid config.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SiteConfig {
    /// Page title and site header.
    pub title: String,
    /// Optional subtitle shown under the title.
    pub description: Option<String>,
    /// Explicit stream list; empty means discover by scanning the source.
    pub streams: Vec<StreamConfig>,
    /// Template override applied to every stream without its own.
    pub template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    pub name: String,
    /// Base path relative to the source root; defaults to the name.
    pub path: Option<String>,
    /// Per-stream template override.
    pub template: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Stories".to_string(),
            description: None,
            streams: Vec::new(),
            template: None,
        }
    }
}

impl SiteConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Invalid("title must not be empty".to_string()));
        }
        for (i, stream) in self.streams.iter().enumerate() {
            if stream.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "streams[{i}].name must not be empty"
                )));
            }
        }
        let mut names: Vec<&str> = self.streams.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.streams.len() {
            return Err(ConfigError::Invalid(
                "stream names must be unique".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load `config.toml` from the content source; stock defaults if absent.
pub fn load_config(fetcher: &dyn Fetcher) -> Result<SiteConfig, ConfigError> {
    let config = match fetcher.fetch("config.toml", false) {
        Ok(text) => toml::from_str(&text)?,
        Err(FetchError::NotFound(_)) => SiteConfig::default(),
        Err(source) => return Err(ConfigError::Fetch(source)),
    };
    config.validate()?;
    Ok(config)
}

/// A stock `config.toml` with every option documented, for `gen-config`.
pub fn stock_config_toml() -> String {
    r#"# simple-blog configuration
# All options are optional — defaults shown where they exist.

# Page title, shown in the header and the <title> tag.
title = "Stories"

# Optional subtitle under the header.
# description = "Occasional writing"

# Template override applied to every stream. The file is fetched from the
# content source and must carry the data-container/data-title/data-excerpt/
# data-body/data-author/data-date slot markers.
# template = "story.html"

# Explicit stream list. Omit entirely to discover streams automatically:
# every directory under the source containing an `index` file becomes a
# stream. Without config or discoverable streams, the single default
# stream "stories" is assumed.
#
# [[streams]]
# name = "stories"        # Display name; also the base path by default
# path = "blog/stories"   # Optional base path override
# template = "cards.html" # Optional per-stream template override
"#
    .to_string()
}
