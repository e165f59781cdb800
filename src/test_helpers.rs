//! Shared test utilities for the simple-blog test suite.
//!
//! Provides fixture setup and lookup helpers for loaded streams and parsed
//! stories.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let fetcher = FsFetcher::new(tmp.path());
//! let loaded = load_streams(specs, &fetcher, &None);
//!
//! let stories = loaded_stories(&loaded, "stories");
//! let hello = find_story(stories, "Hello, World");
//! assert_eq!(hello.author.as_deref(), Some("Alice Cooper"));
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::generate::LoadedStream;
use crate::story::Story;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups — panic with a clear message on miss
// =========================================================================

/// The story collection of a successfully loaded stream. Panics if the
/// stream is missing or failed to load.
pub fn loaded_stories<'a>(loaded: &'a [LoadedStream], name: &str) -> &'a [Story] {
    let stream = loaded
        .iter()
        .find(|s| s.spec.name == name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = loaded.iter().map(|s| s.spec.name.as_str()).collect();
            panic!("stream '{name}' not found. Available: {names:?}")
        });
    match &stream.outcome {
        Ok(stories) => stories,
        Err(error) => panic!("stream '{name}' failed to load: {error}"),
    }
}

/// Find a story by title. Panics if not found.
pub fn find_story<'a>(stories: &'a [Story], title: &str) -> &'a Story {
    stories
        .iter()
        .find(|s| s.title == title)
        .unwrap_or_else(|| {
            let titles: Vec<&str> = stories.iter().map(|s| s.title.as_str()).collect();
            panic!("story '{title}' not found. Available: {titles:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All story titles in collection order.
pub fn story_titles(stories: &[Story]) -> Vec<&str> {
    stories.iter().map(|s| s.title.as_str()).collect()
}

/// All story file names in collection order.
pub fn story_file_names(stories: &[Story]) -> Vec<&str> {
    stories.iter().map(|s| s.file_name.as_str()).collect()
}
