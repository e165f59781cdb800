//! End-to-end pipeline tests: a content directory in, an HTML site out.
//!
//! These drive the public API the same way the CLI does — config load,
//! stream resolution, parallel load, site build — against throwaway
//! content trees.

use simple_blog::config::load_config;
use simple_blog::fetch::FsFetcher;
use simple_blog::generate::{build_site, load_streams, resolve_streams};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn build(content: &TempDir) -> (simple_blog::generate::BuildSummary, String) {
    let fetcher = FsFetcher::new(content.path());
    let config = load_config(&fetcher).unwrap();
    let specs = resolve_streams(&config, &content.path().to_string_lossy());
    let loaded = load_streams(specs, &fetcher, &None);

    let out = TempDir::new().unwrap();
    let summary = build_site(&loaded, &config, &fetcher, out.path(), &None).unwrap();
    let html = fs::read_to_string(out.path().join("index.html")).unwrap();
    (summary, html)
}

#[test]
fn discovered_stream_builds_in_index_order() {
    let content = TempDir::new().unwrap();
    write(&content.path().join("blog/index"), "b.md\na.md\n");
    write(&content.path().join("blog/a.md"), "Alpha\nbody a");
    write(&content.path().join("blog/b.md"), "Beta\nbody b");

    let (summary, html) = build(&content);
    assert_eq!(summary.streams.len(), 1);
    assert_eq!(summary.streams[0].name, "blog");
    assert_eq!(summary.streams[0].rendered, 2);

    // Index order, not alphabetical: b.md is listed first.
    let beta = html.find("Beta").expect("second-listed story present");
    let alpha = html.find("Alpha").expect("first-listed story present");
    assert!(beta < alpha);

    // Containers are stamped with the story file name.
    assert!(html.contains(r#"id="a.md""#));
    assert!(html.contains(r#"id="b.md""#));
}

#[test]
fn full_micro_format_survives_the_pipeline() {
    let content = TempDir::new().unwrap();
    write(&content.path().join("blog/index"), "post.md\n");
    write(
        &content.path().join("blog/post.md"),
        "The Post\nShort *lead* here.\n+++\nLong body.\n\\+++\nliteral plus line above\n---\nby Ada\non 2015-2-3\n",
    );

    let (summary, html) = build(&content);
    assert_eq!(summary.streams[0].rendered, 1);

    assert!(html.contains("The Post"));
    assert!(html.contains("<em>lead</em>"), "excerpt went through markdown");
    assert!(html.contains("Long body."));
    assert!(html.contains("+++"), "escaped delimiter is literal content");
    assert!(html.contains("Ada"));
    assert!(html.contains("2015/2/3"));
}

#[test]
fn missing_story_leaves_whole_stream_unfilled() {
    let content = TempDir::new().unwrap();
    write(&content.path().join("blog/index"), "a.md\nmissing.md\n");
    write(&content.path().join("blog/a.md"), "Alpha\nbody");
    write(&content.path().join("news/index"), "n.md\n");
    write(&content.path().join("news/n.md"), "News\nbody");

    let (summary, html) = build(&content);
    let blog = summary.streams.iter().find(|s| s.name == "blog").unwrap();
    let news = summary.streams.iter().find(|s| s.name == "news").unwrap();

    // Story loading is all-or-nothing: one missing file empties the stream.
    assert!(blog.error.is_some());
    assert_eq!(blog.rendered, 0);
    assert!(!html.contains("Alpha"));

    // The other stream is unaffected.
    assert!(news.error.is_none());
    assert!(html.contains("News"));

    // The failed stream still has its placeholder section.
    assert!(html.contains(r#"data-stream="blog""#));
}

#[test]
fn config_template_override_shapes_the_fragments() {
    let content = TempDir::new().unwrap();
    write(
        &content.path().join("config.toml"),
        "title = \"Custom\"\ntemplate = \"compact.html\"\n\n[[streams]]\nname = \"blog\"\n",
    );
    write(
        &content.path().join("compact.html"),
        "<div data-container><h3 data-title></h3><section data-body></section></div>",
    );
    write(&content.path().join("blog/index"), "a.md\n");
    write(&content.path().join("blog/a.md"), "Alpha\nbody text");

    let (_, html) = build(&content);
    assert!(html.contains("<title>Custom</title>"));
    assert!(html.contains("<h3>Alpha</h3>"), "override template used");
}

#[test]
fn empty_source_falls_back_to_default_stream_and_fails_cleanly() {
    let content = TempDir::new().unwrap();

    let fetcher = FsFetcher::new(content.path());
    let config = load_config(&fetcher).unwrap();
    let specs = resolve_streams(&config, &content.path().to_string_lossy());
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].name, "stories");

    let loaded = load_streams(specs, &fetcher, &None);
    assert!(loaded[0].outcome.is_err(), "no index file to load");
}
