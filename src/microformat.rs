//! Text normalization for the story micro-format.
//!
//! Story bodies and excerpts go through two cleanup passes after the
//! structural split:
//!
//! 1. [`remove_trailing_breaks`] drops the line breaks left behind by the
//!    `+++`/`---` delimiter lines.
//! 2. [`unescape_delimiters`] turns escaped delimiter lines (`\+++`, `\---`)
//!    back into literal text.
//!
//! Both passes run only *after* the structural split, so an escaped
//! delimiter can never act as a section boundary: the splitter sees the
//! backslash and walks past it.

use regex::Regex;
use std::sync::LazyLock;

/// A line of one-or-more backslashes followed by exactly `+++` or `---`.
///
/// `$` also matches at end of input: trailing breaks are removed before
/// unescaping runs, so a final escaped delimiter line has no `\n` left.
static ESCAPED_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\\+)(\+{3}|-{3})$").unwrap());

/// Strip one-or-more trailing line breaks from the end of `s`.
///
/// Interior breaks are untouched. Idempotent.
pub fn remove_trailing_breaks(s: &str) -> &str {
    s.trim_end_matches('\n')
}

/// Remove one leading backslash from every escaped delimiter line.
///
/// A delimiter is escaped when the line consists of one-or-more backslashes
/// immediately followed by the literal three-character sequence `+++` or
/// `---` and nothing else:
///
/// - `\+++` → `+++` (the delimiter becomes literal content)
/// - `\\+++` → `\+++` (escaping the escape)
/// - `foo \+++` unchanged (not at line start)
/// - `\++++` unchanged (four plus signs is not the delimiter)
pub fn unescape_delimiters(s: &str) -> String {
    ESCAPED_DELIMITER
        .replace_all(s, |caps: &regex::Captures| {
            format!("{}{}", &caps[1][1..], &caps[2])
        })
        .into_owned()
}
