//! Free-text location normalization.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Normalize a free-text profile location.
///
/// Keeps letters in any script, turns everything else into whitespace,
/// lowercases, collapses whitespace runs, and trims. An empty result
/// means the field carried no usable text and is reported as `None`
/// rather than an empty string. The function is idempotent.
pub fn normalize_location(text: &str) -> Option<String> {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphabetic() {
            cleaned.extend(c.to_lowercase());
        } else {
            cleaned.push(' ');
        }
    }

    let collapsed = WHITESPACE_RUNS.replace_all(cleaned.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}
