//! Safe identifier derivation for column and file names

use deunicode::deunicode;
use regex::Regex;
use std::sync::LazyLock;

/// Runs of pipes, tabs, newlines and other whitespace
static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[|\s]+").expect("separator pattern is valid"));

/// Turn arbitrary text into an identifier made of `[A-Za-z0-9_]` only.
///
/// Non-ASCII characters are transliterated, surrounding whitespace trimmed,
/// separator runs become a single `_` and everything else outside the safe
/// set is dropped. Double underscores are collapsed in a single pass, so
/// `a___b` becomes `a__b`; existing column names depend on that.
pub fn sanitize(text: &str) -> String {
    let ascii = deunicode(text);
    let joined = SEPARATOR_RUN.replace_all(ascii.trim(), "_");
    let safe: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    safe.replace("__", "_")
}

/// Stringify any displayable value before sanitizing it
pub fn sanitize_value<T: std::fmt::Display + ?Sized>(value: &T) -> String {
    sanitize(&value.to_string())
}
