//! Text helpers shared by the scrapers, the summarizer and logging.
//!
//! - Whitespace normalization for scraped titles and readability output
//! - Token-window truncation used for model input and output bounds
//! - String truncation for log previews

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static INLINE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n(?:[^\S\n]*\n)+").unwrap());

/// Collapse every whitespace run (newlines included) into a single space.
///
/// Used for anchor text, mirroring what a browser renders for an inline
/// element.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a block of extracted article text.
///
/// Runs of spaces and tabs become one space, each line is trimmed, and any
/// run of blank lines becomes a single paragraph break (`"\n\n"`).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_text("  a \t b\n\n\n\n c  "), "a b\n\nc");
/// ```
pub fn normalize_text(s: &str) -> String {
    let inline = INLINE_WS.replace_all(s, " ");
    let lines = inline
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_LINES.replace_all(&lines, "\n\n").trim().to_string()
}

/// Number of whitespace-separated tokens in `s`.
pub fn token_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Keep at most `max_tokens` whitespace-separated tokens of `s`.
///
/// Returns the input unchanged (borrowed) when it already fits; otherwise the
/// kept tokens are re-joined with single spaces.
pub fn truncate_tokens(s: &str, max_tokens: usize) -> Cow<'_, str> {
    if token_count(s) <= max_tokens {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.split_whitespace().take(max_tokens).collect::<Vec<_>>().join(" "))
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended. Cuts on a character boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "é".repeat(10);
        let result = truncate_for_log(&s, 3);
        assert_eq!(result, "ééé…(+14 bytes)");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Show HN:\n  a   thing "), "Show HN: a thing");
        assert_eq!(collapse_whitespace(" \n\t "), "");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  a \t b\n\n\n\n c  "), "a b\n\nc");
        assert_eq!(normalize_text("one\ntwo"), "one\ntwo");
        assert_eq!(normalize_text("p1\n   \n \n p2"), "p1\n\np2");
    }

    #[test]
    fn test_truncate_tokens() {
        assert!(matches!(truncate_tokens("a b c", 3), Cow::Borrowed("a b c")));
        assert_eq!(truncate_tokens("a  b\nc d", 2), "a b");
        assert_eq!(token_count(""), 0);
    }
}
