//! Small text-cleanup helpers shared by the extractors.

use once_cell::sync::Lazy;
use regex::Regex;

static MULTI_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("newline pattern is a valid regex"));

static MULTI_BLANK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank-line pattern is a valid regex"));

static MULTI_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" {2,}").expect("space pattern is a valid regex"));

static REFERENCE_MARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d+\]").expect("reference pattern is a valid regex"));

/// Collapse runs of newlines to a single newline and trim.
pub fn collapse_newlines(text: &str) -> String {
    MULTI_NEWLINE.replace_all(text, "\n").trim().to_string()
}

/// Collapse runs of three or more newlines to a paragraph break and trim.
pub fn collapse_blank_lines(text: &str) -> String {
    MULTI_BLANK.replace_all(text, "\n\n").trim().to_string()
}

/// Collapse runs of spaces to one space.
pub fn collapse_spaces(text: &str) -> String {
    MULTI_SPACE.replace_all(text, " ").to_string()
}

/// Drop Wikipedia-style `[n]` reference marks.
pub fn strip_reference_marks(text: &str) -> String {
    REFERENCE_MARK.replace_all(text, "").to_string()
}

/// Truncate at the first occurrence of `marker`, if present. Used to cut
/// license footers and engagement widgets off article bodies.
pub fn cut_at<'a>(text: &'a str, marker: &str) -> &'a str {
    match text.find(marker) {
        Some(idx) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_newlines_and_spaces() {
        assert_eq!(collapse_newlines("a\n\n\nb\nc"), "a\nb\nc");
        assert_eq!(collapse_spaces("a    b  c"), "a b c");
        assert_eq!(collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn cuts_at_marker() {
        assert_eq!(cut_at("body Copyright 2024", "Copyright"), "body ");
        assert_eq!(cut_at("no marker", "Copyright"), "no marker");
    }

    #[test]
    fn strips_reference_marks() {
        assert_eq!(strip_reference_marks("fact[1] more[23]"), "fact more");
    }
}
