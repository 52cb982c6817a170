//! Line normalization into a single `align*` block.
//!
//! Runs on placeholder-protected text, so the only `\\` it can see are row
//! separators at the top level of the expression.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

/// Canonical row separator.
pub const LINE_BREAK: &str = "\\\\ ";

static LINE_BREAK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\\\\\s*)+").unwrap());

/// Collapses every run of `\\` markers (and the whitespace between them) into one
/// canonical separator.
pub fn collapse_line_breaks(text: &str) -> String {
    LINE_BREAK_RUN
        .replace_all(text, NoExpand(LINE_BREAK))
        .into_owned()
}

/// Splits `text` into trimmed, non-empty rows.
pub fn split_rows(text: &str) -> Vec<&str> {
    text.split(LINE_BREAK)
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .collect()
}

/// Rewrites `text` as one `align*` environment.
///
/// Every row after the first gets a leading `& ` anchor unless it already starts
/// with one. Empty input yields an empty environment.
///
/// ```
/// use mathboard_core::align::normalize_lines;
///
/// assert_eq!(
///     normalize_lines(r"a = b \\ = c"),
///     r"\begin{align*} a = b \\ & = c \end{align*}"
/// );
/// ```
pub fn normalize_lines(text: &str) -> String {
    let collapsed = collapse_line_breaks(text);
    let rows: Vec<String> = split_rows(&collapsed)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            if i == 0 || row.starts_with('&') {
                row.to_string()
            } else {
                format!("& {}", row)
            }
        })
        .collect();

    format!(
        "\\begin{{align*}} {} \\end{{align*}}",
        rows.join(" \\\\ ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_repeated_breaks() {
        assert_eq!(collapse_line_breaks(r"a \\\\ b"), r"a \\ b");
        assert_eq!(collapse_line_breaks("a \\\\\n  \\\\ b"), r"a \\ b");
    }

    #[test]
    fn test_three_rows() {
        assert_eq!(
            normalize_lines(r"a \\ b \\ c"),
            r"\begin{align*} a \\ & b \\ & c \end{align*}"
        );
    }

    #[test]
    fn test_existing_anchor_kept() {
        assert_eq!(
            normalize_lines(r"x &= 1 \\ &= 2"),
            r"\begin{align*} x &= 1 \\ &= 2 \end{align*}"
        );
    }

    #[test]
    fn test_empty_rows_dropped() {
        assert_eq!(
            normalize_lines("\\\\ a \\\\ \\\\ \n b \\\\"),
            r"\begin{align*} a \\ & b \end{align*}"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_lines(""), r"\begin{align*}  \end{align*}");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_lines(r"a \\ b");
        let inner = once
            .trim_start_matches(r"\begin{align*}")
            .trim_end_matches(r"\end{align*}");
        assert_eq!(normalize_lines(inner), once);
    }
}
