//! Display-math delimiter handling.
//!
//! Generators wrap math inconsistently: sometimes in `$$...$$`, sometimes in
//! `\[...\]`, sometimes in a whole `equation` environment, sometimes not at all.
//! [`strip_display_delimiters`] reduces all of these to the bare expression so the
//! pipeline can add exactly one wrapper back with [`wrap_display`].

/// Environments that are unwrapped when they enclose the whole expression.
const WRAPPING_ENVIRONMENTS: &[&str] = &["equation", "equation*", "align", "align*"];

/// Removes a wrapping display-math delimiter pair and a wrapping display environment.
///
/// Only delimiters anchored at the very start and end of the trimmed text are
/// removed. Escaped variants survive: a trailing `\$$` is a literal dollar followed
/// by a math shift, not a closing delimiter.
///
/// ```
/// use mathboard_core::delimiters::strip_display_delimiters;
///
/// assert_eq!(strip_display_delimiters(r"  \[ x^2 \]  "), "x^2");
/// assert_eq!(strip_display_delimiters("$$a + b$$"), "a + b");
/// assert_eq!(strip_display_delimiters(r"a \[ b \] c"), r"a \[ b \] c");
/// ```
pub fn strip_display_delimiters(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = raw.trim();
    let text = strip_delimiter_pair(text).unwrap_or(text).trim();
    let text = strip_environment(text).unwrap_or(text).trim();
    text.to_string()
}

/// Wraps an expression in `\[...\]`.
pub fn wrap_display(expr: &str) -> String {
    format!("\\[{}\\]", expr)
}

fn strip_delimiter_pair(text: &str) -> Option<&str> {
    if text.len() >= 4 && text.starts_with("$$") && text.ends_with("$$") {
        let body = &text[2..text.len() - 2];
        // An odd run of backslashes before the closing `$$` escapes its first dollar.
        if trailing_backslashes(body) % 2 == 0 {
            return Some(body);
        }
    }

    if text.len() >= 4 && text.starts_with("\\[") && text.ends_with("\\]") {
        // `\\]` is a line break followed by a bracket; `\\\]` is a line break then `\]`.
        let before_bracket = &text[..text.len() - 1];
        if trailing_backslashes(before_bracket) % 2 == 1 {
            return Some(&text[2..text.len() - 2]);
        }
    }

    None
}

fn strip_environment(text: &str) -> Option<&str> {
    WRAPPING_ENVIRONMENTS.iter().find_map(|env| {
        let open = format!("\\begin{{{}}}", env);
        let close = format!("\\end{{{}}}", env);
        if text.len() >= open.len() + close.len()
            && text.starts_with(&open)
            && text.ends_with(&close)
        {
            Some(&text[open.len()..text.len() - close.len()])
        } else {
            None
        }
    })
}

fn trailing_backslashes(text: &str) -> usize {
    text.bytes().rev().take_while(|b| *b == b'\\').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_dollar_pair() {
        assert_eq!(strip_display_delimiters("$$\\frac{1}{2}$$"), "\\frac{1}{2}");
    }

    #[test]
    fn test_strips_bracket_pair_and_whitespace() {
        assert_eq!(strip_display_delimiters("\n\\[  x = 1 \\]\n"), "x = 1");
    }

    #[test]
    fn test_empty_input_is_unchanged() {
        assert_eq!(strip_display_delimiters(""), "");
    }

    #[test]
    fn test_escaped_dollar_survives() {
        let input = r"$$cost = 5\$$";
        assert_eq!(strip_display_delimiters(input), input);
    }

    #[test]
    fn test_line_break_before_closing_bracket() {
        // `\\]` closes nothing: it is `\\` followed by `]`.
        let input = r"\[a \\]";
        assert_eq!(strip_display_delimiters(input), input);

        let input = r"\[a \\\]";
        assert_eq!(strip_display_delimiters(input), r"a \\");
    }

    #[test]
    fn test_mid_string_delimiters_untouched() {
        let input = r"x = \[ y \] + 1";
        assert_eq!(strip_display_delimiters(input), input);
    }

    #[test]
    fn test_unwraps_environments() {
        assert_eq!(
            strip_display_delimiters(r"\begin{equation} E = mc^2 \end{equation}"),
            "E = mc^2"
        );
        assert_eq!(
            strip_display_delimiters(r"\[\begin{align*} a \\ & b \end{align*}\]"),
            r"a \\ & b"
        );
    }

    #[test]
    fn test_mismatched_environment_kept() {
        let input = r"\begin{align} a \end{equation}";
        assert_eq!(strip_display_delimiters(input), input);
    }

    #[test]
    fn test_round_trip() {
        for expr in ["x", r"\frac{a}{b}", r"a \\ b", "1 + 2 = 3"] {
            assert_eq!(strip_display_delimiters(&wrap_display(expr)), expr);
        }
    }
}
