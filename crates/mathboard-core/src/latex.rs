//! The LaTeX normalization pipeline.
//!
//! ```text
//! sanitize -> strip delimiters -> protect commands -> align rows -> restore
//!          -> cosmetic fixes -> wrap in \[...\]
//! ```
//!
//! The output of [`normalize_latex`] is always a single `\[ \begin{align*} ... \end{align*} \]`
//! block, and normalizing that output again returns it unchanged.

use crate::align;
use crate::blob::{NotationBlob, NotationKind};
use crate::config::{EngineConfig, FallbackPolicy};
use crate::cosmetic;
use crate::delimiters::{strip_display_delimiters, wrap_display};
use crate::diagnostic::{Diagnostic, DiagnosticCategory};
use crate::error::StageError;
use crate::math_validator::check_latex;
use crate::placeholder::with_commands_protected;
use once_cell::sync::Lazy;
use regex::Regex;

/// Emitted in place of math the pipeline could not process.
pub const LATEX_SENTINEL: &str = r"\[\text{Error processing math request}\]";

static UNSAFE_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\(?:input|include|write|read|openout|closeout|load|output)\d*\b\s*(?:\{[^{}]*\})?",
    )
    .unwrap()
});

/// Removes commands that read or write files.
pub fn sanitize_latex(text: &str) -> String {
    UNSAFE_COMMAND.replace_all(text, "").into_owned()
}

/// Normalizes the text between delimiters, without the outer `\[...\]`.
pub fn normalize_body(text: &str) -> Result<String, StageError> {
    let stripped = strip_display_delimiters(text);
    let aligned =
        with_commands_protected("line normalizer", &stripped, |p| Ok(align::normalize_lines(p)))?;
    Ok(cosmetic::apply(&aligned))
}

/// Runs the full LaTeX pipeline on one step's math.
pub fn normalize_latex(raw: &str, config: &EngineConfig) -> NotationBlob {
    let mut blob = NotationBlob::new(NotationKind::Latex, raw);

    let text = if config.sanitize {
        sanitize_latex(raw)
    } else {
        raw.to_string()
    };
    if text != raw {
        log::debug!("sanitizer removed unsafe commands");
    }

    let length = text.chars().count();
    if length > config.max_expression_length {
        blob.diagnostics.push(Diagnostic::new(
            DiagnosticCategory::Other,
            format!(
                "expression is {} characters long; the limit is {}",
                length, config.max_expression_length
            ),
        ));
    }

    blob.diagnostics
        .extend(check_latex(&strip_display_delimiters(&text), config));

    match normalize_body(&text) {
        Ok(body) => blob.normalized = wrap_display(&body),
        Err(e) => {
            log::warn!("latex normalization failed: {}", e);
            blob.diagnostics
                .push(Diagnostic::new(DiagnosticCategory::Other, e.to_string()));
            blob.normalized = match config.fallback {
                FallbackPolicy::Sentinel => LATEX_SENTINEL.to_string(),
                FallbackPolicy::Original | FallbackPolicy::Repaired => raw.to_string(),
            };
            blob.is_valid = false;
            return blob;
        }
    }

    blob.is_valid = !blob.diagnostics.iter().any(|d| {
        matches!(
            d.category,
            DiagnosticCategory::Syntax | DiagnosticCategory::Malformed
        )
    });
    blob
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    fn normalize(raw: &str) -> String {
        normalize_latex(raw, &EngineConfig::default()).normalized
    }

    #[test]
    fn test_three_lines() {
        assert_eq!(
            normalize(r"a \\ b \\ c"),
            r"\[\begin{align*} a \\ & b \\ & c \end{align*}\]"
        );
    }

    #[test]
    fn test_strips_existing_delimiters() {
        assert_eq!(
            normalize(r"$$x = 1$$"),
            r"\[\begin{align*} x = 1 \end{align*}\]"
        );
    }

    #[test]
    fn test_text_argument_survives() {
        let out = normalize(r"\text{a \\ b} = 5\text{ m} \\ = 6");
        expect![[r#"\[\begin{align*} \text{a \\ b} = 5\,\text{ m} \\ & = 6 \end{align*}\]"#]]
            .assert_eq(&out);
    }

    #[test]
    fn test_matrix_rows_survive() {
        let out = normalize(r"\begin{pmatrix} 1 & 0 \\ 0 & 1 \end{pmatrix}");
        assert_eq!(
            out,
            r"\[\begin{align*} \begin{pmatrix} 1 & 0 \\ 0 & 1 \end{pmatrix} \end{align*}\]"
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            r"a \\ b \\ c",
            r"\[ x^2 \\\\ y \]",
            r"\color{red}x + \text{{z}}",
            r"\begin{equation} E = mc^2 \end{equation}",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), r"\[\begin{align*}  \end{align*}\]");
    }

    #[test]
    fn test_sanitizer_removes_file_commands() {
        assert_eq!(sanitize_latex(r"x \input{/etc/passwd} + y"), "x  + y");
        assert_eq!(sanitize_latex(r"\write18{rm -rf /}z"), "z");
        assert_eq!(sanitize_latex(r"\includegraphics{a}"), r"\includegraphics{a}");
    }

    #[test]
    fn test_sanitize_disabled() {
        let config = EngineConfig {
            sanitize: false,
            ..EngineConfig::default()
        };
        let blob = normalize_latex(r"\input{x}", &config);
        assert!(blob.normalized.contains(r"\input{x}"));
    }

    #[test]
    fn test_unbalanced_input_is_flagged() {
        let blob = normalize_latex(r"\frac{1}{2", &EngineConfig::default());
        assert!(!blob.is_valid);
        assert!(blob
            .diagnostics
            .iter()
            .any(|d| d.category == DiagnosticCategory::Syntax));
    }

    #[test]
    fn test_unknown_command_stays_valid() {
        let blob = normalize_latex(r"\foo{x}", &EngineConfig::default());
        assert!(blob.is_valid);
        assert_eq!(blob.diagnostics.len(), 1);
        assert!(blob.normalized.contains(r"\foo{x}"));
    }

    #[test]
    fn test_length_limit() {
        let config = EngineConfig {
            max_expression_length: 3,
            ..EngineConfig::default()
        };
        let blob = normalize_latex("a + b", &config);
        assert_eq!(blob.diagnostics[0].category, DiagnosticCategory::Other);
        assert!(blob.is_valid);
    }
}
