//! Per-step dispatch between the LaTeX and MathML pipelines.
//!
//! Classification is a textual test for a `<math` start tag, optionally
//! namespace-prefixed; everything without one is treated as LaTeX. Text that
//! mixes prose with a MathML fragment is routed as MathML: the fragment wins
//! and the prose is dropped.

use crate::blob::{NotationBlob, NotationKind};
use crate::config::EngineConfig;
use crate::latex::normalize_latex;
use crate::mathml::process_mathml;
use once_cell::sync::Lazy;
use regex::Regex;

static MATH_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:[A-Za-z_][\w.-]*:)?math[\s>/]").unwrap());
static MATH_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</(?:[A-Za-z_][\w.-]*:)?math\s*>").unwrap());

pub fn classify(text: &str) -> NotationKind {
    if MATH_START.is_match(text) {
        NotationKind::Mathml
    } else {
        NotationKind::Latex
    }
}

/// The span from the first `<math` start tag to the end of the last `</math>`.
///
/// With no closing tag the remainder of the text is returned. Text without a
/// start tag is returned whole.
pub fn extract_mathml(text: &str) -> &str {
    let Some(start) = MATH_START.find(text) else {
        return text;
    };
    let rest = &text[start.start()..];
    match MATH_END.find_iter(rest).last() {
        Some(end) => &rest[..end.end()],
        None => rest,
    }
}

/// Classifies `text` and runs it through the matching pipeline.
pub fn route(text: &str, config: &EngineConfig) -> NotationBlob {
    match classify(text) {
        NotationKind::Mathml => {
            let span = extract_mathml(text);
            log::debug!("routing {} byte(s) as MathML", span.len());
            process_mathml(span, config)
        }
        NotationKind::Latex => {
            log::debug!("routing {} byte(s) as LaTeX", text.len());
            normalize_latex(text, config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("<math><mn>1</mn></math>"), NotationKind::Mathml);
        assert_eq!(classify("<m:math xmlns:m=\"x\"/>"), NotationKind::Mathml);
        assert_eq!(classify(r"\frac{1}{2}"), NotationKind::Latex);
        // `<mathematics>` is not a math tag.
        assert_eq!(classify("<mathematics>"), NotationKind::Latex);
        assert_eq!(classify("x < math"), NotationKind::Latex);
    }

    #[test]
    fn test_extract_greedy() {
        let text = "Here: <math><mi>a</mi></math> and <math><mi>b</mi></math> done";
        assert_eq!(
            extract_mathml(text),
            "<math><mi>a</mi></math> and <math><mi>b</mi></math>"
        );
    }

    #[test]
    fn test_extract_unclosed_takes_rest() {
        assert_eq!(extract_mathml("see <math><mi>a</mi>"), "<math><mi>a</mi>");
    }

    #[test]
    fn test_route_dispatches() {
        let config = EngineConfig::default();

        let blob = route("<math><mn>1</mn></math>", &config);
        assert_eq!(blob.kind, NotationKind::Mathml);
        assert!(blob.is_valid);

        let blob = route(r"\frac{1}{2}", &config);
        assert_eq!(blob.kind, NotationKind::Latex);
        assert_eq!(
            blob.normalized,
            r"\[\begin{align*} \frac{1}{2} \end{align*}\]"
        );
    }

    #[test]
    fn test_route_unclosed_mathml_is_malformed() {
        let blob = route("<math><mi>a</mi>", &EngineConfig::default());
        assert!(!blob.is_valid);
        assert!(
            blob.diagnostics
                .iter()
                .any(|d| d.category == crate::diagnostic::DiagnosticCategory::Malformed)
        );
    }
}
