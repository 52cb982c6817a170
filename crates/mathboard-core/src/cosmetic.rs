//! Cosmetic LaTeX fixes applied after command restoration.
//!
//! Each rule is idempotent: its output never matches its own pattern again.

use crate::rules::{apply_rules, ConversionRule};
use once_cell::sync::Lazy;

/// A brace group nested up to three levels deep.
const BRACE_GROUP: &str = r"\{(?:[^{}]|\{(?:[^{}]|\{[^{}]*\})*\})*\}";

static COSMETIC_RULES: Lazy<Vec<ConversionRule>> = Lazy::new(|| {
    vec![
        ConversionRule::template(
            "thin-space-before-text",
            r"([0-9A-Za-z)\]])\\text\{",
            r"${1}\,\text{",
        ),
        ConversionRule::template(
            "doubled-text-braces",
            r"\\text\{\{([^{}]*)\}\}",
            r"\text{${1}}",
        ),
        ConversionRule::template(
            "brace-colored-token",
            &format!(
                r"\\color\{{([^{{}}]*)\}}(\\[A-Za-z]+(?:{})*|[^\s{{}}\\&^_])",
                BRACE_GROUP
            ),
            r"\color{${1}}{${2}}",
        ),
        ConversionRule::template(
            "space-before-text",
            r"([^\s{}\\,;:!])\\text\{",
            r"${1} \text{",
        ),
    ]
});

/// Applies the cosmetic rule table to `text`.
pub fn apply(text: &str) -> String {
    apply_rules(&COSMETIC_RULES, text)
}
