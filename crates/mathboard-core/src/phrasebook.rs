//! Plain-English math phrases to LaTeX.
//!
//! Generators sometimes describe math in words ("square root of x") instead of
//! writing it. The phrasebook rewrites the common phrasings; anything it does not
//! recognize is left as is.

use crate::rules::{apply_rules, ConversionRule};
use crate::transliterate::{latex_to_mathml, Transliteration};
use once_cell::sync::Lazy;
use regex::Captures;

static PHRASE_RULES: Lazy<Vec<ConversionRule>> = Lazy::new(|| {
    vec![
        ConversionRule::template("square-root", r"(?i)square root of (\S+)", r"\sqrt{${1}}"),
        ConversionRule::template("fraction", r"(?i)fraction (\w+)/(\w+)", r"\frac{${1}}{${2}}"),
        ConversionRule::template(
            "sum-bounds",
            r"(?i)sum from (\S+) to (\S+)",
            r"\sum_{${1}}^{${2}}",
        ),
        ConversionRule::template(
            "integral-bounds",
            r"(?i)integral from (\S+) to (\S+)",
            r"\int_{${1}}^{${2}}",
        ),
        ConversionRule::template(
            "power",
            r"(?i)\s*(?:(?:raised )?to the )?(\d+)(?:st|nd|rd|th) power",
            "^{${1}}",
        ),
        ConversionRule::template("subscript", r"(?i)\s*subscript (\w+)", "_{${1}}"),
        ConversionRule::function(
            "named-symbol",
            r"(?i)(^|[^\\\w])(alpha|beta|pi|theta|infinity)\b",
            named_symbol,
        ),
    ]
});

fn named_symbol(caps: &Captures) -> String {
    let name = caps[2].to_ascii_lowercase();
    let command = if name == "infinity" { "infty" } else { name.as_str() };
    format!("{}\\{}", &caps[1], command)
}

pub fn phrase_to_latex(text: &str) -> String {
    apply_rules(&PHRASE_RULES, text)
}

/// Converts a phrase to LaTeX and transliterates the result.
pub fn phrase_to_mathml(text: &str) -> Transliteration {
    latex_to_mathml(&phrase_to_latex(text))
}
