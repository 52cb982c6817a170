//! Turning validator reports into [`Diagnostic`]s.
//!
//! Two formats are understood: the HTML result page of an online markup
//! validator, and plain-text error logs (one finding per line, with optional
//! TeX-style `l.<n>` line references).

use crate::diagnostic::{Diagnostic, DiagnosticCategory};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Outcome of an external validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum RemoteOutcome {
    Valid,
    Invalid(Vec<Diagnostic>),
    /// The validator could not be reached or its answer was unreadable.
    Unavailable(String),
}

static ERROR_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<li class="(?:error|msg_err)"[^>]*>(.*?)</li>"#).unwrap()
});
static LINE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bline\s+(\d+)").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static LINE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^l\.(\d+)").unwrap());

/// Wraps a MathML fragment in the XHTML+MathML document online validators expect.
pub fn xhtml_document(mathml: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1 plus MathML 2.0//EN"
  "http://www.w3.org/Math/DTD/mathml2/xhtml-math11-f.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>MathML fragment</title></head>
<body>
{}
</body>
</html>
"#,
        mathml
    )
}

/// Line offset of the fragment inside [`xhtml_document`].
pub const XHTML_PREAMBLE_LINES: u32 = 6;

/// Reads a validator's HTML result page.
pub fn parse_html_report(html: &str) -> RemoteOutcome {
    let diagnostics: Vec<Diagnostic> = ERROR_ITEM
        .captures_iter(html)
        .map(|caps| {
            let raw = &caps[1];
            let line = LINE_NUMBER
                .captures(raw)
                .and_then(|c| c[1].parse::<u32>().ok())
                .map(|l| l.saturating_sub(XHTML_PREAMBLE_LINES).max(1));
            let text = TAG.replace_all(raw, " ");
            let message = unescape(WHITESPACE.replace_all(text.trim(), " ").as_ref());
            let diag = Diagnostic::new(DiagnosticCategory::from_message(&message), message);
            match line {
                Some(l) => diag.at_line(l),
                None => diag,
            }
        })
        .collect();

    if !diagnostics.is_empty() {
        RemoteOutcome::Invalid(diagnostics)
    } else if html.contains("Valid") || html.contains("successfully checked") {
        RemoteOutcome::Valid
    } else {
        RemoteOutcome::Unavailable("validator response contained no verdict".to_string())
    }
}

/// Reads a plain-text error log.
///
/// Recognised lines become diagnostics; an `l.<n>` line assigns a line number to
/// the diagnostic before it.
pub fn parse_error_log(log: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for line in log.lines().map(str::trim) {
        if let Some(caps) = LINE_REF.captures(line) {
            if let (Some(last), Ok(n)) = (diagnostics.last_mut(), caps[1].parse::<u32>()) {
                last.line.get_or_insert(n);
            }
            continue;
        }

        let category = if let Some(rest) = line.strip_prefix("Invalid tag:") {
            Some((DiagnosticCategory::Syntax, format!("invalid tag {}", rest.trim())))
        } else if let Some(rest) = line.strip_prefix("Missing required attribute:") {
            Some((
                DiagnosticCategory::MissingAttribute,
                format!("missing required attribute {}", rest.trim()),
            ))
        } else if line.starts_with("Invalid attribute value") {
            Some((DiagnosticCategory::Syntax, line.to_string()))
        } else if line.starts_with("Malformed XML") {
            Some((DiagnosticCategory::Malformed, line.to_string()))
        } else if line.starts_with("! Undefined control sequence") {
            Some((DiagnosticCategory::UndefinedCommand, "undefined control sequence".to_string()))
        } else if let Some(rest) = line.strip_prefix("! ") {
            Some((DiagnosticCategory::Syntax, rest.trim_end_matches('.').to_string()))
        } else {
            None
        };

        if let Some((category, message)) = category {
            diagnostics.push(Diagnostic::new(category, message));
        }
    }
    diagnostics
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&amp;", "&")
}
