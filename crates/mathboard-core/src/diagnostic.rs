use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of problem a [`Diagnostic`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    Syntax,
    MissingAttribute,
    MissingElement,
    /// The input could not be parsed at all.
    Malformed,
    UndefinedCommand,
    Other,
}

impl DiagnosticCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCategory::Syntax => "syntax",
            DiagnosticCategory::MissingAttribute => "missing_attribute",
            DiagnosticCategory::MissingElement => "missing_element",
            DiagnosticCategory::Malformed => "malformed",
            DiagnosticCategory::UndefinedCommand => "undefined_command",
            DiagnosticCategory::Other => "other",
        }
    }

    /// Derives a category from free-form validator text.
    ///
    /// Used for messages that come from outside the built-in grammar, such as a
    /// remote validator's error list.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("attribute") {
            DiagnosticCategory::MissingAttribute
        } else if lower.contains("element")
            && (lower.contains("missing") || lower.contains("required"))
        {
            DiagnosticCategory::MissingElement
        } else if lower.contains("not allowed")
            || lower.contains("invalid")
            || lower.contains("syntax")
        {
            DiagnosticCategory::Syntax
        } else {
            DiagnosticCategory::Other
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse error taxonomy the engine reports to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Unparsable as XML or LaTeX-ish text.
    MalformedInput,
    /// Parses, but violates the grammar.
    StructuralViolation,
    /// A command the engine has no rule for; passed through, never rejected.
    UnsupportedConstruct,
}

/// A single finding produced by a validator or parser.
///
/// Serializes to the `{line, message, type}` shape external reporters consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: Option<u32>,
    pub message: String,
    #[serde(rename = "type")]
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    pub fn new(category: DiagnosticCategory, message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
            category,
        }
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn class(&self) -> ErrorClass {
        match self.category {
            DiagnosticCategory::Malformed => ErrorClass::MalformedInput,
            DiagnosticCategory::UndefinedCommand => ErrorClass::UnsupportedConstruct,
            _ => ErrorClass::StructuralViolation,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: [{}] {}", line, self.category, self.message),
            None => write!(f, "[{}] {}", self.category, self.message),
        }
    }
}
