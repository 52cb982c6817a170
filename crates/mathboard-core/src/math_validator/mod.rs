//! Balance and argument checks for LaTeX math.
//!
//! The checks are advisory. They never change the text; they attach
//! [`Diagnostic`]s that tell the consumer why a step may render badly.

use crate::config::EngineConfig;
use crate::diagnostic::{Diagnostic, DiagnosticCategory};
use mathboard_syntax::{argument_span, line_of, Lexer, SyntaxKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub mod delimiter_validator;
pub mod vocabulary;


pub use delimiter_validator::DelimiterValidator;

/// Represents a mathematical delimiter
#[derive(Debug, Clone, PartialEq)]
pub enum DelimiterKind {
    LeftParen,        // (
    RightParen,       // )
    LeftBracket,      // [
    RightBracket,     // ]
    LeftBrace,        // {
    RightBrace,       // }
    LeftLiteralBrace, // \{
    RightLiteralBrace, // \}
    LeftAngle,        // \langle
    RightAngle,       // \rangle
    LeftFloor,        // \lfloor
    RightFloor,       // \rfloor
    LeftCeil,         // \lceil
    RightCeil,        // \rceil
    LeftNull,         // \left.
    RightNull,        // \right.
}

impl DelimiterKind {
    pub fn is_opening(&self) -> bool {
        matches!(
            self,
            DelimiterKind::LeftParen
                | DelimiterKind::LeftBracket
                | DelimiterKind::LeftBrace
                | DelimiterKind::LeftLiteralBrace
                | DelimiterKind::LeftAngle
                | DelimiterKind::LeftFloor
                | DelimiterKind::LeftCeil
                | DelimiterKind::LeftNull
        )
    }

    fn from_token(kind: SyntaxKind, text: &str) -> Option<Self> {
        let delim = match (kind, text) {
            (SyntaxKind::LParen, _) => DelimiterKind::LeftParen,
            (SyntaxKind::RParen, _) => DelimiterKind::RightParen,
            (SyntaxKind::LBracket, _) => DelimiterKind::LeftBracket,
            (SyntaxKind::RBracket, _) => DelimiterKind::RightBracket,
            (SyntaxKind::LBrace, _) => DelimiterKind::LeftBrace,
            (SyntaxKind::RBrace, _) => DelimiterKind::RightBrace,
            (SyntaxKind::Command, "\\{") => DelimiterKind::LeftLiteralBrace,
            (SyntaxKind::Command, "\\}") => DelimiterKind::RightLiteralBrace,
            (SyntaxKind::Command, "\\langle") => DelimiterKind::LeftAngle,
            (SyntaxKind::Command, "\\rangle") => DelimiterKind::RightAngle,
            (SyntaxKind::Command, "\\lfloor") => DelimiterKind::LeftFloor,
            (SyntaxKind::Command, "\\rfloor") => DelimiterKind::RightFloor,
            (SyntaxKind::Command, "\\lceil") => DelimiterKind::LeftCeil,
            (SyntaxKind::Command, "\\rceil") => DelimiterKind::RightCeil,
            _ => return None,
        };
        Some(delim)
    }
}

/// A paired delimiter in a math expression
#[derive(Debug, Clone)]
pub struct Delimiter {
    pub kind: DelimiterKind,
    pub position: usize,
    pub is_left_command: bool, // true if using \left or \right
}

static EXPECTED_ARGS: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Fractions and binomials
    for name in ["frac", "dfrac", "tfrac", "cfrac", "binom", "dbinom", "tbinom"] {
        map.insert(name, 2);
    }

    // Roots (the optional index is handled separately)
    map.insert("sqrt", 1);

    // Text and fonts
    for name in [
        "text", "mathrm", "mathbf", "mathit", "mathsf", "mathtt", "mathcal", "mathbb",
        "mathfrak", "operatorname", "boldsymbol",
    ] {
        map.insert(name, 1);
    }

    // Accents and decorations
    for name in [
        "overline", "underline", "hat", "widehat", "tilde", "widetilde", "bar", "vec", "dot",
        "ddot", "overbrace", "underbrace", "boxed", "cancel",
    ] {
        map.insert(name, 1);
    }

    map.insert("color", 1);
    map.insert("textcolor", 2);
    map.insert("begin", 1);
    map.insert("end", 1);
    map
});

/// Expected argument counts for common math commands
pub fn get_expected_args(command: &str) -> Option<usize> {
    EXPECTED_ARGS.get(command).copied()
}

/// Check if delimiters match correctly
pub fn delimiters_match(left: &DelimiterKind, right: &DelimiterKind) -> bool {
    matches!(
        (left, right),
        (DelimiterKind::LeftParen, DelimiterKind::RightParen)
            | (DelimiterKind::LeftBracket, DelimiterKind::RightBracket)
            | (DelimiterKind::LeftBrace, DelimiterKind::RightBrace)
            | (DelimiterKind::LeftLiteralBrace, DelimiterKind::RightLiteralBrace)
            | (DelimiterKind::LeftAngle, DelimiterKind::RightAngle)
            | (DelimiterKind::LeftFloor, DelimiterKind::RightFloor)
            | (DelimiterKind::LeftCeil, DelimiterKind::RightCeil)
            | (DelimiterKind::LeftNull, DelimiterKind::RightNull)
    )
}

/// Math validation error
#[derive(Debug, Clone)]
pub enum MathError {
    MismatchedDelimiter {
        left_pos: usize,
        right_pos: usize,
        left_kind: DelimiterKind,
        right_kind: DelimiterKind,
    },
    UnmatchedOpening {
        pos: usize,
        kind: DelimiterKind,
    },
    UnmatchedClosing {
        pos: usize,
        kind: DelimiterKind,
    },
    IncorrectArgumentCount {
        command: String,
        position: usize,
        expected: usize,
        actual: usize,
    },
    UndefinedCommand {
        command: String,
        position: usize,
    },
}

impl MathError {
    pub fn to_diagnostic_message(&self) -> String {
        match self {
            MathError::MismatchedDelimiter {
                left_kind,
                right_kind,
                ..
            } => {
                format!(
                    "Mismatched delimiters: {:?} paired with {:?}",
                    left_kind, right_kind
                )
            }
            MathError::UnmatchedOpening { kind, .. } => {
                format!("Unmatched opening delimiter: {:?}", kind)
            }
            MathError::UnmatchedClosing { kind, .. } => {
                format!("Unmatched closing delimiter: {:?}", kind)
            }
            MathError::IncorrectArgumentCount {
                command,
                expected,
                actual,
                ..
            } => {
                format!(
                    "Command '\\{}' expects {} argument(s) but got {}",
                    command, expected, actual
                )
            }
            MathError::UndefinedCommand { command, .. } => {
                format!("Undefined command '\\{}'", command)
            }
        }
    }

    /// Byte offset the error is reported at.
    pub fn position(&self) -> usize {
        match self {
            MathError::MismatchedDelimiter { right_pos, .. } => *right_pos,
            MathError::UnmatchedOpening { pos, .. } | MathError::UnmatchedClosing { pos, .. } => {
                *pos
            }
            MathError::IncorrectArgumentCount { position, .. }
            | MathError::UndefinedCommand { position, .. } => *position,
        }
    }

    pub fn to_diagnostic(&self, source: &str) -> Diagnostic {
        let category = match self {
            MathError::UndefinedCommand { .. } => DiagnosticCategory::UndefinedCommand,
            _ => DiagnosticCategory::Syntax,
        };
        Diagnostic::new(category, self.to_diagnostic_message())
            .at_line(line_of(source, self.position()))
    }
}

/// Collects the delimiters of `source` in order.
///
/// `\left` and `\right` consume the token that follows them; a `.` or any token
/// that is not a recognised delimiter becomes a null delimiter so the pairing of
/// sized delimiters is still checked.
pub fn extract_delimiters(source: &str) -> Vec<Delimiter> {
    let mut delimiters = Vec::new();
    let mut tokens = Lexer::new(source)
        .tokens()
        .filter(|t| !t.kind.is_trivia());

    while let Some(token) = tokens.next() {
        if token.kind == SyntaxKind::Command && (token.text == "\\left" || token.text == "\\right")
        {
            let opening = token.text == "\\left";
            let sized = tokens
                .next()
                .and_then(|next| DelimiterKind::from_token(next.kind, next.text))
                .filter(|kind| kind.is_opening() == opening);
            let kind = match (sized, opening) {
                (Some(kind), _) => kind,
                (None, true) => DelimiterKind::LeftNull,
                (None, false) => DelimiterKind::RightNull,
            };
            delimiters.push(Delimiter {
                kind,
                position: token.offset,
                is_left_command: true,
            });
            continue;
        }

        if let Some(kind) = DelimiterKind::from_token(token.kind, token.text) {
            delimiters.push(Delimiter {
                kind,
                position: token.offset,
                is_left_command: false,
            });
        }
    }
    delimiters
}

/// Checks that commands with mandatory arguments receive all of them.
pub fn check_arguments(source: &str) -> Vec<MathError> {
    let mut errors = Vec::new();

    for token in Lexer::new(source).tokens() {
        if token.kind != SyntaxKind::Command {
            continue;
        }
        let name = &token.text[1..];
        let Some(expected) = get_expected_args(name) else {
            continue;
        };

        let mut pos = token.offset + token.text.len();
        if name == "sqrt" {
            pos = skip_optional_argument(source, pos);
        }

        let mut actual = 0;
        while actual < expected {
            match argument_span(source, pos) {
                Some((_, end)) => {
                    actual += 1;
                    pos = end;
                }
                None => break,
            }
        }

        if actual < expected {
            errors.push(MathError::IncorrectArgumentCount {
                command: name.to_string(),
                position: token.offset,
                expected,
                actual,
            });
        }
    }
    errors
}

/// Reports multi-letter commands outside the known vocabulary.
pub fn check_commands(source: &str, config: &EngineConfig) -> Vec<MathError> {
    Lexer::new(source)
        .tokens()
        .filter(|t| t.kind == SyntaxKind::Command && is_word_command(t.text))
        .filter(|t| {
            let name = &t.text[1..];
            !vocabulary::is_known(name) && !config.is_known_command(name)
        })
        .map(|t| MathError::UndefinedCommand {
            command: t.text[1..].to_string(),
            position: t.offset,
        })
        .collect()
}

/// Runs every LaTeX check on `source` and returns the findings as diagnostics.
pub fn check_latex(source: &str, config: &EngineConfig) -> Vec<Diagnostic> {
    let mut validator = DelimiterValidator::new();
    validator.validate(&extract_delimiters(source));

    let mut errors = validator.errors().to_vec();
    errors.extend(check_arguments(source));
    if config.grammar_checks {
        errors.extend(check_commands(source, config));
    }
    errors.sort_by_key(MathError::position);

    errors.iter().map(|e| e.to_diagnostic(source)).collect()
}

fn is_word_command(text: &str) -> bool {
    text.len() > 1 && text[1..].bytes().all(|b| b.is_ascii_alphabetic())
}

fn skip_optional_argument(source: &str, pos: usize) -> usize {
    let rest = &source[pos..];
    let trimmed = rest.trim_start();
    if !trimmed.starts_with('[') {
        return pos;
    }
    let start = pos + (rest.len() - trimmed.len());
    match trimmed.find(']') {
        Some(close) => start + close + 1,
        None => pos,
    }
}
