//! Command-preserving tokenization.
//!
//! Text rewrites that work on line structure (collapsing `\\` runs, splitting rows)
//! must not touch the inside of commands such as `\text{a \\ b}` or a nested
//! `\begin{pmatrix} ... \end{pmatrix}`. [`PlaceholderMap::protect`] swaps each such
//! span for an opaque token built from private-use code points, and
//! [`PlaceholderMap::restore`] puts the originals back.
//!
//! [`with_commands_protected`] ties the two together: whatever the rewrite does,
//! the caller either gets fully restored text or an error, never a token.

use crate::error::StageError;
use mathboard_syntax::{environment_end, group_end, Lexer, SyntaxKind};

/// Opens a placeholder token. Private-use, so generator output never contains it.
pub const PLACEHOLDER_OPEN: char = '\u{E000}';
/// Closes a placeholder token.
pub const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Ordered mapping from placeholder tokens to the command text they replaced.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces every command span in `text` with a fresh placeholder.
    ///
    /// A command span is a backslash followed by letters plus any brace groups that
    /// immediately follow it. A `\begin{name}` span extends to its matching
    /// `\end{name}` so inner rows stay intact.
    pub fn protect(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        for token in Lexer::new(text).tokens() {
            if token.offset < cursor {
                continue;
            }
            if token.kind != SyntaxKind::Command || !is_word_command(token.text) {
                continue;
            }

            let end = command_span_end(text, token.offset, token.text);
            out.push_str(&text[cursor..token.offset]);
            out.push_str(&self.insert(&text[token.offset..end]));
            cursor = end;
        }

        out.push_str(&text[cursor..]);
        out
    }

    /// Substitutes every placeholder back with its original text, in insertion order.
    pub fn restore(&self, text: &str) -> String {
        let mut restored = text.to_string();
        for (token, original) in &self.entries {
            restored = restored.replace(token.as_str(), original);
        }
        restored
    }

    /// The original text of the first placeholder that does not appear in `text`.
    pub fn first_missing(&self, text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(token, _)| !text.contains(token.as_str()))
            .map(|(_, original)| original.as_str())
    }

    fn insert(&mut self, original: &str) -> String {
        let token = format!(
            "{}{}{}",
            PLACEHOLDER_OPEN,
            self.entries.len(),
            PLACEHOLDER_CLOSE
        );
        self.entries.push((token.clone(), original.to_string()));
        token
    }
}

/// Runs `rewrite` on `text` with every command span replaced by a placeholder.
///
/// The rewrite's output is restored before it is returned. If the rewrite fails,
/// drops a placeholder, or placeholder characters survive restoration, the result
/// is a [`StageError`] and the caller keeps its own copy of the input.
pub fn with_commands_protected<F>(
    stage: &'static str,
    text: &str,
    rewrite: F,
) -> Result<String, StageError>
where
    F: FnOnce(&str) -> Result<String, StageError>,
{
    let mut map = PlaceholderMap::new();
    let protected = map.protect(text);
    log::trace!("{}: protected {} command span(s)", stage, map.len());

    let rewritten = rewrite(&protected)?;

    if let Some(original) = map.first_missing(&rewritten) {
        return Err(StageError::DroppedPlaceholder {
            stage,
            original: original.to_string(),
        });
    }

    let restored = map.restore(&rewritten);
    if restored.contains(PLACEHOLDER_OPEN) || restored.contains(PLACEHOLDER_CLOSE) {
        return Err(StageError::LeakedPlaceholder { stage });
    }
    Ok(restored)
}

fn is_word_command(text: &str) -> bool {
    text.len() > 1 && text[1..].bytes().all(|b| b.is_ascii_alphabetic())
}

fn command_span_end(text: &str, start: usize, command: &str) -> usize {
    let mut end = start + command.len();
    let first_group = end;
    while let Some(group) = group_end(text, end) {
        end = group;
    }

    if command == "\\begin" && end > first_group {
        let name = &text[first_group + 1..end_of_first_group(text, first_group)];
        if let Some(env_end) = environment_end(text, end, name) {
            return env_end;
        }
    }
    end
}

fn end_of_first_group(text: &str, open: usize) -> usize {
    group_end(text, open).map_or(open + 1, |end| end - 1)
}
