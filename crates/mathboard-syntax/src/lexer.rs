use crate::SyntaxKind;

/// A lexer for LaTeX math fragments.
///
/// ## Overview
///
/// The lexer performs **character-level scanning** of the math text an explanation
/// step carries, producing a stream of ([`SyntaxKind`], `&str`) tuples. It handles:
///
/// - **Commands**: `\frac`, `\alpha`, `\%` (escape sequences)
/// - **Line breaks**: `\\` is its own token so alignment code can find rows
/// - **Grouping**: `{`, `}`, `[`, `]`, `(`, `)`
/// - **Math structure**: `^`, `_`, `&`, `$`
/// - **Comments**: `%` through end of line
/// - **Whitespace**: Consecutive whitespace collapsed into single tokens
/// - **Text**: Everything else, consumed greedily until a special character
///
/// Model output is frequently malformed, so the lexer never fails: anything it does
/// not recognise becomes [`SyntaxKind::Text`].
///
/// ## Examples
///
/// ```
/// use mathboard_syntax::lexer::Lexer;
/// use mathboard_syntax::SyntaxKind;
///
/// let tokens: Vec<_> = Lexer::new(r"\frac{a}{b}").collect();
///
/// assert_eq!(tokens[0], (SyntaxKind::Command, r"\frac"));
/// assert_eq!(tokens[1], (SyntaxKind::LBrace, "{"));
/// assert_eq!(tokens[2], (SyntaxKind::Text, "a"));
/// ```
///
/// ### Tracking Offsets
///
/// ```
/// use mathboard_syntax::lexer::Lexer;
/// use mathboard_syntax::SyntaxKind;
///
/// let tokens: Vec<_> = Lexer::new(r"x \\ y").tokens().collect();
/// assert_eq!(tokens[2].kind, SyntaxKind::LineBreak);
/// assert_eq!(tokens[2].offset, 2);
/// ```
pub struct Lexer<'a> {
    /// The input source text being lexed.
    input: &'a str,
    /// Current byte position in the input.
    position: usize,
}

/// A token together with its byte offset in the lexed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new `Lexer` for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Byte offset of the next token.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns an iterator yielding [`Token`]s with their offsets.
    pub fn tokens(self) -> Tokens<'a> {
        Tokens { lexer: self }
    }

    /// Returns the next token (kind, text).
    /// If EOF, returns (SyntaxKind::Eof, "").
    pub fn next_token(&mut self) -> (SyntaxKind, &'a str) {
        let start = self.position;
        let Some(c) = self.input[start..].chars().next() else {
            return (SyntaxKind::Eof, "");
        };
        self.position += c.len_utf8();

        let kind = match c {
            '\\' => match self.peek() {
                Some('\\') => {
                    self.position += 1;
                    SyntaxKind::LineBreak
                }
                Some(next) if next.is_ascii_alphabetic() => {
                    // Multi-letter command: \frac
                    self.eat_while(|n| n.is_ascii_alphabetic());
                    SyntaxKind::Command
                }
                Some(next) => {
                    // Single-symbol command: \{ or \,
                    self.position += next.len_utf8();
                    SyntaxKind::Command
                }
                None => SyntaxKind::Text,
            },
            '{' => SyntaxKind::LBrace,
            '}' => SyntaxKind::RBrace,
            '[' => SyntaxKind::LBracket,
            ']' => SyntaxKind::RBracket,
            '(' => SyntaxKind::LParen,
            ')' => SyntaxKind::RParen,
            '$' => SyntaxKind::Dollar,
            '&' => SyntaxKind::Ampersand,
            '^' => SyntaxKind::Caret,
            '_' => SyntaxKind::Underscore,
            '%' => {
                self.eat_while(|n| n != '\n' && n != '\r');
                SyntaxKind::Comment
            }
            c if c.is_whitespace() => {
                self.eat_while(char::is_whitespace);
                SyntaxKind::Whitespace
            }
            _ => {
                self.eat_while(|n| !is_special(n) && !n.is_whitespace());
                SyntaxKind::Text
            }
        };

        (kind, &self.input[start..self.position])
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn eat_while(&mut self, mut keep: impl FnMut(char) -> bool) {
        while let Some(n) = self.peek() {
            if !keep(n) {
                break;
            }
            self.position += n.len_utf8();
        }
    }
}

fn is_special(c: char) -> bool {
    matches!(
        c,
        '\\' | '{' | '}' | '[' | ']' | '(' | ')' | '%' | '$' | '&' | '^' | '_'
    )
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (SyntaxKind, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let (kind, text) = self.next_token();
        if kind == SyntaxKind::Eof {
            None
        } else {
            Some((kind, text))
        }
    }
}

/// Iterator returned by [`Lexer::tokens`].
pub struct Tokens<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.lexer.position();
        let (kind, text) = self.lexer.next_token();
        if kind == SyntaxKind::Eof {
            None
        } else {
            Some(Token { kind, text, offset })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<(SyntaxKind, &str)> {
        let lexer = Lexer::new(input);
        lexer.collect()
    }

    #[test]
    fn test_basic_tokens() {
        let input = r"\sqrt{x} % root";
        let tokens = tokenize(input);
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::Command, "\\sqrt"),
                (SyntaxKind::LBrace, "{"),
                (SyntaxKind::Text, "x"),
                (SyntaxKind::RBrace, "}"),
                (SyntaxKind::Whitespace, " "),
                (SyntaxKind::Comment, "% root"),
            ]
        );
    }

    #[test]
    fn test_line_break_is_not_a_command() {
        let tokens = tokenize(r"a\\b");
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::Text, "a"),
                (SyntaxKind::LineBreak, "\\\\"),
                (SyntaxKind::Text, "b"),
            ]
        );
    }

    #[test]
    fn test_line_break_followed_by_command() {
        let tokens = tokenize(r"\\\alpha");
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::LineBreak, "\\\\"),
                (SyntaxKind::Command, "\\alpha"),
            ]
        );
    }

    #[test]
    fn test_escaped_symbols() {
        let tokens = tokenize(r"50\% \{");
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::Text, "50"),
                (SyntaxKind::Command, "\\%"),
                (SyntaxKind::Whitespace, " "),
                (SyntaxKind::Command, "\\{"),
            ]
        );
    }

    #[test]
    fn test_scripts_and_anchors() {
        let tokens = tokenize("x^2_i&=");
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::Text, "x"),
                (SyntaxKind::Caret, "^"),
                (SyntaxKind::Text, "2"),
                (SyntaxKind::Underscore, "_"),
                (SyntaxKind::Text, "i"),
                (SyntaxKind::Ampersand, "&"),
                (SyntaxKind::Text, "="),
            ]
        );
    }

    #[test]
    fn test_lexer_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_trailing_backslash() {
        let tokens = tokenize("a\\");
        assert_eq!(tokens, vec![(SyntaxKind::Text, "a"), (SyntaxKind::Text, "\\")]);
    }

    #[test]
    fn test_lexer_multi_byte_text() {
        let tokens = tokenize("θ≤π");
        assert_eq!(tokens, vec![(SyntaxKind::Text, "θ≤π")]);
    }

    #[test]
    fn test_token_offsets() {
        let tokens: Vec<_> = Lexer::new("(a)").tokens().collect();
        let offsets: Vec<_> = tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 1, 2]);
        assert_eq!(tokens[2].kind, SyntaxKind::RParen);
    }
}
