pub mod lexer;

pub use lexer::{Lexer, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyntaxKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Command,   // \frac, \alpha, \%
    LineBreak, // \\
    Dollar,
    Ampersand, // alignment anchor
    Caret,
    Underscore,
    Whitespace,
    Comment, // % ...
    Text,

    Eof,
}

impl SyntaxKind {
    /// Returns true for tokens that carry no meaning for the math structure.
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::Whitespace | SyntaxKind::Comment)
    }
}

/// Converts a byte offset into a 1-based line number.
///
/// Offsets past the end of `input` resolve to the last line.
pub fn line_of(input: &str, offset: usize) -> u32 {
    let end = offset.min(input.len());
    let newlines = input.as_bytes()[..end].iter().filter(|b| **b == b'\n').count();
    newlines as u32 + 1
}

/// Finds the end of the brace group that opens at byte `open`.
///
/// Returns the offset just past the matching `}`. Escaped braces (`\{`, `\}`) do
/// not count towards nesting. Returns `None` if `open` is not a `{` or the group
/// is never closed.
pub fn group_end(input: &str, open: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Finds the TeX argument that starts at or after byte `from`.
///
/// Leading whitespace is skipped. An argument is a brace group, a single command,
/// or a single character, the way TeX reads undelimited macro arguments. Returns
/// the `(start, end)` byte span, braces included, or `None` when the next token
/// cannot start an argument (end of input, a closing brace, an alignment tab, a
/// script marker, or a `\\` line break).
pub fn argument_span(input: &str, from: usize) -> Option<(usize, usize)> {
    let rest = input.get(from..)?;
    let start = from + (rest.len() - rest.trim_start().len());
    let mut chars = input[start..].chars();

    let end = match chars.next()? {
        '{' => group_end(input, start)?,
        '}' | '&' | '^' | '_' | '%' | '$' => return None,
        '\\' => match chars.next() {
            None | Some('\\') => return None,
            Some(c) if c.is_ascii_alphabetic() => {
                let letters = input[start + 1..]
                    .bytes()
                    .take_while(u8::is_ascii_alphabetic)
                    .count();
                start + 1 + letters
            }
            Some(c) => start + 1 + c.len_utf8(),
        },
        c => start + c.len_utf8(),
    };
    Some((start, end))
}

/// Finds the end of the `\end{name}` closing an environment whose body starts at `from`.
///
/// Nested environments of the same name are skipped. Returns the offset just past
/// the closing `\end{name}`.
pub fn environment_end(input: &str, from: usize, name: &str) -> Option<usize> {
    let open = format!("\\begin{{{}}}", name);
    let close = format!("\\end{{{}}}", name);
    let mut depth = 1usize;
    let mut pos = from;

    loop {
        let next_close = input.get(pos..)?.find(&close)? + pos;
        match input[pos..].find(&open).map(|i| i + pos) {
            Some(next_open) if next_open < next_close => {
                depth += 1;
                pos = next_open + open.len();
            }
            _ => {
                depth -= 1;
                pos = next_close + close.len();
                if depth == 0 {
                    return Some(pos);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_end_nested() {
        let input = r"\frac{a{b}}{c}";
        assert_eq!(group_end(input, 5), Some(11));
        assert_eq!(&input[5..11], "{a{b}}");
        assert_eq!(group_end(input, 11), Some(14));
    }

    #[test]
    fn test_group_end_skips_escaped_braces() {
        let input = r"{\}}";
        assert_eq!(group_end(input, 0), Some(4));
    }

    #[test]
    fn test_group_end_unclosed() {
        assert_eq!(group_end("{a{b}", 0), None);
        assert_eq!(group_end("a", 0), None);
    }

    #[test]
    fn test_argument_span() {
        let input = r"\frac {a} 2";
        assert_eq!(argument_span(input, 5), Some((6, 9)));
        assert_eq!(argument_span(input, 9), Some((10, 11)));
        assert_eq!(argument_span(input, 11), None);
    }

    #[test]
    fn test_argument_span_command_and_stops() {
        assert_eq!(argument_span(r"\alpha\beta", 0), Some((0, 6)));
        assert_eq!(argument_span(r"\,x", 0), Some((0, 2)));
        assert_eq!(argument_span(r"\\ x", 0), None);
        assert_eq!(argument_span("} x", 0), None);
        assert_eq!(argument_span("{open", 0), None);
    }

    #[test]
    fn test_environment_end_nested() {
        let input = r"\begin{m} a \begin{m} b \end{m} \end{m} c";
        let body = r"\begin{m}".len();
        assert_eq!(&input[environment_end(input, body, "m").unwrap()..], " c");
        assert_eq!(environment_end(r"\begin{m} open", body, "m"), None);
    }
}
