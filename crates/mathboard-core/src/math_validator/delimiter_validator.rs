use super::{delimiters_match, Delimiter, MathError};

/// Validates delimiter matching in LaTeX mathematical expressions.
///
/// ## Algorithm
///
/// This validator uses a **stack-based approach** to verify that delimiters are
/// properly balanced and correctly matched:
///
/// 1. **Opening delimiters** (`(`, `[`, `{`, `\langle`, `\left`, etc.) are pushed onto a stack
/// 2. **Closing delimiters** pop from the stack and verify the types match
/// 3. At the end, any remaining delimiters on the stack are reported as unmatched
///
/// A `\left`/`\right` pair matches whatever delimiters it carries (`\left[ 0, 1 \right)`
/// is a half-open interval), but it must not pair with a plain delimiter.
///
/// ## Examples
///
/// ```
/// use mathboard_core::math_validator::{extract_delimiters, DelimiterValidator};
///
/// let mut validator = DelimiterValidator::new();
/// validator.validate(&extract_delimiters(r"\left( \frac{a}{b} \right)"));
/// assert!(!validator.has_errors());
///
/// let mut validator = DelimiterValidator::new();
/// validator.validate(&extract_delimiters("(a]"));
/// assert_eq!(validator.errors().len(), 1);
/// ```
pub struct DelimiterValidator {
    errors: Vec<MathError>,
}

impl DelimiterValidator {
    /// Creates a new validator with an empty error list.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Validates a sequence of delimiters for proper matching.
    ///
    /// Errors accumulate across calls; every failure is reported rather than
    /// stopping at the first.
    pub fn validate(&mut self, delimiters: &[Delimiter]) {
        let mut stack: Vec<&Delimiter> = Vec::new();

        for delim in delimiters {
            if delim.kind.is_opening() {
                stack.push(delim);
                continue;
            }

            let Some(left) = stack.pop() else {
                self.errors.push(MathError::UnmatchedClosing {
                    pos: delim.position,
                    kind: delim.kind.clone(),
                });
                continue;
            };

            let matched = if left.is_left_command || delim.is_left_command {
                left.is_left_command && delim.is_left_command
            } else {
                delimiters_match(&left.kind, &delim.kind)
            };
            if !matched {
                self.errors.push(MathError::MismatchedDelimiter {
                    left_pos: left.position,
                    right_pos: delim.position,
                    left_kind: left.kind.clone(),
                    right_kind: delim.kind.clone(),
                });
            }
        }

        // Check for unclosed delimiters
        for left in stack {
            self.errors.push(MathError::UnmatchedOpening {
                pos: left.position,
                kind: left.kind.clone(),
            });
        }
    }

    /// Returns the collected validation errors.
    pub fn errors(&self) -> &[MathError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Default for DelimiterValidator {
    fn default() -> Self {
        Self::new()
    }
}
