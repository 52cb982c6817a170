//! Ordered regex rewrite tables.
//!
//! The cosmetic fixer and the phrasebook are both expressed as a slice of
//! [`ConversionRule`]s applied front to back. Each rule sees the output of the
//! previous one, so order is part of the table's meaning.

use regex::{Captures, Regex};
use std::borrow::Cow;

/// How a matched span is rewritten.
pub enum Replacement {
    /// A `regex` replacement template (`${1}` style references).
    Template(&'static str),
    /// Computed replacement for rules a template cannot express.
    Function(fn(&Captures) -> String),
}

pub struct ConversionRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub replacement: Replacement,
}

impl ConversionRule {
    /// Builds a template rule. Patterns are compile-time constants; an invalid one
    /// is a programming error.
    pub fn template(name: &'static str, pattern: &str, template: &'static str) -> Self {
        Self {
            name,
            pattern: compile(name, pattern),
            replacement: Replacement::Template(template),
        }
    }

    pub fn function(name: &'static str, pattern: &str, f: fn(&Captures) -> String) -> Self {
        Self {
            name,
            pattern: compile(name, pattern),
            replacement: Replacement::Function(f),
        }
    }

    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.replacement {
            Replacement::Template(template) => self.pattern.replace_all(text, *template),
            Replacement::Function(f) => self.pattern.replace_all(text, |caps: &Captures| f(caps)),
        }
    }
}

/// Applies every rule in order.
pub fn apply_rules(rules: &[ConversionRule], text: &str) -> String {
    let mut current = text.to_string();
    for rule in rules {
        if let Cow::Owned(rewritten) = rule.apply(&current) {
            log::trace!("rule {} rewrote {:?}", rule.name, current);
            current = rewritten;
        }
    }
    current
}

fn compile(name: &str, pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("rule {} has an invalid pattern: {}", name, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_apply_in_order() {
        let rules = vec![
            ConversionRule::template("a-to-b", "a", "b"),
            ConversionRule::template("b-to-c", "b", "c"),
        ];
        assert_eq!(apply_rules(&rules, "ab"), "cc");
    }

    #[test]
    fn test_function_rule() {
        let rules = vec![ConversionRule::function("double", r"\d", |caps| {
            caps[0].repeat(2)
        })];
        assert_eq!(apply_rules(&rules, "x1y2"), "x11y22");
    }

    #[test]
    fn test_unchanged_text_is_borrowed() {
        let rule = ConversionRule::template("noop", "z", "y");
        assert!(matches!(rule.apply("abc"), Cow::Borrowed(_)));
    }
}
