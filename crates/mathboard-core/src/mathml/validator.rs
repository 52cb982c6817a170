use super::grammar::{check_tree, MATHML_NS};
use super::tree::{parse, Element};
use crate::config::EngineConfig;
use crate::diagnostic::{Diagnostic, DiagnosticCategory};
use serde::Serialize;

/// Result of validating one MathML fragment.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Validation {
    pub is_valid: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// The root had no namespace; the canonical one should be added.
    pub namespace_inserted: bool,
}

impl Validation {
    pub fn into_parts(self) -> (bool, Vec<Diagnostic>) {
        (self.is_valid, self.diagnostics)
    }

    /// Returns true if the text could not be parsed as XML at all.
    pub fn is_malformed(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.category == DiagnosticCategory::Malformed)
    }
}

/// Validates presentation MathML.
///
/// A fragment is valid when it parses as XML, its root is `<math>` in the MathML
/// namespace (or in no namespace), and, with grammar checks enabled, every element
/// satisfies its content model.
#[derive(Debug, Clone)]
pub struct MathmlValidator {
    grammar_checks: bool,
}

impl Default for MathmlValidator {
    fn default() -> Self {
        Self {
            grammar_checks: true,
        }
    }
}

impl MathmlValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            grammar_checks: config.grammar_checks,
        }
    }

    /// Parses `text`, reporting a parse failure as a `malformed` diagnostic.
    pub fn parse(&self, text: &str) -> Result<Element, Diagnostic> {
        parse(text).map_err(|e| {
            Diagnostic::new(DiagnosticCategory::Malformed, format!("malformed XML: {}", e))
                .at_line(e.pos().row)
        })
    }

    pub fn validate(&self, text: &str) -> Validation {
        let root = match self.parse(text) {
            Ok(root) => root,
            Err(diag) => {
                return Validation {
                    is_valid: false,
                    diagnostics: vec![diag],
                    namespace_inserted: false,
                }
            }
        };
        self.validate_tree(&root)
    }

    pub fn validate_tree(&self, root: &Element) -> Validation {
        let mut validation = Validation::default();

        if root.name != "math" {
            let diag = Diagnostic::new(
                DiagnosticCategory::Other,
                format!("root element must be <math>, found <{}>", root.name),
            );
            validation.diagnostics.push(match root.source_line() {
                Some(line) => diag.at_line(line),
                None => diag,
            });
        }

        match root.namespace.as_deref() {
            None => validation.namespace_inserted = true,
            Some(MATHML_NS) => {}
            Some(other) => validation.diagnostics.push(Diagnostic::new(
                DiagnosticCategory::Other,
                format!("root element is in namespace {:?}, not MathML", other),
            )),
        }

        if self.grammar_checks {
            validation.diagnostics.extend(check_tree(root));
        }

        validation.is_valid = validation.diagnostics.is_empty();
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS_MATH: &str = "<math xmlns=\"http://www.w3.org/1998/Math/MathML\">";

    #[test]
    fn test_valid_fragment() {
        let text = format!("{}<mi>x</mi></math>", NS_MATH);
        let validation = MathmlValidator::new().validate(&text);
        assert!(validation.is_valid);
        assert!(!validation.namespace_inserted);
    }

    #[test]
    fn test_missing_namespace_is_not_an_error() {
        let validation = MathmlValidator::new().validate("<math><mi>x</mi></math>");
        assert!(validation.is_valid);
        assert!(validation.namespace_inserted);
    }

    #[test]
    fn test_malformed_reports_line() {
        let validation = MathmlValidator::new().validate("<math>\n<mi>x</mo>\n</math>");
        assert!(!validation.is_valid);
        assert!(validation.is_malformed());
        assert_eq!(validation.diagnostics[0].line, Some(2));
    }

    #[test]
    fn test_wrong_root() {
        let (valid, diags) = MathmlValidator::new()
            .validate("<mrow><mi>x</mi></mrow>")
            .into_parts();
        assert!(!valid);
        assert_eq!(diags[0].category, DiagnosticCategory::Other);
    }

    #[test]
    fn test_foreign_namespace() {
        let validation = MathmlValidator::new().validate("<math xmlns=\"urn:other\"><mi>x</mi></math>");
        assert!(!validation.is_valid);
    }

    #[test]
    fn test_grammar_checks_can_be_disabled() {
        let config = EngineConfig {
            grammar_checks: false,
            ..EngineConfig::default()
        };
        let text = format!("{}<mfrac><mn>1</mn><mn>2</mn></mfrac></math>", NS_MATH);
        assert!(MathmlValidator::from_config(&config).validate(&text).is_valid);
        assert!(!MathmlValidator::new().validate(&text).is_valid);
    }
}
