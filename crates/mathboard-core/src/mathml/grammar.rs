//! The subset of the presentation MathML grammar the engine enforces.

use super::tree::{Element, Node};
use crate::diagnostic::{Diagnostic, DiagnosticCategory};

pub const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// What an element may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// Character data only: `mi`, `mn`, `mo`, `mtext`, `ms`.
    Token,
    /// No content at all: `mspace`, `mglyph`, `none`, `mprescripts`.
    Empty,
    /// Any number of children, laid out as a row.
    Row,
    /// A single child; several children must be wrapped in one `mrow`.
    Single,
    /// Exactly this many operands, each wrapped in its own `mrow`.
    Operands(usize),
    /// Only `mtr` or `mlabeledtr` children.
    Table,
    /// Only `mtd` children.
    TableRow,
    /// Not checked: script lists and annotation content.
    Unchecked,
}

pub fn content_model(name: &str) -> Option<ContentModel> {
    let model = match name {
        "mi" | "mn" | "mo" | "mtext" | "ms" => ContentModel::Token,
        "mspace" | "mglyph" | "none" | "mprescripts" | "malignmark" | "maligngroup" => {
            ContentModel::Empty
        }
        "math" | "mrow" | "mstyle" | "merror" | "mpadded" | "mphantom" | "mtd" | "mfenced"
        | "maction" => ContentModel::Row,
        "msqrt" | "menclose" => ContentModel::Single,
        "mfrac" | "mroot" | "msub" | "msup" | "munder" | "mover" => ContentModel::Operands(2),
        "msubsup" | "munderover" => ContentModel::Operands(3),
        "mtable" => ContentModel::Table,
        "mtr" | "mlabeledtr" => ContentModel::TableRow,
        "mmultiscripts" | "semantics" | "annotation" | "annotation-xml" => {
            ContentModel::Unchecked
        }
        _ => return None,
    };
    Some(model)
}

/// Attributes an element must carry, with the value repair inserts.
pub fn required_attributes(name: &str) -> &'static [(&'static str, &'static str)] {
    match name {
        "mglyph" => &[("alt", "")],
        _ => &[],
    }
}

/// Checks `root` and every descendant against the grammar.
pub fn check_tree(root: &Element) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    check_element(root, &mut diagnostics);
    diagnostics
}

fn at(diag: Diagnostic, element: &Element) -> Diagnostic {
    match element.source_line() {
        Some(line) => diag.at_line(line),
        None => diag,
    }
}

fn check_element(element: &Element, out: &mut Vec<Diagnostic>) {
    let Some(model) = content_model(&element.name) else {
        out.push(at(
            Diagnostic::new(
                DiagnosticCategory::Syntax,
                format!("invalid tag <{}>: not a presentation MathML element", element.name),
            ),
            element,
        ));
        return;
    };

    for (attr, _) in required_attributes(&element.name) {
        if element.attribute(attr).is_none() {
            out.push(at(
                Diagnostic::new(
                    DiagnosticCategory::MissingAttribute,
                    format!("<{}> requires attribute \"{}\"", element.name, attr),
                ),
                element,
            ));
        }
    }

    if model == ContentModel::Unchecked {
        return;
    }

    let has_text = element
        .children
        .iter()
        .any(|n| matches!(n, Node::Text(t) if !t.trim().is_empty()));
    let elements: Vec<&Element> = element.element_children().collect();

    match model {
        ContentModel::Token => {
            if let Some(child) = elements.first() {
                out.push(at(
                    Diagnostic::new(
                        DiagnosticCategory::Syntax,
                        format!(
                            "<{}> is not allowed inside token element <{}>",
                            child.name, element.name
                        ),
                    ),
                    child,
                ));
            }
            return;
        }
        ContentModel::Empty => {
            if has_text || !elements.is_empty() {
                out.push(at(
                    Diagnostic::new(
                        DiagnosticCategory::Syntax,
                        format!("<{}> must be empty", element.name),
                    ),
                    element,
                ));
            }
            return;
        }
        _ => {}
    }

    if has_text {
        out.push(at(
            Diagnostic::new(
                DiagnosticCategory::Syntax,
                format!(
                    "character data is not allowed directly inside <{}>; use a token element",
                    element.name
                ),
            ),
            element,
        ));
    }

    match model {
        ContentModel::Single if elements.len() > 1 => out.push(at(
            Diagnostic::new(
                DiagnosticCategory::MissingElement,
                format!(
                    "<{}> has {} children; wrap them in a single <mrow>",
                    element.name,
                    elements.len()
                ),
            ),
            element,
        )),
        ContentModel::Operands(arity) => {
            if elements.len() != arity {
                out.push(at(
                    Diagnostic::new(
                        DiagnosticCategory::MissingElement,
                        format!(
                            "<{}> expects {} operands, found {}",
                            element.name,
                            arity,
                            elements.len()
                        ),
                    ),
                    element,
                ));
            }
            for (i, child) in elements.iter().enumerate() {
                if child.name != "mrow" {
                    out.push(at(
                        Diagnostic::new(
                            DiagnosticCategory::MissingElement,
                            format!(
                                "operand {} of <{}> must be wrapped in <mrow>, found <{}>",
                                i + 1,
                                element.name,
                                child.name
                            ),
                        ),
                        child,
                    ));
                }
            }
        }
        ContentModel::Table => {
            for child in elements
                .iter()
                .filter(|c| c.name != "mtr" && c.name != "mlabeledtr")
            {
                out.push(at(
                    Diagnostic::new(
                        DiagnosticCategory::MissingElement,
                        format!("<{}> inside <mtable> must be wrapped in <mtr>", child.name),
                    ),
                    child,
                ));
            }
        }
        ContentModel::TableRow => {
            for child in elements.iter().filter(|c| c.name != "mtd") {
                out.push(at(
                    Diagnostic::new(
                        DiagnosticCategory::MissingElement,
                        format!(
                            "<{}> inside <{}> must be wrapped in <mtd>",
                            child.name, element.name
                        ),
                    ),
                    child,
                ));
            }
        }
        _ => {}
    }

    for child in elements {
        check_element(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mathml::tree::parse;

    fn check(text: &str) -> Vec<Diagnostic> {
        check_tree(&parse(text).unwrap())
    }

    #[test]
    fn test_wrapped_fraction_is_clean() {
        assert!(check("<math><mfrac><mrow><mn>1</mn></mrow><mrow><mn>2</mn></mrow></mfrac></math>")
            .is_empty());
    }

    #[test]
    fn test_bare_operands_flagged() {
        let diags = check("<math><mfrac><mn>1</mn><mn>2</mn></mfrac></math>");
        assert_eq!(diags.len(), 2);
        assert!(diags
            .iter()
            .all(|d| d.category == DiagnosticCategory::MissingElement));
    }

    #[test]
    fn test_arity() {
        let diags = check("<math><mfrac><mrow><mn>1</mn></mrow></mfrac></math>");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("expects 2 operands, found 1"));
    }

    #[test]
    fn test_unknown_tag() {
        let diags = check("<math>\n<invalid>x</invalid></math>");
        assert_eq!(diags[0].category, DiagnosticCategory::Syntax);
        assert_eq!(diags[0].line, Some(2));
    }

    #[test]
    fn test_mglyph_alt_required() {
        let diags = check("<math><mglyph src=\"a.png\"/></math>");
        assert_eq!(diags[0].category, DiagnosticCategory::MissingAttribute);
    }

    #[test]
    fn test_stray_table_cells() {
        let diags = check("<math><mtable><mtd><mn>1</mn></mtd></mtable></math>");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("<mtr>"));
    }

    #[test]
    fn test_token_with_element_child() {
        let diags = check("<math><mi><mn>1</mn></mi></math>");
        assert_eq!(diags[0].category, DiagnosticCategory::Syntax);
    }

    #[test]
    fn test_text_in_row() {
        let diags = check("<math><mrow>x</mrow></math>");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.starts_with("character data"));
    }
}
