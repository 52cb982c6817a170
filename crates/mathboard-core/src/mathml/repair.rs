//! Structural repair of presentation MathML.
//!
//! Repair only adds structure: it wraps operands in `mrow`, wraps stray table
//! content in `mtr`/`mtd`, turns loose character data into token elements, and
//! fills in required attributes and the root namespace. It never deletes content,
//! so a fragment with a missing operand stays invalid after repair.

use super::grammar::{content_model, required_attributes, ContentModel, MATHML_NS};
use super::tree::{Element, Node};
use super::validator::{MathmlValidator, Validation};
use serde::Serialize;

/// Repaired text plus a short description of each change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repair {
    pub text: String,
    pub actions: Vec<String>,
}

impl Repair {
    pub fn is_unchanged(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Repairs `text` using the findings of a previous validation.
///
/// Valid or malformed input is returned as is: the first needs nothing, the
/// second cannot be walked.
pub fn repair(text: &str, validation: &Validation, validator: &MathmlValidator) -> Repair {
    let unchanged = || Repair {
        text: text.to_string(),
        actions: Vec::new(),
    };

    if (validation.is_valid && !validation.namespace_inserted) || validation.is_malformed() {
        return unchanged();
    }
    let Ok(mut root) = validator.parse(text) else {
        return unchanged();
    };

    let mut actions = Vec::new();
    repair_element(&mut root, &mut actions);

    if root.name == "math" && root.namespace.is_none() {
        root.namespace = Some(MATHML_NS.to_string());
        actions.push("inserted MathML namespace on <math>".to_string());
    }

    log::debug!("mathml repair applied {} change(s)", actions.len());
    Repair {
        text: root.to_xml(),
        actions,
    }
}

/// Repairs, then validates the result once.
pub fn repair_and_revalidate(
    text: &str,
    validation: &Validation,
    validator: &MathmlValidator,
) -> (Repair, Validation) {
    let repaired = repair(text, validation, validator);
    let revalidated = validator.validate(&repaired.text);
    (repaired, revalidated)
}

fn repair_element(element: &mut Element, actions: &mut Vec<String>) {
    for (attr, default) in required_attributes(&element.name) {
        if element.attribute(attr).is_none() {
            element.set_attribute(attr, default);
            actions.push(format!("added {}=\"{}\" to <{}>", attr, default, element.name));
        }
    }

    let Some(model) = content_model(&element.name) else {
        return;
    };

    match model {
        ContentModel::Token | ContentModel::Empty | ContentModel::Unchecked => return,
        _ => {}
    }

    if element.children.iter().any(|n| matches!(n, Node::Text(_))) {
        let children = std::mem::take(&mut element.children);
        element.children = children
            .into_iter()
            .map(|n| match n {
                Node::Text(t) => {
                    actions.push(format!("wrapped text {:?} in <{}>", t.trim(), token_for(&t)));
                    let mut token = Element::new(token_for(&t));
                    token.children.push(Node::Text(t.trim().to_string()));
                    Node::Element(token)
                }
                other => other,
            })
            .collect();
    }

    match model {
        ContentModel::Single if element.children.len() > 1 => {
            let children = std::mem::take(&mut element.children);
            element
                .children
                .push(Node::Element(Element::with_children("mrow", children)));
            actions.push(format!("wrapped children of <{}> in <mrow>", element.name));
        }
        ContentModel::Operands(_) => {
            wrap_each(element, |name| name == "mrow", "mrow", actions);
        }
        ContentModel::Table => {
            for child in element.children.iter_mut() {
                let Node::Element(e) = &*child else {
                    continue;
                };
                let name = e.name.clone();
                if name == "mtd" {
                    wrap_in_place(child, "mtr");
                    actions.push("wrapped <mtd> in <mtr>".to_string());
                } else if name != "mtr" && name != "mlabeledtr" {
                    wrap_in_place(child, "mtd");
                    wrap_in_place(child, "mtr");
                    actions.push(format!("wrapped <{}> in <mtr><mtd>", name));
                }
            }
        }
        ContentModel::TableRow => {
            wrap_each(element, |name| name == "mtd", "mtd", actions);
        }
        _ => {}
    }

    for child in element.children.iter_mut() {
        if let Node::Element(e) = child {
            repair_element(e, actions);
        }
    }
}

fn wrap_each(
    element: &mut Element,
    accepted: impl Fn(&str) -> bool,
    wrapper: &str,
    actions: &mut Vec<String>,
) {
    let parent = element.name.clone();
    for child in element.children.iter_mut() {
        let Node::Element(e) = &*child else {
            continue;
        };
        if !accepted(&e.name) {
            actions.push(format!(
                "wrapped <{}> in <{}> inside <{}>",
                e.name, wrapper, parent
            ));
            wrap_in_place(child, wrapper);
        }
    }
}

fn wrap_in_place(node: &mut Node, wrapper: &str) {
    let inner = std::mem::replace(node, Node::Text(String::new()));
    *node = Node::Element(Element::with_children(wrapper, vec![inner]));
}

fn token_for(text: &str) -> &'static str {
    let trimmed = text.trim();
    if trimmed.chars().all(|c| c.is_ascii_digit() || c == '.') {
        "mn"
    } else if trimmed.chars().count() == 1 && trimmed.chars().all(char::is_alphabetic) {
        "mi"
    } else {
        "mtext"
    }
}
