//! Removal of MathML constructs that can run code or hide alternative content.

use super::tree::{Element, Node};

/// Strips unsafe or non-presentational content from `root` in place.
///
/// * `annotation` and `annotation-xml` are dropped.
/// * `semantics` and `maction` are replaced by their first element child.
/// * Event handler attributes (`on*`) and `javascript:` URLs are removed.
///
/// Returns true if anything changed.
pub fn sanitize_tree(root: &mut Element) -> bool {
    let mut changed = strip_attributes(root);

    let children = std::mem::take(&mut root.children);
    for child in children {
        match child {
            Node::Element(e) if is_annotation(&e.name) => changed = true,
            Node::Element(e) if e.name == "semantics" || e.name == "maction" => {
                changed = true;
                if let Some(Node::Element(mut first)) = e
                    .children
                    .into_iter()
                    .find(|n| matches!(n, Node::Element(c) if !is_annotation(&c.name)))
                {
                    sanitize_tree(&mut first);
                    root.children.push(Node::Element(first));
                }
            }
            Node::Element(mut e) => {
                changed |= sanitize_tree(&mut e);
                root.children.push(Node::Element(e));
            }
            text => root.children.push(text),
        }
    }
    changed
}

fn is_annotation(name: &str) -> bool {
    name == "annotation" || name == "annotation-xml"
}

fn strip_attributes(element: &mut Element) -> bool {
    let before = element.attributes.len();
    element.attributes.retain(|(key, value)| {
        let key = key.to_ascii_lowercase();
        let unsafe_handler = key.starts_with("on");
        let unsafe_url = value.trim_start().to_ascii_lowercase().starts_with("javascript:");
        !unsafe_handler && !unsafe_url
    });
    element.attributes.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mathml::tree::parse;

    #[test]
    fn test_semantics_unwrapped() {
        let mut root = parse(
            "<math><semantics><mi>x</mi><annotation encoding=\"TeX\">x</annotation></semantics></math>",
        )
        .unwrap();
        assert!(sanitize_tree(&mut root));
        assert_eq!(root.to_xml(), "<math><mi>x</mi></math>");
    }

    #[test]
    fn test_event_handlers_removed() {
        let mut root =
            parse("<math><mi onclick=\"alert(1)\" href=\"javascript:x\" mathvariant=\"bold\">x</mi></math>")
                .unwrap();
        assert!(sanitize_tree(&mut root));
        assert_eq!(root.to_xml(), "<math><mi mathvariant=\"bold\">x</mi></math>");
    }

    #[test]
    fn test_maction_keeps_first_child() {
        let mut root =
            parse("<math><maction actiontype=\"toggle\"><mn>1</mn><mn>2</mn></maction></math>")
                .unwrap();
        sanitize_tree(&mut root);
        assert_eq!(root.to_xml(), "<math><mn>1</mn></math>");
    }

    #[test]
    fn test_clean_tree_unchanged() {
        let mut root = parse("<math><mi>x</mi></math>").unwrap();
        assert!(!sanitize_tree(&mut root));
    }
}
