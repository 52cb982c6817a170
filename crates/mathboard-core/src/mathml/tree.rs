//! Owned MathML element tree.
//!
//! `roxmltree` documents are read-only and borrow their source, while repair
//! needs to move children around. [`Element`] is a small owned copy that keeps
//! what the grammar cares about (names, attributes, children, source lines) and
//! serializes back to compact XML.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Namespace URI of the element, if any.
    pub namespace: Option<String>,
    /// Attributes in document order; namespaced ones keep their prefix.
    pub attributes: Vec<(String, String)>,
    /// `xmlns:prefix` declarations written on this element, as `(prefix, uri)`.
    /// Parsing collects every prefix the subtree's attributes use onto the root.
    pub prefixes: Vec<(String, String)>,
    pub children: Vec<Node>,
    /// 1-based line of the start tag in the parsed text; 0 for inserted elements.
    pub line: u32,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            prefixes: Vec::new(),
            children: Vec::new(),
            line: 0,
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<Node>) -> Self {
        let mut element = Self::new(name);
        element.children = children;
        element
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Text directly inside this element (not in descendants), concatenated.
    pub fn own_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Line to report for this element, if it came from parsed text.
    pub fn source_line(&self) -> Option<u32> {
        (self.line > 0).then_some(self.line)
    }

    /// Serializes the subtree as compact XML.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out, None);
        out
    }

    /// Writes the element; `inherited` is the default namespace in scope, and
    /// `xmlns` is only written where it changes. Elements without a namespace
    /// (inserted by repair) inherit their parent's.
    fn write_xml(&self, out: &mut String, inherited: Option<&str>) {
        let _ = write!(out, "<{}", self.name);
        let scope = self.namespace.as_deref().or(inherited);
        if scope != inherited {
            if let Some(ns) = scope {
                let _ = write!(out, " xmlns=\"{}\"", escape_attribute(ns));
            }
        }
        for (prefix, uri) in &self.prefixes {
            let _ = write!(out, " xmlns:{}=\"{}\"", prefix, escape_attribute(uri));
        }
        for (key, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", key, escape_attribute(value));
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_xml(out, scope),
                Node::Text(t) => out.push_str(&escape_text(t)),
            }
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

/// Parses `text` into an owned tree rooted at the document element.
///
/// Whitespace-only text between elements is dropped; text inside token
/// elements is kept verbatim.
pub fn parse(text: &str) -> Result<Element, roxmltree::Error> {
    let doc = roxmltree::Document::parse(text)?;
    let mut prefixes = Vec::new();
    let mut root = build(&doc, doc.root_element(), &mut prefixes);
    root.prefixes = prefixes;
    Ok(root)
}

fn build(
    doc: &roxmltree::Document,
    node: roxmltree::Node,
    prefixes: &mut Vec<(String, String)>,
) -> Element {
    let mut element = Element::new(node.tag_name().name());
    element.namespace = node.tag_name().namespace().map(str::to_string);
    element.line = doc.text_pos_at(node.range().start).row;

    for attr in node.attributes() {
        let prefix = attr
            .namespace()
            .and_then(|ns| node.lookup_prefix(ns).map(|prefix| (prefix, ns)));
        let key = match prefix {
            Some((prefix, ns)) if !prefix.is_empty() => {
                if prefix != "xml" && !prefixes.iter().any(|(p, _)| p == prefix) {
                    prefixes.push((prefix.to_string(), ns.to_string()));
                }
                format!("{}:{}", prefix, attr.name())
            }
            _ => attr.name().to_string(),
        };
        element.attributes.push((key, attr.value().to_string()));
    }

    for child in node.children() {
        if child.is_element() {
            element.children.push(Node::Element(build(doc, child, prefixes)));
        } else if child.is_text() {
            let text = child.text().unwrap_or_default();
            if !text.trim().is_empty() {
                element.children.push(Node::Text(text.to_string()));
            }
        }
    }
    element
}

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attribute(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_compact() {
        let input = "<math xmlns=\"http://www.w3.org/1998/Math/MathML\">\n  <mi>x</mi>\n  <mo>&lt;</mo>\n</math>";
        let tree = parse(input).unwrap();
        assert_eq!(tree.element_children().count(), 2);
        assert_eq!(
            tree.to_xml(),
            "<math xmlns=\"http://www.w3.org/1998/Math/MathML\"><mi>x</mi><mo>&lt;</mo></math>"
        );
    }

    #[test]
    fn test_inserted_children_inherit_namespace() {
        let input = "<math xmlns=\"http://www.w3.org/1998/Math/MathML\"><mn>1</mn></math>";
        let mut tree = parse(input).unwrap();
        let mn = tree.children.remove(0);
        tree.children.push(Node::Element(Element::with_children("mrow", vec![mn])));
        assert_eq!(
            tree.to_xml(),
            "<math xmlns=\"http://www.w3.org/1998/Math/MathML\"><mrow><mn>1</mn></mrow></math>"
        );
    }

    #[test]
    fn test_foreign_child_namespace_kept() {
        let input = "<math xmlns=\"http://www.w3.org/1998/Math/MathML\"><semantics><annotation-xml><svg xmlns=\"http://www.w3.org/2000/svg\"><g/></svg></annotation-xml></semantics></math>";
        assert_eq!(parse(input).unwrap().to_xml(), input);
    }

    #[test]
    fn test_prefix_declarations_move_to_root() {
        let input = "<math><mrow xmlns:xlink=\"http://www.w3.org/1999/xlink\"><mi xlink:href=\"#a\">x</mi></mrow></math>";
        let tree = parse(input).unwrap();
        assert_eq!(
            tree.prefixes,
            vec![("xlink".to_string(), "http://www.w3.org/1999/xlink".to_string())]
        );
        let xml = tree.to_xml();
        assert_eq!(
            xml,
            "<math xmlns:xlink=\"http://www.w3.org/1999/xlink\"><mrow><mi xlink:href=\"#a\">x</mi></mrow></math>"
        );
        assert!(parse(&xml).is_ok());
    }

    #[test]
    fn test_lines_recorded() {
        let tree = parse("<math>\n<mi>x</mi>\n\n<mn>1</mn></math>").unwrap();
        let lines: Vec<_> = tree.element_children().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 4]);
        assert_eq!(tree.namespace, None);
    }

    #[test]
    fn test_empty_element_self_closes() {
        let tree = parse("<math><mspace width=\"1em\"/></math>").unwrap();
        assert_eq!(tree.to_xml(), "<math><mspace width=\"1em\"/></math>");
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut e = Element::new("mglyph");
        e.set_attribute("alt", "a");
        e.set_attribute("alt", "b");
        assert_eq!(e.attributes, vec![("alt".to_string(), "b".to_string())]);
    }
}
