//! Template-level IR.

use serde::Serialize;

use crate::Node;

/// A parsed and resolved template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Template {
    /// Template name (usually its file name).
    pub name: String,
    /// Rust parameter list of the render function (`:args`), without parentheses.
    pub args: Option<String>,
    /// Paths imported with `:use`.
    pub uses: Vec<String>,
    /// Body nodes in document order.
    pub nodes: Vec<Node>,
}

impl Template {
    /// Create an empty template.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Check whether the template declares any body content.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visit every node, depth first, in document order.
    pub fn walk(&self, f: &mut impl FnMut(&Node)) {
        fn walk_nodes(nodes: &[Node], f: &mut impl FnMut(&Node)) {
            for node in nodes {
                f(node);
                for children in node.children() {
                    walk_nodes(children, f);
                }
            }
        }
        walk_nodes(&self.nodes, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Element, TextPart};

    #[test]
    fn test_walk_document_order() {
        let mut template = Template::new("t");
        let mut ul = Element::new("ul");
        ul.children.push(Node::Each {
            pattern: "c".into(),
            iter: "colors".into(),
            body: vec![Node::Element(Element::new("li"))],
        });
        template.nodes.push(Node::Element(Element::new("h1")));
        template.nodes.push(Node::Element(ul));
        template.nodes.push(Node::Text {
            parts: vec![TextPart::Literal("end".into())],
        });

        let mut seen = Vec::new();
        template.walk(&mut |node| seen.push(node.kind()));

        assert_eq!(seen, vec!["element", "element", "each", "element", "text"]);
    }
}
