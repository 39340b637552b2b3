//! Body nodes.

use serde::Serialize;

/// HTML elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Check whether `name` is an HTML void element.
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// A node in the template body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    /// `doctype html`.
    Doctype { value: String },
    /// An HTML element.
    Element(Element),
    /// Text content, possibly with interpolations.
    Text { parts: Vec<TextPart> },
    /// `= expr` / `!= expr`.
    Output { expr: String, escape: bool },
    /// `- stmt`, a Rust statement executed in place.
    Code { stmt: String },
    /// `// text`, rendered as an HTML comment.
    Comment { text: String },
    /// `each pattern in iter`.
    Each {
        pattern: String,
        iter: String,
        body: Vec<Node>,
    },
    /// `if cond` with an optional `else` branch.
    If {
        cond: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    /// An expanded mixin call: `let` bindings for the mixin parameters
    /// followed by the mixin body, in its own scope.
    Scope {
        bindings: Vec<(String, String)>,
        body: Vec<Node>,
    },
    /// A composition construct that was never supplied.
    Unresolved { kind: UnresolvedKind, name: String },
}

impl Node {
    /// Text node from a single literal.
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text {
            parts: vec![TextPart::Literal(s.into())],
        }
    }

    /// Short name of the node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Doctype { .. } => "doctype",
            Node::Element(_) => "element",
            Node::Text { .. } => "text",
            Node::Output { .. } => "output",
            Node::Code { .. } => "code",
            Node::Comment { .. } => "comment",
            Node::Each { .. } => "each",
            Node::If { .. } => "if",
            Node::Scope { .. } => "scope",
            Node::Unresolved { .. } => "unresolved",
        }
    }

    /// Child node lists, in document order.
    pub fn children(&self) -> Vec<&[Node]> {
        match self {
            Node::Element(el) => vec![&el.children],
            Node::Each { body, .. } | Node::Scope { body, .. } => vec![body],
            Node::If {
                then, otherwise, ..
            } => vec![then, otherwise],
            _ => Vec::new(),
        }
    }
}

/// Kinds of unresolved composition constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedKind {
    /// A `block` that no template in the inheritance chain filled.
    Block,
    /// A `+call` of a mixin that was never declared.
    Mixin,
}

impl UnresolvedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnresolvedKind::Block => "block",
            UnresolvedKind::Mixin => "mixin",
        }
    }
}

impl std::fmt::Display for UnresolvedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    /// Tag name.
    pub name: String,
    /// `#id` shorthand.
    pub id: Option<String>,
    /// `.class` shorthands, in source order.
    pub classes: Vec<String>,
    /// Attributes in source order.
    pub attrs: Vec<Attr>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Check whether this element has no closing tag.
    pub fn is_void(&self) -> bool {
        is_void_element(&self.name)
    }
}

/// An element attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attr {
    pub name: String,
    pub value: AttrValue,
}

/// Value of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    /// A quoted string, rendered as-is.
    Literal(String),
    /// A Rust expression, rendered escaped.
    Expr(String),
    /// A bare attribute (`checked`).
    Flag,
}

/// A piece of text content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TextPart {
    /// Literal markup text.
    Literal(String),
    /// `#{expr}`, escaped.
    Escaped(String),
    /// `!{expr}`, unescaped.
    Raw(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_elements() {
        assert!(is_void_element("br"));
        assert!(is_void_element("img"));
        assert!(!is_void_element("div"));
        assert!(Element::new("meta").is_void());
    }

    #[test]
    fn test_children_of_if() {
        let node = Node::If {
            cond: "x".into(),
            then: vec![Node::text("a")],
            otherwise: vec![Node::text("b"), Node::text("c")],
        };
        let children = node.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].len(), 2);
    }

    #[test]
    fn test_unresolved_kind_display() {
        assert_eq!(UnresolvedKind::Block.to_string(), "block");
        assert_eq!(UnresolvedKind::Mixin.to_string(), "mixin");
    }
}
