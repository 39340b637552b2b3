//! Producer statements for a template body.
//!
//! Literal markup becomes `buffer.write_str("...")?;`, dynamic values go
//! through the runtime escaping primitives, and control flow maps onto the
//! matching Rust construct. Adjacent literal writes are left for the
//! collapse phase to merge.

use jadec_ir::{AttrValue, Element, Node, Template, TextPart};
use proc_macro2::Literal;

use crate::{CodeBuilder, layout::BODY_LEVEL, pipeline::phases::UNRESOLVED_MACRO};

/// Types that can write themselves as the body of a render function.
pub trait WriteIn {
    /// Append producer statements to `buf`. Appends nothing when there is
    /// nothing to render.
    fn write_in(&self, buf: &mut String);
}

impl WriteIn for Template {
    fn write_in(&self, buf: &mut String) {
        let mut b = CodeBuilder::with_level(buf, BODY_LEVEL);
        write_nodes(&mut b, &self.nodes);
    }
}

impl WriteIn for [Node] {
    fn write_in(&self, buf: &mut String) {
        let mut b = CodeBuilder::with_level(buf, BODY_LEVEL);
        write_nodes(&mut b, self);
    }
}

fn write_nodes(b: &mut CodeBuilder<'_>, nodes: &[Node]) {
    for node in nodes {
        write_node(b, node);
    }
}

fn write_node(b: &mut CodeBuilder<'_>, node: &Node) {
    match node {
        Node::Doctype { value } => literal(b, &doctype(value)),
        Node::Element(el) => element(b, el),
        Node::Text { parts } => {
            for part in parts {
                match part {
                    TextPart::Literal(s) => literal(b, s),
                    TextPart::Escaped(expr) => dynamic(b, expr, true),
                    TextPart::Raw(expr) => dynamic(b, expr, false),
                }
            }
        }
        Node::Output { expr, escape } => dynamic(b, expr, *escape),
        Node::Code { stmt } => {
            let stmt = stmt.trim();
            if stmt.ends_with(';') || stmt.ends_with('}') {
                b.line(stmt);
            } else {
                b.line(&format!("{stmt};"));
            }
        }
        Node::Comment { text } => literal(b, &format!("<!-- {text} -->")),
        Node::Each {
            pattern,
            iter,
            body,
        } => {
            b.block(&format!("for {pattern} in {iter} {{"), |b| write_nodes(b, body));
        }
        Node::If {
            cond,
            then,
            otherwise,
        } => conditional(b, cond, then, otherwise),
        Node::Scope { bindings, body } => {
            b.block("{", |b| {
                for (param, arg) in bindings {
                    b.line(&format!("let {param} = {arg};"));
                }
                write_nodes(b, body);
            });
        }
        Node::Unresolved { kind, name } => {
            b.line(&format!(
                "{UNRESOLVED_MACRO}!({kind}, {});",
                Literal::string(name)
            ));
        }
    }
}

fn element(b: &mut CodeBuilder<'_>, el: &Element) {
    literal(b, &format!("<{}", el.name));

    if let Some(id) = &el.id {
        literal(b, &format!(" id=\"{}\"", attr_literal(id)));
    }

    let class_attrs: Vec<&AttrValue> = el
        .attrs
        .iter()
        .filter(|attr| attr.name == "class")
        .map(|attr| &attr.value)
        .filter(|value| !matches!(value, AttrValue::Flag))
        .collect();
    if !el.classes.is_empty() || !class_attrs.is_empty() {
        literal(b, " class=\"");
        let mut first = true;
        let mut sep = |b: &mut CodeBuilder<'_>| {
            if !std::mem::take(&mut first) {
                literal(b, " ");
            }
        };
        for class in &el.classes {
            sep(b);
            literal(b, &attr_literal(class));
        }
        for value in class_attrs {
            sep(b);
            match value {
                AttrValue::Literal(s) => literal(b, &attr_literal(s)),
                AttrValue::Expr(expr) => dynamic(b, expr, true),
                AttrValue::Flag => {}
            }
        }
        literal(b, "\"");
    }

    for attr in el.attrs.iter().filter(|attr| attr.name != "class") {
        match &attr.value {
            AttrValue::Literal(s) => literal(b, &format!(" {}=\"{}\"", attr.name, attr_literal(s))),
            AttrValue::Expr(expr) => {
                literal(b, &format!(" {}=\"", attr.name));
                dynamic(b, expr, true);
                literal(b, "\"");
            }
            AttrValue::Flag => literal(b, &format!(" {}", attr.name)),
        }
    }
    literal(b, ">");

    write_nodes(b, &el.children);
    if !el.is_void() {
        literal(b, &format!("</{}>", el.name));
    }
}

fn conditional(b: &mut CodeBuilder<'_>, cond: &str, then: &[Node], otherwise: &[Node]) {
    let (mut then, mut otherwise) = (then, otherwise);
    b.line(&format!("if {cond} {{"));
    loop {
        b.indent();
        write_nodes(b, then);
        b.dedent();
        match otherwise {
            [] => break,
            [
                Node::If {
                    cond,
                    then: next_then,
                    otherwise: next_otherwise,
                },
            ] => {
                b.line(&format!("}} else if {cond} {{"));
                then = next_then;
                otherwise = next_otherwise;
            }
            rest => {
                b.line("} else {").indent();
                write_nodes(b, rest);
                b.dedent();
                break;
            }
        }
    }
    b.line("}");
}

fn literal(b: &mut CodeBuilder<'_>, s: &str) {
    if !s.is_empty() {
        b.line(&format!("buffer.write_str({})?;", Literal::string(s)));
    }
}

fn dynamic(b: &mut CodeBuilder<'_>, expr: &str, escape: bool) {
    let func = if escape { "write_esc" } else { "write_raw" };
    b.line(&format!("{func}(&({}), buffer)?;", expr.trim()));
}

/// Quoted attribute values keep their markup; only the quote is escaped.
fn attr_literal(s: &str) -> String {
    s.replace('"', "&quot;")
}

fn doctype(value: &str) -> String {
    match value {
        "html" | "5" | "" => "<!DOCTYPE html>".to_string(),
        "xml" => r#"<?xml version="1.0" encoding="utf-8" ?>"#.to_string(),
        "transitional" => r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#.to_string(),
        "strict" => r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#.to_string(),
        other => format!("<!DOCTYPE {other}>"),
    }
}

#[cfg(test)]
mod tests {
    use jadec_ir::{Attr, UnresolvedKind};

    use super::*;

    fn body(nodes: &[Node]) -> String {
        let mut out = String::new();
        nodes.write_in(&mut out);
        out.lines().map(str::trim).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_empty_body_writes_nothing() {
        let mut out = String::new();
        Template::new("empty.jade").write_in(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_element_with_text() {
        let mut h1 = Element::new("h1");
        h1.children.push(Node::text("Hello \"you\""));

        assert_eq!(
            body(&[Node::Element(h1)]),
            [
                r#"buffer.write_str("<h1")?;"#,
                r#"buffer.write_str(">")?;"#,
                r#"buffer.write_str("Hello \"you\"")?;"#,
                r#"buffer.write_str("</h1>")?;"#,
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_attributes_and_classes() {
        let mut a = Element::new("a");
        a.id = Some("home".into());
        a.classes = vec!["nav".into()];
        a.attrs = vec![
            Attr {
                name: "class".into(),
                value: AttrValue::Expr("active_class".into()),
            },
            Attr {
                name: "href".into(),
                value: AttrValue::Expr("link.url".into()),
            },
            Attr {
                name: "title".into(),
                value: AttrValue::Literal("say \"hi\"".into()),
            },
            Attr {
                name: "hidden".into(),
                value: AttrValue::Flag,
            },
        ];

        let out = body(&[Node::Element(a)]);
        let expected = [
            r#"buffer.write_str("<a")?;"#,
            r#"buffer.write_str(" id=\"home\"")?;"#,
            r#"buffer.write_str(" class=\"")?;"#,
            r#"buffer.write_str("nav")?;"#,
            r#"buffer.write_str(" ")?;"#,
            "write_esc(&(active_class), buffer)?;",
            r#"buffer.write_str("\"")?;"#,
            r#"buffer.write_str(" href=\"")?;"#,
            "write_esc(&(link.url), buffer)?;",
            r#"buffer.write_str("\"")?;"#,
            r#"buffer.write_str(" title=\"say &quot;hi&quot;\"")?;"#,
            r#"buffer.write_str(" hidden")?;"#,
            r#"buffer.write_str(">")?;"#,
            r#"buffer.write_str("</a>")?;"#,
        ];
        assert_eq!(out, expected.join("\n"));
    }

    #[test]
    fn test_void_element_not_closed() {
        let out = body(&[Node::Element(Element::new("br"))]);
        assert!(!out.contains("</br>"));
    }

    #[test]
    fn test_each_and_interpolation() {
        let mut li = Element::new("li");
        li.children.push(Node::Text {
            parts: vec![
                TextPart::Escaped("c".into()),
                TextPart::Raw("icon(c)".into()),
            ],
        });
        let nodes = [Node::Each {
            pattern: "c".into(),
            iter: "colors".into(),
            body: vec![Node::Element(li)],
        }];

        let out = body(&nodes);
        assert!(out.starts_with("for c in colors {\n"));
        assert!(out.contains("write_esc(&(c), buffer)?;\nwrite_raw(&(icon(c)), buffer)?;"));
        assert!(out.ends_with("\n}"));
    }

    #[test]
    fn test_else_if_chain() {
        let nodes = [Node::If {
            cond: "a".into(),
            then: vec![Node::text("A")],
            otherwise: vec![Node::If {
                cond: "b".into(),
                then: vec![Node::text("B")],
                otherwise: vec![Node::text("C")],
            }],
        }];

        let out = body(&nodes);
        assert_eq!(
            out,
            [
                "if a {",
                r#"buffer.write_str("A")?;"#,
                "} else if b {",
                r#"buffer.write_str("B")?;"#,
                "} else {",
                r#"buffer.write_str("C")?;"#,
                "}",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_code_scope_and_markers() {
        let nodes = [
            Node::Code {
                stmt: "let total = a + b".into(),
            },
            Node::Scope {
                bindings: vec![("title".into(), "page.title".into())],
                body: vec![Node::Output {
                    expr: "title".into(),
                    escape: true,
                }],
            },
            Node::Unresolved {
                kind: UnresolvedKind::Block,
                name: "content".into(),
            },
        ];

        let out = body(&nodes);
        assert_eq!(
            out,
            [
                "let total = a + b;",
                "{",
                "let title = page.title;",
                "write_esc(&(title), buffer)?;",
                "}",
                r#"jade_unresolved!(block, "content");"#,
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_doctypes() {
        assert_eq!(doctype("html"), "<!DOCTYPE html>");
        assert_eq!(doctype("5"), "<!DOCTYPE html>");
        assert!(doctype("xml").starts_with("<?xml"));
        assert_eq!(doctype("svg"), "<!DOCTYPE svg>");
    }
}
