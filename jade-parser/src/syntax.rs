//! Line-level syntax: turns one template file into a [`Document`].

use jadec_core::is_rust_ident;
use jadec_ir::{Attr, AttrValue, Element, Node, TextPart};

use crate::ast::{Ast, BlockMode, Document, Loc};
use crate::lines::{Line, LineTree, build_tree, split_lines};
use crate::scan::{find_closing, read_quoted, scan_top_level, split_top_level};
use crate::{Result, SourceContext};

/// Parse the source held by `ctx`. `file` is recorded in every [`Loc`].
pub(crate) fn parse_document(ctx: &SourceContext, file: usize) -> Result<Document> {
    let lines = split_lines(ctx, ctx.src())?;
    let trees = build_tree(ctx, &lines)?;
    let parser = LineParser { ctx, file };

    let mut doc = Document::default();
    let mut body = Vec::new();

    for tree in &trees {
        let line = tree.line;
        let (word, rest) = keyword(line.text);
        let rest = rest.trim();

        match word {
            ":args" => {
                parser.no_children(tree, ":args")?;
                if doc.args.is_some() {
                    return Err(ctx.syntax_error("duplicate :args declaration", line.span()));
                }
                doc.args = Some(rest.to_string());
            }
            ":use" => {
                parser.no_children(tree, ":use")?;
                let path = rest.strip_prefix("use ").unwrap_or(rest);
                let path = path.trim_end_matches(';').trim();
                if path.is_empty() {
                    return Err(ctx.syntax_error("expected a path after :use", line.span()));
                }
                doc.uses.push(path.to_string());
            }
            "extends" => {
                parser.no_children(tree, "extends")?;
                if doc.extends.is_some() {
                    return Err(ctx.syntax_error("a template can only extend one layout", line.span()));
                }
                if rest.is_empty() {
                    return Err(ctx.syntax_error("expected a file after extends", line.span()));
                }
                doc.extends = Some((rest.to_string(), parser.loc(line.span())));
            }
            _ => body.push(tree),
        }
    }

    doc.nodes = parser.parse_siblings(&body)?;
    Ok(doc)
}

/// Split a line into its first word and the remainder (with leading
/// whitespace).
fn keyword(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(i) => (&text[..i], &text[i..]),
        None => (text, ""),
    }
}

/// Characters allowed in tag, id, class, block and mixin names.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_name(s: &str) -> &str {
    let end = s.find(|c: char| !is_name_char(c)).unwrap_or(s.len());
    &s[..end]
}

struct LineParser<'c> {
    ctx: &'c SourceContext,
    file: usize,
}

impl LineParser<'_> {
    fn loc(&self, span: (usize, usize)) -> Loc {
        Loc {
            file: self.file,
            span,
        }
    }

    fn no_children(&self, tree: &LineTree<'_>, construct: &str) -> Result<()> {
        match tree.children.first() {
            Some(child) => Err(self.ctx.misplaced_error(
                "nested content",
                format!("{construct} lines cannot have nested lines"),
                child.line.span(),
            )),
            None => Ok(()),
        }
    }

    fn parse_children(&self, tree: &LineTree<'_>) -> Result<Vec<Ast>> {
        let children: Vec<&LineTree<'_>> = tree.children.iter().collect();
        self.parse_siblings(&children)
    }

    fn parse_siblings(&self, trees: &[&LineTree<'_>]) -> Result<Vec<Ast>> {
        let mut nodes: Vec<Ast> = Vec::new();
        let mut prev_piped = false;

        for tree in trees {
            let line = tree.line;
            let (word, rest) = keyword(line.text);
            let rest = rest.trim();

            if word == "else" {
                let branch = if rest.is_empty() {
                    None
                } else {
                    match keyword(rest) {
                        ("if", cond) if !cond.trim().is_empty() => Some(cond.trim()),
                        _ => {
                            return Err(self
                                .ctx
                                .syntax_error("expected `else` or `else if <condition>`", line.span()));
                        }
                    }
                };
                let body = self.parse_children(tree)?;
                let Some(last) = nodes.last_mut() else {
                    return Err(self.ctx.misplaced_error(
                        "else",
                        "else must directly follow an if or unless",
                        line.span(),
                    ));
                };
                self.attach_else(last, branch, body, &line)?;
                prev_piped = false;
                continue;
            }

            if matches!(word, ":args" | ":use" | "extends") {
                return Err(self.ctx.misplaced_error(
                    word,
                    "only allowed at the top level of a template",
                    line.span(),
                ));
            }

            let piped = line.text.starts_with('|');
            if let Some(mut ast) = self.parse_tree(tree)? {
                if piped
                    && prev_piped
                    && let Ast::Leaf(Node::Text { parts }) = &mut ast
                {
                    parts.insert(0, TextPart::Literal("\n".to_string()));
                }
                nodes.push(ast);
            }
            prev_piped = piped;
        }

        Ok(nodes)
    }

    fn attach_else(
        &self,
        node: &mut Ast,
        cond: Option<&str>,
        body: Vec<Ast>,
        line: &Line<'_>,
    ) -> Result<()> {
        let Ast::If {
            otherwise,
            chained,
            closed,
            ..
        } = node
        else {
            return Err(self.ctx.misplaced_error(
                "else",
                "else must directly follow an if or unless",
                line.span(),
            ));
        };

        if *closed {
            return Err(self.ctx.misplaced_error(
                "else",
                "this if already has an else branch",
                line.span(),
            ));
        }
        if *chained && let Some(inner) = otherwise.last_mut() {
            return self.attach_else(inner, cond, body, line);
        }

        match cond {
            Some(cond) => {
                *otherwise = vec![Ast::If {
                    cond: cond.to_string(),
                    then: body,
                    otherwise: Vec::new(),
                    chained: false,
                    closed: false,
                }];
                *chained = true;
            }
            None => {
                *otherwise = body;
                *closed = true;
            }
        }
        Ok(())
    }

    /// Parse one line with its nested lines. Silent comments yield `None`.
    fn parse_tree(&self, tree: &LineTree<'_>) -> Result<Option<Ast>> {
        let line = tree.line;
        let text = line.text;

        if text.starts_with("//-") {
            return Ok(None);
        }
        if let Some(rest) = text.strip_prefix("//") {
            let mut comment = rest.trim().to_string();
            let nested = tree.child_text();
            if !nested.is_empty() {
                if !comment.is_empty() {
                    comment.push('\n');
                }
                comment.push_str(&nested);
            }
            return Ok(Some(Ast::Leaf(Node::Comment { text: comment })));
        }
        if let Some(rest) = text.strip_prefix('|') {
            self.no_children(tree, "piped text")?;
            let body = rest.strip_prefix(' ').unwrap_or(rest);
            let parts = self.parse_text(body, &line, text.len() - body.len())?;
            return Ok(Some(Ast::Leaf(Node::Text { parts })));
        }
        if text == "-" || text.starts_with("- ") {
            self.no_children(tree, "code")?;
            let stmt = text[1..].trim();
            if stmt.is_empty() {
                return Err(self.ctx.syntax_error("empty code line", line.span()));
            }
            return Ok(Some(Ast::Leaf(Node::Code {
                stmt: stmt.to_string(),
            })));
        }
        if let Some(expr) = text.strip_prefix("!=") {
            self.no_children(tree, "output")?;
            return self.output(expr, false, &line).map(|node| Some(Ast::Leaf(node)));
        }
        if let Some(expr) = text.strip_prefix('=') {
            self.no_children(tree, "output")?;
            return self.output(expr, true, &line).map(|node| Some(Ast::Leaf(node)));
        }
        if text.starts_with('<') {
            self.no_children(tree, "inline HTML")?;
            return Ok(Some(Ast::Leaf(Node::text(text))));
        }
        if let Some(call) = text.strip_prefix('+') {
            self.no_children(tree, "mixin call")?;
            return self.mixin_call(call, &line).map(Some);
        }

        let (word, rest) = keyword(text);
        let rest = rest.trim();

        let ast = match word {
            "doctype" => {
                self.no_children(tree, "doctype")?;
                let value = if rest.is_empty() { "html" } else { rest };
                Ast::Leaf(Node::Doctype {
                    value: value.to_string(),
                })
            }
            "include" => {
                self.no_children(tree, "include")?;
                if rest.is_empty() {
                    return Err(self.ctx.syntax_error("expected a file after include", line.span()));
                }
                Ast::Include {
                    path: rest.to_string(),
                    loc: self.loc(line.span()),
                }
            }
            "block" => {
                let (mode, name) = match keyword(rest) {
                    ("append", name) => (BlockMode::Append, name.trim()),
                    ("prepend", name) => (BlockMode::Prepend, name.trim()),
                    _ => (BlockMode::Replace, rest),
                };
                self.block(tree, mode, name)?
            }
            "append" => self.block(tree, BlockMode::Append, rest)?,
            "prepend" => self.block(tree, BlockMode::Prepend, rest)?,
            "mixin" => self.mixin_decl(tree, rest)?,
            "each" | "for" => {
                let Some(at) = rest.find(" in ") else {
                    return Err(self.ctx.syntax_error(
                        format!("expected `{word} <pattern> in <expression>`"),
                        line.span(),
                    ));
                };
                let pattern = rest[..at].trim();
                let iter = rest[at + 4..].trim();
                if pattern.is_empty() || iter.is_empty() {
                    return Err(self.ctx.syntax_error(
                        format!("expected `{word} <pattern> in <expression>`"),
                        line.span(),
                    ));
                }
                Ast::Each {
                    pattern: pattern.to_string(),
                    iter: iter.to_string(),
                    body: self.parse_children(tree)?,
                }
            }
            "if" | "unless" => {
                if rest.is_empty() {
                    return Err(self
                        .ctx
                        .syntax_error(format!("expected a condition after {word}"), line.span()));
                }
                let cond = if word == "unless" {
                    format!("!({rest})")
                } else {
                    rest.to_string()
                };
                Ast::If {
                    cond,
                    then: self.parse_children(tree)?,
                    otherwise: Vec::new(),
                    chained: false,
                    closed: false,
                }
            }
            _ => self.element(tree)?,
        };

        Ok(Some(ast))
    }

    fn output(&self, expr: &str, escape: bool, line: &Line<'_>) -> Result<Node> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(self.ctx.syntax_error("expected an expression", line.span()));
        }
        Ok(Node::Output {
            expr: expr.to_string(),
            escape,
        })
    }

    fn block(&self, tree: &LineTree<'_>, mode: BlockMode, name: &str) -> Result<Ast> {
        if name.is_empty() || take_name(name) != name {
            return Err(self
                .ctx
                .syntax_error("expected a block name", tree.line.span()));
        }
        Ok(Ast::Block {
            name: name.to_string(),
            mode,
            body: self.parse_children(tree)?,
        })
    }

    fn mixin_decl(&self, tree: &LineTree<'_>, rest: &str) -> Result<Ast> {
        let line = tree.line;
        let name = take_name(rest);
        if name.is_empty() {
            return Err(self.ctx.syntax_error("expected a mixin name", line.span()));
        }

        let after = &rest[name.len()..];
        let params = if after.is_empty() {
            Vec::new()
        } else {
            let close = find_closing(after)
                .filter(|&close| after[close + 1..].trim().is_empty())
                .ok_or_else(|| {
                    self.ctx
                        .syntax_error("expected `mixin name(param, ...)`", line.span())
                })?;
            let mut params = Vec::new();
            for param in split_top_level(&after[1..close], ',') {
                if !is_rust_ident(param) {
                    return Err(self.ctx.syntax_error(
                        format!("mixin parameter `{param}` is not an identifier"),
                        line.span(),
                    ));
                }
                params.push(param.to_string());
            }
            params
        };

        Ok(Ast::MixinDecl {
            name: name.to_string(),
            params,
            body: self.parse_children(tree)?,
        })
    }

    fn mixin_call(&self, call: &str, line: &Line<'_>) -> Result<Ast> {
        let name = take_name(call);
        if name.is_empty() {
            return Err(self.ctx.syntax_error("expected a mixin name after +", line.span()));
        }

        let after = &call[name.len()..];
        let args = if after.is_empty() {
            Vec::new()
        } else {
            let close = find_closing(after)
                .filter(|&close| after[close + 1..].trim().is_empty())
                .ok_or_else(|| {
                    self.ctx
                        .syntax_error("expected `+name(arg, ...)`", line.span())
                })?;
            split_top_level(&after[1..close], ',')
                .into_iter()
                .map(str::to_string)
                .collect()
        };

        Ok(Ast::MixinCall {
            name: name.to_string(),
            args,
            loc: self.loc(line.span()),
        })
    }

    fn element(&self, tree: &LineTree<'_>) -> Result<Ast> {
        let line = tree.line;
        let text = line.text;

        let name = take_name(text);
        if name.is_empty() && !text.starts_with(['#', '.']) {
            let len = text.chars().next().map_or(1, char::len_utf8);
            return Err(self
                .ctx
                .syntax_error("expected a tag, keyword or text", line.span_at(0, len)));
        }
        if name.starts_with(|c: char| !c.is_ascii_alphabetic()) {
            return Err(self
                .ctx
                .syntax_error(format!("invalid tag name `{name}`"), line.span_at(0, name.len())));
        }

        let mut element = Element::new(if name.is_empty() { "div" } else { name });
        let mut at = name.len();

        loop {
            let rest = &text[at..];
            if let Some(after) = rest.strip_prefix('#') {
                let id = take_name(after);
                if id.is_empty() {
                    return Err(self.ctx.syntax_error("expected an id after #", line.span_at(at, 1)));
                }
                if element.id.is_some() {
                    return Err(self.ctx.syntax_error("an element can only have one id", line.span_at(at, id.len() + 1)));
                }
                element.id = Some(id.to_string());
                at += 1 + id.len();
            } else if let Some(after) = rest.strip_prefix('.') {
                let class = take_name(after);
                if class.is_empty() {
                    break;
                }
                element.classes.push(class.to_string());
                at += 1 + class.len();
            } else if let Some(after) = rest.strip_prefix('(') {
                let (attrs, used) = self.attrs(after, &line, at + 1)?;
                element.attrs.extend(attrs);
                at += 1 + used;
            } else {
                break;
            }
        }

        let rest = &text[at..];
        let mut children = Vec::new();

        if rest == "." {
            let body = tree.child_text();
            if !body.is_empty() {
                children.push(Ast::Leaf(Node::text(body)));
            }
            return self.finish_element(element, children, &line);
        }

        if let Some(expr) = rest.strip_prefix("!=") {
            children.push(Ast::Leaf(self.output(expr, false, &line)?));
        } else if let Some(expr) = rest.strip_prefix('=') {
            children.push(Ast::Leaf(self.output(expr, true, &line)?));
        } else if let Some(nested) = rest.strip_prefix(':') {
            let nested = nested.trim_start();
            if nested.is_empty() {
                return Err(self.ctx.syntax_error("expected content after `:`", line.span_at(at, 1)));
            }
            let subtree = LineTree {
                line: Line {
                    indent: line.indent,
                    text: nested,
                    offset: line.offset + (text.len() - nested.len()),
                },
                children: tree.children.clone(),
            };
            children.extend(self.parse_tree(&subtree)?);
            return self.finish_element(element, children, &line);
        } else if let Some(body) = rest.strip_prefix(char::is_whitespace) {
            let parts = self.parse_text(body, &line, text.len() - body.len())?;
            if !parts.is_empty() {
                children.push(Ast::Leaf(Node::Text { parts }));
            }
        } else if !rest.is_empty() {
            let len = rest.chars().next().map_or(1, char::len_utf8);
            return Err(self
                .ctx
                .syntax_error("unexpected character after tag", line.span_at(at, len)));
        }

        children.extend(self.parse_children(tree)?);
        self.finish_element(element, children, &line)
    }

    fn finish_element(&self, element: Element, children: Vec<Ast>, line: &Line<'_>) -> Result<Ast> {
        if element.is_void() && !children.is_empty() {
            return Err(self.ctx.misplaced_error(
                "content",
                format!("<{}> is a void element and cannot have content", element.name),
                line.span(),
            ));
        }
        Ok(Ast::Element { element, children })
    }

    /// Parse an attribute list. `s` starts just after the opening
    /// parenthesis; returns the attributes and the bytes consumed including
    /// the closing parenthesis.
    fn attrs(&self, s: &str, line: &Line<'_>, at: usize) -> Result<(Vec<Attr>, usize)> {
        let mut attrs = Vec::new();
        let mut i = 0;

        loop {
            i += s[i..].len() - s[i..].trim_start_matches(|c: char| c.is_whitespace() || c == ',').len();
            let rest = &s[i..];

            if rest.is_empty() {
                return Err(self
                    .ctx
                    .syntax_error("unterminated attribute list", line.span_at(at - 1, 1)));
            }
            if rest.starts_with(')') {
                return Ok((attrs, i + 1));
            }

            let name_len = rest
                .find(|c: char| c.is_whitespace() || matches!(c, '=' | ',' | '(' | ')'))
                .unwrap_or(rest.len());
            if name_len == 0 {
                return Err(self
                    .ctx
                    .syntax_error("expected an attribute name", line.span_at(at + i, 1)));
            }
            let name = rest[..name_len].to_string();
            i += name_len;

            let after = s[i..].trim_start();
            let Some(value) = after.strip_prefix('=') else {
                attrs.push(Attr {
                    name,
                    value: AttrValue::Flag,
                });
                continue;
            };

            i = s.len() - value.len();
            i += value.len() - value.trim_start().len();
            let value = &s[i..];

            if let Some((literal, used)) = read_quoted(value) {
                attrs.push(Attr {
                    name,
                    value: AttrValue::Literal(literal),
                });
                i += used;
                continue;
            }

            let end = scan_top_level(value, |j, c| {
                c == ',' || c == ')' || (c.is_whitespace() && starts_attr(&value[j..]))
            })
            .ok_or_else(|| {
                self.ctx
                    .syntax_error("unterminated attribute list", line.span_at(at - 1, 1))
            })?;
            let expr = value[..end].trim();
            if expr.is_empty() {
                return Err(self.ctx.syntax_error(
                    format!("expected a value for attribute `{name}`"),
                    line.span_at(at + i, 1),
                ));
            }
            attrs.push(Attr {
                name,
                value: AttrValue::Expr(expr.to_string()),
            });
            i += end;
        }
    }

    /// Split text into literal runs and `#{}`/`!{}` interpolations. `at` is
    /// the offset of `s` within the line.
    fn parse_text(&self, s: &str, line: &Line<'_>, at: usize) -> Result<Vec<TextPart>> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while let Some(c) = s[i..].chars().next() {
            let rest = &s[i..];

            if rest.starts_with("\\#{") || rest.starts_with("\\!{") {
                literal.push_str(&rest[1..3]);
                i += 3;
                continue;
            }

            if rest.starts_with("#{") || rest.starts_with("!{") {
                let close = find_closing(&rest[1..]).ok_or_else(|| {
                    self.ctx
                        .syntax_error("unterminated interpolation", line.span_at(at + i, 2))
                })?;
                let expr = rest[2..1 + close].trim();
                if expr.is_empty() {
                    return Err(self
                        .ctx
                        .syntax_error("empty interpolation", line.span_at(at + i, close + 2)));
                }
                if !literal.is_empty() {
                    parts.push(TextPart::Literal(std::mem::take(&mut literal)));
                }
                parts.push(if c == '#' {
                    TextPart::Escaped(expr.to_string())
                } else {
                    TextPart::Raw(expr.to_string())
                });
                i += close + 2;
                continue;
            }

            literal.push(c);
            i += c.len_utf8();
        }

        if !literal.is_empty() {
            parts.push(TextPart::Literal(literal));
        }
        Ok(parts)
    }
}

/// Whether `s` (starting with whitespace) begins another `name=` attribute.
fn starts_attr(s: &str) -> bool {
    let rest = s.trim_start();
    let name_len = rest
        .find(|c: char| c.is_whitespace() || matches!(c, '=' | ',' | '(' | ')'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return false;
    }
    let after = rest[name_len..].trim_start();
    after.starts_with('=') && !after.starts_with("==")
}
