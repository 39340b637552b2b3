//! Splitting a template into indented lines and nesting them into a tree.

use crate::{Result, SourceContext};

/// One non-blank source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    /// Indentation width in characters.
    pub indent: usize,
    /// Line content after the indentation, without the line terminator.
    pub text: &'a str,
    /// Byte offset of `text` in the source.
    pub offset: usize,
}

impl Line<'_> {
    /// Span of the whole line content.
    pub fn span(&self) -> (usize, usize) {
        (self.offset, self.text.len())
    }

    /// Span of `len` bytes starting `at` bytes into the line content.
    pub fn span_at(&self, at: usize, len: usize) -> (usize, usize) {
        (self.offset + at, len)
    }
}

/// A line with the more-indented lines that follow it.
#[derive(Debug, Clone)]
pub(crate) struct LineTree<'a> {
    pub line: Line<'a>,
    pub children: Vec<LineTree<'a>>,
}

impl<'a> LineTree<'a> {
    /// All descendant lines in source order, each re-indented relative to
    /// the shallowest one. Used for text blocks and block comments.
    pub fn child_text(&self) -> String {
        fn collect<'a>(trees: &[LineTree<'a>], out: &mut Vec<Line<'a>>) {
            for tree in trees {
                out.push(tree.line);
                collect(&tree.children, out);
            }
        }

        let mut lines = Vec::new();
        collect(&self.children, &mut lines);
        let base = lines.iter().map(|l| l.indent).min().unwrap_or(0);
        lines
            .iter()
            .map(|l| format!("{}{}", " ".repeat(l.indent - base), l.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Split source into non-blank lines.
///
/// Indentation may use spaces or tabs, but not both within one file.
pub(crate) fn split_lines<'a>(ctx: &SourceContext, src: &'a str) -> Result<Vec<Line<'a>>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    let mut indent_char: Option<char> = None;

    for raw in src.split('\n') {
        let line_start = offset;
        offset += raw.len() + 1;

        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let content = raw.trim_start_matches([' ', '\t']);
        if content.trim().is_empty() {
            continue;
        }

        let indentation = &raw[..raw.len() - content.len()];
        for c in indentation.chars() {
            match indent_char {
                None => indent_char = Some(c),
                Some(expected) if expected != c => {
                    return Err(ctx.indentation_error(
                        "mixed tabs and spaces in indentation",
                        (line_start, indentation.len()),
                    ));
                }
                Some(_) => {}
            }
        }

        lines.push(Line {
            indent: indentation.chars().count(),
            text: content.trim_end(),
            offset: line_start + indentation.len(),
        });
    }

    Ok(lines)
}

/// Nest lines into trees by indentation.
pub(crate) fn build_tree<'a>(ctx: &SourceContext, lines: &[Line<'a>]) -> Result<Vec<LineTree<'a>>> {
    let mut pos = 0;
    let base = lines.first().map(|l| l.indent).unwrap_or(0);
    let trees = build_level(ctx, lines, &mut pos, base)?;

    if let Some(line) = lines.get(pos) {
        return Err(ctx.indentation_error("unexpected dedent", line.span()));
    }
    Ok(trees)
}

fn build_level<'a>(
    ctx: &SourceContext,
    lines: &[Line<'a>],
    pos: &mut usize,
    indent: usize,
) -> Result<Vec<LineTree<'a>>> {
    let mut trees = Vec::new();

    while let Some(line) = lines.get(*pos).copied() {
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(ctx.indentation_error(
                "inconsistent indentation",
                (line.offset.saturating_sub(line.indent), line.indent),
            ));
        }

        *pos += 1;
        let children = match lines.get(*pos) {
            Some(next) if next.indent > indent => build_level(ctx, lines, pos, next.indent)?,
            _ => Vec::new(),
        };
        trees.push(LineTree { line, children });
    }

    Ok(trees)
}
