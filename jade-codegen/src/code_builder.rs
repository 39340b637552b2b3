//! Indented line writer for generated source text.

/// Indentation unit of generated Rust.
const INDENT: &str = "    ";

/// Writes indented lines into a borrowed buffer.
///
/// # Example
///
/// ```
/// use jadec_codegen::CodeBuilder;
///
/// let mut out = String::new();
/// CodeBuilder::new(&mut out).block("fn main() {", |b| {
///     b.line("println!(\"Hello, world!\");");
/// });
///
/// assert_eq!(out, "fn main() {\n    println!(\"Hello, world!\");\n}\n");
/// ```
#[derive(Debug)]
pub struct CodeBuilder<'a> {
    buf: &'a mut String,
    level: usize,
}

impl<'a> CodeBuilder<'a> {
    pub fn new(buf: &'a mut String) -> Self {
        Self::with_level(buf, 0)
    }

    /// Start writing at a given indentation level.
    pub fn with_level(buf: &'a mut String, level: usize) -> Self {
        Self { buf, level }
    }

    /// Add a line with the current indentation.
    pub fn line(&mut self, s: &str) -> &mut Self {
        for _ in 0..self.level {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(s);
        self.buf.push('\n');
        self
    }

    /// Add a blank line (no indentation).
    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.level += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self
    }

    /// Add `header`, the indented lines written by `f`, and a closing `}`.
    pub fn block(&mut self, header: &str, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.block_with_close(header, "}", f)
    }

    /// Like [`block`](Self::block) with a custom closing line.
    pub fn block_with_close(
        &mut self,
        header: &str,
        close: &str,
        f: impl FnOnce(&mut Self),
    ) -> &mut Self {
        self.line(header).indent();
        f(self);
        self.dedent().line(close)
    }

    pub fn level(&self) -> usize {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_blocks() {
        let mut out = String::new();
        CodeBuilder::new(&mut out).block("if a {", |b| {
            b.block_with_close("for x in xs {", "};", |b| {
                b.line("f(x);");
            });
        });
        assert_eq!(out, "if a {\n    for x in xs {\n        f(x);\n    };\n}\n");
    }

    #[test]
    fn test_starting_level() {
        let mut out = String::new();
        let mut b = CodeBuilder::with_level(&mut out, 2);
        b.line("x;").dedent().dedent().dedent().line("y;");
        assert_eq!(b.level(), 0);
        assert_eq!(out, "        x;\ny;\n");
    }
}
