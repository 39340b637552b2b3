//! Consumers: forwarding rendered chunks to a destination.

use std::io::{self, Write};

use crate::PipeReader;

/// HTML elements without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is emitted verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "pre", "textarea"];

/// Forward every chunk unchanged.
pub fn copy<W: Write + ?Sized>(reader: PipeReader, wr: &mut W) -> io::Result<()> {
    for chunk in reader {
        wr.write_all(chunk.as_bytes())?;
    }
    wr.flush()
}

/// Forward chunks pretty-printed: one tag or text run per line, indented by
/// two spaces per open element. Elements holding only text stay on one
/// line. The result does not depend on how the input is split into chunks.
pub fn format<W: Write + ?Sized>(reader: PipeReader, wr: &mut W) -> io::Result<()> {
    let mut printer = Printer::new(wr);
    for chunk in reader {
        printer.feed(&chunk)?;
    }
    printer.finish()
}

enum State {
    Text,
    Tag { quote: Option<char> },
    Comment,
    Raw { open: String, close: String },
}

/// An open tag held back until it is known whether the element only
/// contains text.
struct Pending {
    open: String,
    name: String,
    text: String,
}

struct Printer<'w, W: Write + ?Sized> {
    out: &'w mut W,
    depth: usize,
    state: State,
    token: String,
    pending: Option<Pending>,
}

impl<'w, W: Write + ?Sized> Printer<'w, W> {
    fn new(out: &'w mut W) -> Self {
        Self {
            out,
            depth: 0,
            state: State::Text,
            token: String::new(),
            pending: None,
        }
    }

    fn feed(&mut self, chunk: &str) -> io::Result<()> {
        for c in chunk.chars() {
            self.token.push(c);
            match &mut self.state {
                State::Text => {
                    if c == '<' {
                        self.token.pop();
                        let text = std::mem::take(&mut self.token);
                        self.text(&text)?;
                        self.token.push('<');
                        self.state = State::Tag { quote: None };
                    }
                }
                State::Tag { quote } => {
                    if self.token == "<!--" {
                        self.state = State::Comment;
                    } else if let Some(q) = quote {
                        if c == *q {
                            *quote = None;
                        }
                    } else if c == '"' || c == '\'' {
                        *quote = Some(c);
                    } else if c == '>' {
                        self.state = State::Text;
                        let tag = std::mem::take(&mut self.token);
                        self.tag(tag)?;
                    }
                }
                State::Comment => {
                    if self.token.ends_with("-->") {
                        self.state = State::Text;
                        let comment = std::mem::take(&mut self.token);
                        self.line(&comment)?;
                    }
                }
                State::Raw { open, close } => {
                    if self.token.ends_with(close.as_str()) {
                        let line = format!("{open}{}", self.token);
                        self.token.clear();
                        self.state = State::Text;
                        self.line(&line)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> io::Result<()> {
        let rest = std::mem::take(&mut self.token);
        match std::mem::replace(&mut self.state, State::Text) {
            State::Raw { open, .. } => {
                self.flush_pending()?;
                self.line(&format!("{open}{rest}"))?;
            }
            _ => self.text(&rest)?,
        }
        self.flush_pending()?;
        self.out.flush()
    }

    fn tag(&mut self, tag: String) -> io::Result<()> {
        if let Some(rest) = tag.strip_prefix("</") {
            let name = tag_name(rest);
            return self.close_tag(&name, &tag);
        }
        if tag.starts_with("<!") || tag.starts_with("<?") || tag.ends_with("/>") {
            return self.line(&tag);
        }

        let name = tag_name(&tag[1..]);
        if VOID_ELEMENTS.contains(&name.as_str()) {
            return self.line(&tag);
        }
        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.flush_pending()?;
            self.state = State::Raw {
                open: tag,
                close: format!("</{name}>"),
            };
            return Ok(());
        }

        self.flush_pending()?;
        self.pending = Some(Pending {
            open: tag,
            name,
            text: String::new(),
        });
        Ok(())
    }

    fn close_tag(&mut self, name: &str, tag: &str) -> io::Result<()> {
        if let Some(pending) = self.pending.take() {
            if pending.name == name {
                let line = format!("{}{}{tag}", pending.open, pending.text.trim());
                return self.line(&line);
            }
            self.pending = Some(pending);
            self.flush_pending()?;
        }
        self.depth = self.depth.saturating_sub(1);
        self.line(tag)
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        match &mut self.pending {
            Some(pending) => {
                pending.text.push_str(text);
                Ok(())
            }
            None => self.line(text.trim()),
        }
    }

    fn flush_pending(&mut self) -> io::Result<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        self.line(&pending.open)?;
        self.depth += 1;
        let text = pending.text.trim();
        if !text.is_empty() {
            self.line(text)?;
        }
        Ok(())
    }

    fn line(&mut self, s: &str) -> io::Result<()> {
        self.flush_pending()?;
        writeln!(self.out, "{:indent$}{s}", "", indent = self.depth * 2)
    }
}

fn tag_name(s: &str) -> String {
    s.chars()
        .take_while(|c| !c.is_whitespace() && *c != '>' && *c != '/')
        .collect::<String>()
        .to_ascii_lowercase()
}
