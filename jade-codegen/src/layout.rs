//! The text framing a template body into a render function.

use jadec_core::RUST_NAMING;
use jadec_ir::Template;
use serde::Serialize;

use crate::CodeBuilder;

/// Indentation level of statements inside the producer closure.
pub(crate) const BODY_LEVEL: usize = 3;

/// Runtime module path in library mode.
pub const RUNTIME_CRATE: &str = "jadec_runtime";

/// Support module path when the support file is generated next to the units.
pub const SUPPORT_MODULE: &str = "jade";

/// Buffer implementation behind `Buffer`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferKind {
    /// `Vec<u8>`.
    #[default]
    Std,
    /// `jadec_runtime::PooledBuffer`.
    Pooled,
}

impl BufferKind {
    /// Rust type of the buffer, as written in library mode.
    pub fn type_path(self) -> &'static str {
        match self {
            BufferKind::Std => "Vec<u8>",
            BufferKind::Pooled => "jadec_runtime::PooledBuffer",
        }
    }
}

/// Destination parameter of generated functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriterStyle {
    /// `wr: &mut dyn std::io::Write`.
    #[default]
    Writer,
    /// `buffer: &mut Buffer`.
    Buffer,
}

/// Options shared by every layout of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutOptions {
    pub buffer: BufferKind,
    pub writer: WriterStyle,
    /// Consume through the pretty printer instead of copying.
    pub pretty: bool,
    /// Import the runtime crate directly instead of the support module.
    pub lib: bool,
    /// Module (package) name written in the header.
    pub module: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            buffer: BufferKind::Std,
            writer: WriterStyle::Writer,
            pretty: true,
            lib: false,
            module: SUPPORT_MODULE.to_string(),
        }
    }
}

impl LayoutOptions {
    /// Path the generated `use` line imports runtime items from.
    pub fn runtime_path(&self) -> String {
        if self.lib {
            RUNTIME_CRATE.to_string()
        } else {
            format!("super::{SUPPORT_MODULE}")
        }
    }

    fn destination(&self) -> (&'static str, String) {
        match self.writer {
            WriterStyle::Writer => ("wr", "&mut dyn std::io::Write".to_string()),
            WriterStyle::Buffer if self.lib => ("buffer", format!("&mut {}", self.buffer.type_path())),
            WriterStyle::Buffer => ("buffer", "&mut Buffer".to_string()),
        }
    }
}

/// Preamble and postamble of one generated unit.
#[derive(Debug)]
pub struct Layout<'a> {
    /// Claimed identifier of the template.
    ident: &'a str,
    template: &'a Template,
    options: &'a LayoutOptions,
}

impl<'a> Layout<'a> {
    pub fn new(ident: &'a str, template: &'a Template, options: &'a LayoutOptions) -> Self {
        Self {
            ident,
            template,
            options,
        }
    }

    /// Name of the generated function.
    pub fn fn_name(&self) -> String {
        RUST_NAMING.fn_name(self.ident)
    }

    /// Header, imports, signature and the opening of the producer.
    pub fn write_before(&self, buf: &mut String) {
        let mut b = CodeBuilder::new(buf);
        b.line(&format!(
            "//! Code generated by jade from `{}`. DO NOT EDIT.",
            self.template.name
        ))
        .line("//!")
        .line(&format!("//! Module `{}`.", self.options.module))
        .blank();

        let mut items = vec!["Closed", "copy", "finish", "format", "pipe", "write_esc", "write_int", "write_raw"];
        if self.options.writer == WriterStyle::Buffer && !self.options.lib {
            items.insert(0, "Buffer");
        }
        b.line(&format!(
            "use {}::{{{}}};",
            self.options.runtime_path(),
            items.join(", ")
        ));
        for path in &self.template.uses {
            b.line(&format!("use {};", path.trim().trim_end_matches(';')));
        }
        b.blank();

        let (dest, dest_ty) = self.options.destination();
        let args = self
            .template
            .args
            .as_deref()
            .map(|args| args.trim().trim_end_matches(','))
            .filter(|args| !args.is_empty());
        let params = match args {
            Some(args) => format!("{args}, {dest}: {dest_ty}"),
            None => format!("{dest}: {dest_ty}"),
        };

        b.line(&format!(
            "pub fn {}({params}) -> std::io::Result<()> {{",
            self.fn_name()
        ))
        .indent()
        .line("let (mut w, r) = pipe();")
        .line("std::thread::scope(|s| {")
        .indent()
        .line("let producer = s.spawn(move || -> Result<(), Closed> {")
        .indent()
        .line("let buffer = &mut w;");
    }

    /// Close of the producer, the consumer, and the closing braces.
    pub fn write_after(&self, buf: &mut String) {
        let (dest, _) = self.options.destination();
        let consumer = if self.options.pretty { "format" } else { "copy" };

        CodeBuilder::with_level(buf, BODY_LEVEL)
            .line("w.close();")
            .line("Ok(())")
            .dedent()
            .line("});")
            .line(&format!("let consumed = {consumer}(r, {dest});"))
            .line("finish(producer, consumed)")
            .dedent()
            .line("})")
            .dedent()
            .line("}");
    }
}
