//! The support module generated next to the render functions.

use std::path::{Path, PathBuf};

use jadec_core::GeneratedFile;

use crate::{BufferKind, CodeBuilder, layout::SUPPORT_MODULE};

/// `jade.rs`: re-exports of the runtime plus the `Buffer` type.
///
/// Generated units import `super::jade::*` items, so the file must sit in
/// the same module directory as the units.
#[derive(Debug, Clone)]
pub struct SupportFile {
    pub buffer: BufferKind,
    /// Module the templates belong to, named in the header.
    pub module: String,
}

impl GeneratedFile for SupportFile {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(format!("{SUPPORT_MODULE}.rs"))
    }

    fn render(&self) -> String {
        let mut out = String::new();
        CodeBuilder::new(&mut out)
            .line("//! Code generated by jade. DO NOT EDIT.")
            .line("//!")
            .line(&format!(
                "//! Runtime support for the templates of module `{}`.",
                self.module
            ))
            .blank()
            .line("pub use jadec_runtime::{Closed, copy, finish, format, pipe, write_esc, write_int, write_raw};")
            .blank()
            .line("/// Buffer accepted by generated functions.")
            .line(&format!("pub type Buffer = {};", self.buffer.type_path()));
        out
    }
}
