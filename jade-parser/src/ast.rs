//! Unresolved syntax tree of a single template file.
//!
//! This is what one file says on its own. Composition constructs
//! (includes, blocks, mixins) are still present here; the resolver turns a
//! chain of documents into a [`jadec_ir::Template`].

use jadec_ir::{Element, Node};

/// Location of a construct: the file it came from and its byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Loc {
    pub file: usize,
    pub span: (usize, usize),
}

/// How a block in an extending template combines with the inherited one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockMode {
    Replace,
    Append,
    Prepend,
}

#[derive(Debug, Clone)]
pub(crate) enum Ast {
    /// A node that needs no resolution (doctype, text, output, code, comment).
    Leaf(Node),
    /// An element whose children may still need resolution.
    Element {
        element: Element,
        children: Vec<Ast>,
    },
    Each {
        pattern: String,
        iter: String,
        body: Vec<Ast>,
    },
    If {
        cond: String,
        then: Vec<Ast>,
        otherwise: Vec<Ast>,
        /// `otherwise` holds a single `else if` branch.
        chained: bool,
        /// An `else` branch was attached.
        closed: bool,
    },
    Block {
        name: String,
        mode: BlockMode,
        body: Vec<Ast>,
    },
    Include {
        path: String,
        loc: Loc,
    },
    MixinDecl {
        name: String,
        params: Vec<String>,
        body: Vec<Ast>,
    },
    MixinCall {
        name: String,
        args: Vec<String>,
        loc: Loc,
    },
}

/// One parsed template file.
#[derive(Debug, Clone, Default)]
pub(crate) struct Document {
    /// `:args` parameter list.
    pub args: Option<String>,
    /// `:use` paths.
    pub uses: Vec<String>,
    /// `extends` target and where it was declared.
    pub extends: Option<(String, Loc)>,
    /// Top-level nodes.
    pub nodes: Vec<Ast>,
}
