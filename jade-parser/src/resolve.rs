//! Composition: includes, layout inheritance, blocks and mixins.
//!
//! A template is resolved in three steps:
//!
//! 1. The template and every layout it (transitively) extends are parsed,
//!    with includes spliced in as each file is loaded.
//! 2. Mixin declarations and block overrides are collected from the chain.
//! 3. The root layout is lowered to IR nodes, filling each block with its
//!    composed content and expanding mixin calls in place.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use jadec_core::is_template;
use jadec_ir::{Element, Node, Template, UnresolvedKind};
use tracing::{debug, trace};

use crate::ast::{Ast, BlockMode, Document, Loc};
use crate::syntax::parse_document;
use crate::{Result, SourceContext};

/// Default limit for include, extends, block and mixin nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

struct SourceFile {
    ctx: SourceContext,
    /// Directory that relative references in this file resolve against.
    dir: PathBuf,
}

struct Mixin {
    params: Vec<String>,
    body: Vec<Ast>,
}

pub(crate) struct Resolver {
    max_depth: usize,
    files: Vec<SourceFile>,
    mixins: HashMap<String, Mixin>,
    /// Block overrides by name, root-most template first.
    overrides: HashMap<String, Vec<(BlockMode, Vec<Ast>)>>,
    /// `:use` paths contributed by included files.
    included_uses: Vec<String>,
}

impl Resolver {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            files: Vec::new(),
            mixins: HashMap::new(),
            overrides: HashMap::new(),
            included_uses: Vec::new(),
        }
    }

    pub fn resolve(mut self, name: &str, source: &str, base_dir: &Path) -> Result<Template> {
        let root = self.add_file(SourceContext::new(source, name), base_dir.to_path_buf());
        let mut chain = vec![self.load(root, 0)?];

        while let Some((target, loc)) = chain.last().and_then(|doc| doc.extends.clone()) {
            if chain.len() > self.max_depth {
                return Err(self.ctx(loc.file).depth_error(self.max_depth, loc.span));
            }
            let path = self.locate(loc.file, &target);
            debug!(layout = %path.display(), "extending layout");
            let file = self.read(&path, loc)?;
            chain.push(self.load(file, 0)?);
        }

        // Root first so that declarations closer to the rendered template win.
        for doc in chain.iter().rev() {
            self.collect_mixins(&doc.nodes);
        }
        if let Some((_, extending)) = chain.split_last() {
            for doc in extending.iter().rev() {
                for node in &doc.nodes {
                    if let Ast::Block { name, mode, body } = node {
                        self.overrides
                            .entry(name.clone())
                            .or_default()
                            .push((*mode, body.clone()));
                    }
                }
            }
        }

        let args = chain.iter().find_map(|doc| doc.args.clone());
        let mut uses: Vec<String> = Vec::new();
        let declared = chain.iter().rev().flat_map(|doc| doc.uses.iter());
        for path in declared.chain(self.included_uses.iter()) {
            if !uses.contains(path) {
                uses.push(path.clone());
            }
        }

        let nodes = match chain.last() {
            Some(layout) => self.lower(&layout.nodes, 0)?,
            None => Vec::new(),
        };

        Ok(Template {
            name: name.to_string(),
            args,
            uses,
            nodes,
        })
    }

    fn ctx(&self, file: usize) -> &SourceContext {
        &self.files[file].ctx
    }

    fn add_file(&mut self, ctx: SourceContext, dir: PathBuf) -> usize {
        self.files.push(SourceFile { ctx, dir });
        self.files.len() - 1
    }

    /// Resolve a reference relative to the file that makes it. References
    /// without an extension name a `.jade` file, or a `.pug` file when only
    /// that exists.
    fn locate(&self, from: usize, target: &str) -> PathBuf {
        let path = self.files[from].dir.join(target);
        if path.extension().is_some() {
            return path;
        }
        let jade = path.with_extension("jade");
        let pug = path.with_extension("pug");
        if !jade.exists() && pug.exists() { pug } else { jade }
    }

    fn read(&mut self, path: &Path, loc: Loc) -> Result<usize> {
        let src = fs::read_to_string(path)
            .map_err(|e| self.ctx(loc.file).include_error(path, e, loc.span))?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(self.add_file(SourceContext::new(src, path.display().to_string()), dir))
    }

    fn load(&mut self, file: usize, depth: usize) -> Result<Document> {
        let mut doc = parse_document(self.ctx(file), file)?;
        doc.nodes = self.expand_includes(std::mem::take(&mut doc.nodes), depth)?;
        Ok(doc)
    }

    fn expand_includes(&mut self, nodes: Vec<Ast>, depth: usize) -> Result<Vec<Ast>> {
        let mut out = Vec::with_capacity(nodes.len());

        for node in nodes {
            match node {
                Ast::Include { path, loc } => {
                    if depth >= self.max_depth {
                        return Err(self.ctx(loc.file).depth_error(self.max_depth, loc.span));
                    }
                    let target = self.locate(loc.file, &path);
                    debug!(include = %target.display(), "including file");

                    if !is_template(&target) {
                        let text = fs::read_to_string(&target)
                            .map_err(|e| self.ctx(loc.file).include_error(&target, e, loc.span))?;
                        out.push(Ast::Leaf(Node::text(text.trim_end())));
                        continue;
                    }

                    let file = self.read(&target, loc)?;
                    let doc = self.load(file, depth + 1)?;
                    if let Some((_, extends)) = doc.extends {
                        return Err(self.ctx(extends.file).misplaced_error(
                            "extends",
                            "included templates cannot extend a layout",
                            extends.span,
                        ));
                    }
                    self.included_uses.extend(doc.uses);
                    out.extend(doc.nodes);
                }
                Ast::Element { element, children } => out.push(Ast::Element {
                    element,
                    children: self.expand_includes(children, depth)?,
                }),
                Ast::Each {
                    pattern,
                    iter,
                    body,
                } => out.push(Ast::Each {
                    pattern,
                    iter,
                    body: self.expand_includes(body, depth)?,
                }),
                Ast::If {
                    cond,
                    then,
                    otherwise,
                    chained,
                    closed,
                } => out.push(Ast::If {
                    cond,
                    then: self.expand_includes(then, depth)?,
                    otherwise: self.expand_includes(otherwise, depth)?,
                    chained,
                    closed,
                }),
                Ast::Block { name, mode, body } => out.push(Ast::Block {
                    name,
                    mode,
                    body: self.expand_includes(body, depth)?,
                }),
                Ast::MixinDecl { name, params, body } => out.push(Ast::MixinDecl {
                    name,
                    params,
                    body: self.expand_includes(body, depth)?,
                }),
                other => out.push(other),
            }
        }

        Ok(out)
    }

    fn collect_mixins(&mut self, nodes: &[Ast]) {
        for node in nodes {
            match node {
                Ast::MixinDecl { name, params, body } => {
                    trace!(mixin = %name, "declared");
                    self.mixins.insert(
                        name.clone(),
                        Mixin {
                            params: params.clone(),
                            body: body.clone(),
                        },
                    );
                    self.collect_mixins(body);
                }
                Ast::Element { children, .. } => self.collect_mixins(children),
                Ast::Each { body, .. } | Ast::Block { body, .. } => self.collect_mixins(body),
                Ast::If {
                    then, otherwise, ..
                } => {
                    self.collect_mixins(then);
                    self.collect_mixins(otherwise);
                }
                Ast::Leaf(_) | Ast::Include { .. } | Ast::MixinCall { .. } => {}
            }
        }
    }

    /// Content of a block: its default body with every override applied in
    /// order.
    fn block_content(&self, name: &str, default: &[Ast]) -> Vec<Ast> {
        let mut content = default.to_vec();
        for (mode, body) in self.overrides.get(name).into_iter().flatten() {
            match mode {
                BlockMode::Replace => content = body.clone(),
                BlockMode::Append => content.extend(body.iter().cloned()),
                BlockMode::Prepend => {
                    let mut combined = body.clone();
                    combined.append(&mut content);
                    content = combined;
                }
            }
        }
        content
    }

    fn lower(&self, nodes: &[Ast], depth: usize) -> Result<Vec<Node>> {
        let mut out = Vec::with_capacity(nodes.len());

        for node in nodes {
            match node {
                Ast::Leaf(node) => out.push(node.clone()),
                Ast::Element { element, children } => {
                    out.push(Node::Element(Element {
                        children: self.lower(children, depth)?,
                        ..element.clone()
                    }));
                }
                Ast::Each {
                    pattern,
                    iter,
                    body,
                } => out.push(Node::Each {
                    pattern: pattern.clone(),
                    iter: iter.clone(),
                    body: self.lower(body, depth)?,
                }),
                Ast::If {
                    cond,
                    then,
                    otherwise,
                    ..
                } => out.push(Node::If {
                    cond: cond.clone(),
                    then: self.lower(then, depth)?,
                    otherwise: self.lower(otherwise, depth)?,
                }),
                Ast::Block { name, body, .. } => {
                    if depth >= self.max_depth {
                        return Err(self.ctx(0).depth_error(self.max_depth, (0, 0)));
                    }
                    let content = self.lower(&self.block_content(name, body), depth + 1)?;
                    if content.is_empty() {
                        trace!(block = %name, "block left empty");
                        out.push(Node::Unresolved {
                            kind: UnresolvedKind::Block,
                            name: name.clone(),
                        });
                    } else {
                        out.extend(content);
                    }
                }
                Ast::MixinCall { name, args, loc } => {
                    let Some(mixin) = self.mixins.get(name) else {
                        out.push(Node::Unresolved {
                            kind: UnresolvedKind::Mixin,
                            name: name.clone(),
                        });
                        continue;
                    };
                    if mixin.params.len() != args.len() {
                        return Err(self.ctx(loc.file).mixin_arity_error(
                            name,
                            mixin.params.len(),
                            args.len(),
                            loc.span,
                        ));
                    }
                    if depth >= self.max_depth {
                        return Err(self.ctx(loc.file).depth_error(self.max_depth, loc.span));
                    }
                    out.push(Node::Scope {
                        bindings: mixin.params.iter().cloned().zip(args.iter().cloned()).collect(),
                        body: self.lower(&mixin.body, depth + 1)?,
                    });
                }
                // Declarations render nothing; includes were spliced at load time.
                Ast::MixinDecl { .. } | Ast::Include { .. } => {}
            }
        }

        Ok(out)
    }
}
