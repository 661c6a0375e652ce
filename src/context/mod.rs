use crate::{
    diagnostics::DiagManager,
    expr::ExprArena,
    semant::{DefinitionTable, ErrorPolicy},
    span::SourceCache,
};
use rustc_hash::FxHashMap;
use ustr::Ustr;

pub mod arena;

/// How modules are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckOptions {
    /// Check against the oracle that assumes every constant exists.
    pub syntax_only: bool,
    pub policy: ErrorPolicy,
}

pub struct Ctx<'ctx> {
    /// Every expression read so far, hash-consed.
    pub exprs: &'ctx ExprArena<'ctx>,

    /// Diagnostics manager for reporting errors.
    pub diags: DiagManager,

    /// Source code cache for storing and retrieving the text of source files.
    pub sources: SourceCache,

    /// Definitions of the modules checked so far, by module name.
    pub modules: FxHashMap<Ustr, DefinitionTable>,

    pub options: CheckOptions,
}

impl<'ctx> Ctx<'ctx> {
    pub fn new(sources: SourceCache, exprs: &'ctx ExprArena<'ctx>, options: CheckOptions) -> Self {
        Self {
            exprs,
            diags: DiagManager::new(),
            sources,
            modules: FxHashMap::default(),
            options,
        }
    }
}
