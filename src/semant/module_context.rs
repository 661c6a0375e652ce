use std::{
    fmt::{self, Display},
    ops::{Deref, DerefMut},
};
use ustr::Ustr;

/// One step of a path from a module's root to a node inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// A named part of the module document, e.g. a node label.
    Field(Ustr),
    Child(usize),
    Operator,
    Atom,
}

/// Where in a module the checker currently is. The checker descends with
/// [`ModuleContext::enter`], and the returned guard restores the previous
/// location when dropped, so every exit path leaves the cursor untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleContext {
    module: Ustr,
    steps: Vec<PathStep>,
}

impl ModuleContext {
    pub fn new(module: &str) -> Self {
        Self {
            module: Ustr::from(module),
            steps: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.steps.push(PathStep::Field(Ustr::from(field)));
        self
    }

    pub fn module(&self) -> Ustr {
        self.module
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// The child indices leading from the checked root expression to the
    /// current node.
    pub fn expr_path(&self) -> Vec<usize> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                PathStep::Child(idx) => Some(*idx),
                _ => None,
            })
            .collect()
    }

    pub fn enter(&mut self, step: PathStep) -> ContextGuard<'_> {
        let depth = self.steps.len();
        self.steps.push(step);
        ContextGuard { ctx: self, depth }
    }
}

impl Display for ModuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.module)?;
        for step in &self.steps {
            match step {
                PathStep::Field(name) => write!(f, ".{name}")?,
                PathStep::Child(idx) => write!(f, ".child({idx})")?,
                PathStep::Operator => write!(f, ".operator")?,
                PathStep::Atom => write!(f, ".atom")?,
            }
        }
        Ok(())
    }
}

pub struct ContextGuard<'a> {
    ctx: &'a mut ModuleContext,
    depth: usize,
}

impl Deref for ContextGuard<'_> {
    type Target = ModuleContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.ctx.steps.truncate(self.depth);
    }
}
