use crate::expr::{Expr, Operator};
use itertools::Itertools;
use rustc_hash::FxBuildHasher;
use std::fmt::{self, Display};
use ustr::Ustr;

/// A set of subject-variable nodes. Expressions are interned, so two
/// `(VAR x)` nodes are the same element exactly when they name the same
/// variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableSet<'ctx> {
    vars: im::HashSet<Expr<'ctx>, FxBuildHasher>,
}

impl<'ctx> VariableSet<'ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(var: Expr<'ctx>) -> Self {
        let mut set = Self::new();
        set.insert(var);
        set
    }

    pub fn insert(&mut self, var: Expr<'ctx>) {
        self.vars.insert(var);
    }

    pub fn remove(&mut self, var: Expr<'ctx>) {
        self.vars.remove(&var);
    }

    pub fn contains(&self, var: Expr<'ctx>) -> bool {
        self.vars.contains(&var)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            vars: self.vars.clone().union(other.vars.clone()),
        }
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            vars: self.vars.clone().intersection(other.vars.clone()),
        }
    }

    /// The variables of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            vars: self.vars.clone().relative_complement(other.vars.clone()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Expr<'ctx>> + '_ {
        self.vars.iter().copied()
    }

    /// Variable names in sorted order, for stable messages.
    pub fn names(&self) -> Vec<Ustr> {
        self.iter()
            .map(|var| {
                var.variable_name()
                    .unwrap_or_else(|| Ustr::from(var.to_string().as_str()))
            })
            .sorted()
            .collect()
    }
}

impl<'ctx> FromIterator<Expr<'ctx>> for VariableSet<'ctx> {
    fn from_iter<T: IntoIterator<Item = Expr<'ctx>>>(iter: T) -> Self {
        let mut set = Self::new();
        for var in iter {
            set.insert(var);
        }
        set
    }
}

impl Display for VariableSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.names().iter().map(|n| format!("`{n}`")).join(", ")
        )
    }
}

/// The subject variables occurring free in `expr`.
pub fn free_variables<'ctx>(expr: Expr<'ctx>) -> VariableSet<'ctx> {
    let Some(list) = expr.as_list() else {
        return VariableSet::new();
    };

    match list.operator() {
        Some(Operator::SubjectVariable) => VariableSet::unit(expr),
        Some(op) if op.is_binder() => {
            let mut free = union_of(list.children().iter().skip(1), free_variables);
            if let Some(bound) = list.child(0) {
                free.remove(bound);
            }
            free
        }
        _ => union_of(list.children().iter(), free_variables),
    }
}

/// The subject variables bound by a quantifier or class term somewhere
/// inside `expr`.
pub fn bound_variables<'ctx>(expr: Expr<'ctx>) -> VariableSet<'ctx> {
    let Some(list) = expr.as_list() else {
        return VariableSet::new();
    };

    match list.operator() {
        Some(op) if op.is_binder() => {
            let mut bound = union_of(list.children().iter().skip(1), bound_variables);
            if let Some(var) = list.child(0)
                && var.is_subject_variable()
            {
                bound.insert(var);
            }
            bound
        }
        _ => union_of(list.children().iter(), bound_variables),
    }
}

fn union_of<'a, 'ctx: 'a>(
    children: impl Iterator<Item = &'a Expr<'ctx>>,
    f: fn(Expr<'ctx>) -> VariableSet<'ctx>,
) -> VariableSet<'ctx> {
    children.fold(VariableSet::new(), |acc, child| acc.union(&f(*child)))
}
