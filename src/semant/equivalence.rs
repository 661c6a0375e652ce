//! A weak equivalence test for formulas. Identical formulas are equivalent,
//! and so are two conjunctions (or two disjunctions) over the same set of
//! operands. Nothing deeper is attempted.

use crate::{
    expr::{Expr, Operator},
    semant::{
        check_error::{CheckDiagnostic, FormulaError},
        module_context::ModuleContext,
    },
};
use rustc_hash::FxHashSet;

pub fn check_equivalence<'ctx>(
    first: Expr<'ctx>,
    second: Expr<'ctx>,
    context: &ModuleContext,
) -> Result<(), CheckDiagnostic<'ctx>> {
    if first == second {
        return Ok(());
    }

    if let (Some(lhs), Some(rhs)) = (first.as_list(), second.as_list())
        && let Some(op @ (Operator::And | Operator::Or)) = lhs.operator()
        && rhs.operator() == Some(op)
    {
        let lhs: FxHashSet<Expr> = lhs.children().iter().copied().collect();
        let rhs: FxHashSet<Expr> = rhs.children().iter().copied().collect();
        if lhs == rhs {
            return Ok(());
        }
    }

    tracing::trace!(%first, %second, "not equivalent");
    Err(CheckDiagnostic::new(
        FormulaError::NotEquivalent,
        second,
        context.clone(),
    ))
}
