//! Well-formedness checking of formulas and terms.
//!
//! The grammar is walked top-down. Every node is first checked for shape
//! (a list with a non-empty operator), then dispatched on its operator. A
//! malformed node only stops the check of its own subtree; siblings are
//! still checked and all problems are collected.

use crate::{
    expr::{Expr, ExprList, Operator},
    semant::{
        check_error::{
            Arity, CheckDiagnostic, ElementError, ErrorKind, FormulaError, Production, TermError,
            VariableClash,
        },
        existence::{AssumeAllExist, ExistenceOracle},
        module_context::{ModuleContext, PathStep},
        variables::{VariableSet, bound_variables, free_variables},
    },
};
use ustr::Ustr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Collect every problem.
    #[default]
    Accumulate,
    /// Stop at the first problem.
    FailFast,
}

pub struct FormulaChecker<'o> {
    oracle: &'o dyn ExistenceOracle,
    policy: ErrorPolicy,
}

impl<'o> FormulaChecker<'o> {
    pub fn new(oracle: &'o dyn ExistenceOracle) -> Self {
        Self::with_policy(oracle, ErrorPolicy::Accumulate)
    }

    /// Panics if the oracle claims an identity operator whose 2-ary
    /// predicate does not exist. That is a wiring error of the caller, not a
    /// problem of the checked document.
    pub fn with_policy(oracle: &'o dyn ExistenceOracle, policy: ErrorPolicy) -> Self {
        if oracle.identity_operator_exists() {
            let identity = oracle.identity_operator();
            assert!(
                identity.is_some_and(|name| oracle.predicate_exists(name, 2)),
                "inconsistent existence oracle: identity operator {identity:?} \
                 is not a defined predicate with arity 2"
            );
        }

        Self { oracle, policy }
    }

    pub fn check_formula<'ctx>(
        &self,
        root: Expr<'ctx>,
        context: &ModuleContext,
    ) -> Vec<CheckDiagnostic<'ctx>> {
        tracing::trace!(%root, %context, "checking formula");
        let mut run = CheckRun::new(self);
        run.formula(root, &mut context.clone());
        run.diags
    }

    pub fn check_term<'ctx>(
        &self,
        root: Expr<'ctx>,
        context: &ModuleContext,
    ) -> Vec<CheckDiagnostic<'ctx>> {
        tracing::trace!(%root, %context, "checking term");
        let mut run = CheckRun::new(self);
        run.term(root, &mut context.clone());
        run.diags
    }
}

pub fn check_formula<'ctx>(
    root: Expr<'ctx>,
    context: &ModuleContext,
    oracle: &dyn ExistenceOracle,
) -> Vec<CheckDiagnostic<'ctx>> {
    FormulaChecker::new(oracle).check_formula(root, context)
}

pub fn check_term<'ctx>(
    root: Expr<'ctx>,
    context: &ModuleContext,
    oracle: &dyn ExistenceOracle,
) -> Vec<CheckDiagnostic<'ctx>> {
    FormulaChecker::new(oracle).check_term(root, context)
}

/// Checks syntax only: every constant is assumed to be defined.
pub fn check_formula_syntax<'ctx>(
    root: Expr<'ctx>,
    context: &ModuleContext,
) -> Vec<CheckDiagnostic<'ctx>> {
    check_formula(root, context, &AssumeAllExist)
}

/// Checks syntax only: every constant is assumed to be defined.
pub fn check_term_syntax<'ctx>(
    root: Expr<'ctx>,
    context: &ModuleContext,
) -> Vec<CheckDiagnostic<'ctx>> {
    check_term(root, context, &AssumeAllExist)
}

/// The mutable state of one top-level check.
struct CheckRun<'o, 'ctx> {
    oracle: &'o dyn ExistenceOracle,
    policy: ErrorPolicy,
    diags: Vec<CheckDiagnostic<'ctx>>,
}

impl<'o, 'ctx> CheckRun<'o, 'ctx> {
    fn new(checker: &FormulaChecker<'o>) -> Self {
        Self {
            oracle: checker.oracle,
            policy: checker.policy,
            diags: Vec::new(),
        }
    }

    fn halted(&self) -> bool {
        self.policy == ErrorPolicy::FailFast && !self.diags.is_empty()
    }

    fn emit(&mut self, kind: impl Into<ErrorKind>, expr: Expr<'ctx>, ctx: &ModuleContext) {
        if self.halted() {
            return;
        }
        let diag = CheckDiagnostic::new(kind, expr, ctx.clone());
        tracing::trace!(code = diag.code(), context = %ctx, "{}", diag.message());
        self.diags.push(diag);
    }

    fn formula(&mut self, expr: Expr<'ctx>, ctx: &mut ModuleContext) {
        if self.halted() {
            return;
        }
        let Some(list) = self.check_list(expr, ctx) else {
            return;
        };

        match list.operator() {
            Some(
                op @ (Operator::And | Operator::Or | Operator::Implication | Operator::Equivalence),
            ) => self.connective(expr, list, op, ctx),
            Some(Operator::Negation) => self.negation(expr, list, ctx),
            Some(op @ (Operator::PredicateVariable | Operator::PredicateConstant)) => {
                self.predicate(expr, list, op, ctx)
            }
            Some(op @ (Operator::Exists | Operator::ExistsUnique | Operator::ForAll)) => {
                self.quantifier(expr, list, op, ctx)
            }
            Some(
                Operator::SubjectVariable
                | Operator::FunctionVariable
                | Operator::FunctionConstant
                | Operator::Class,
            )
            | None => {
                let ctx = ctx.enter(PathStep::Operator);
                self.emit(
                    FormulaError::UnknownLogicalOperator(list.raw_operator()),
                    expr,
                    &ctx,
                );
            }
        }
    }

    fn term(&mut self, expr: Expr<'ctx>, ctx: &mut ModuleContext) {
        if self.halted() {
            return;
        }
        let Some(list) = self.check_list(expr, ctx) else {
            return;
        };

        match list.operator() {
            Some(Operator::SubjectVariable) => {
                self.subject_variable(expr, Production::Term, ctx);
            }
            Some(op @ (Operator::FunctionVariable | Operator::FunctionConstant)) => {
                self.function(expr, list, op, ctx)
            }
            Some(Operator::Class) => self.class(expr, list, ctx),
            Some(
                Operator::And
                | Operator::Or
                | Operator::Implication
                | Operator::Equivalence
                | Operator::Negation
                | Operator::PredicateVariable
                | Operator::PredicateConstant
                | Operator::Exists
                | Operator::ExistsUnique
                | Operator::ForAll,
            )
            | None => {
                let ctx = ctx.enter(PathStep::Operator);
                self.emit(
                    TermError::UnknownTermOperator(list.raw_operator()),
                    expr,
                    &ctx,
                );
            }
        }
    }

    /// The node must be a list with a non-empty operator.
    fn check_list(
        &mut self,
        expr: Expr<'ctx>,
        ctx: &mut ModuleContext,
    ) -> Option<&'ctx ExprList<'ctx>> {
        let Some(list) = expr.as_list() else {
            self.emit(ElementError::ListExpected, expr, ctx);
            return None;
        };

        if list.raw_operator().is_empty() {
            let ctx = ctx.enter(PathStep::Operator);
            self.emit(ElementError::EmptyOperator, expr, &ctx);
            return None;
        }

        Some(list)
    }

    /// The first child must be a non-empty atom. Returns its content.
    fn check_atom_first(
        &mut self,
        expr: Expr<'ctx>,
        list: &ExprList<'ctx>,
        ctx: &mut ModuleContext,
    ) -> Option<Ustr> {
        let mut ctx = ctx.enter(PathStep::Child(0));
        let Some(first) = list.child(0) else {
            self.emit(ElementError::MissingFirstArgument, expr, &ctx);
            return None;
        };

        let ctx = ctx.enter(PathStep::Atom);
        let Some(name) = first.as_atom() else {
            self.emit(ElementError::AtomExpected, first, &ctx);
            return None;
        };

        if name.is_empty() {
            self.emit(ElementError::EmptyAtom, first, &ctx);
            return None;
        }

        Some(name)
    }

    fn connective(
        &mut self,
        expr: Expr<'ctx>,
        list: &ExprList<'ctx>,
        op: Operator,
        ctx: &mut ModuleContext,
    ) {
        if op == Operator::Implication && list.len() != 2 {
            self.emit(Production::Formula.arity(Arity::ExactlyTwo), expr, ctx);
            return;
        }
        if list.len() < 2 {
            self.emit(Production::Formula.arity(Arity::MoreThanOne), expr, ctx);
            return;
        }

        for (idx, &child) in list.children().iter().enumerate() {
            let mut ctx = ctx.enter(PathStep::Child(idx));
            self.formula(child, &mut ctx);
        }

        self.check_free_bound_disjoint(list, 0, Production::Formula, ctx);
    }

    fn negation(&mut self, expr: Expr<'ctx>, list: &ExprList<'ctx>, ctx: &mut ModuleContext) {
        let [operand] = list.children() else {
            self.emit(Production::Formula.arity(Arity::ExactlyOne), expr, ctx);
            return;
        };

        let mut ctx = ctx.enter(PathStep::Child(0));
        self.formula(*operand, &mut ctx);
    }

    fn predicate(
        &mut self,
        expr: Expr<'ctx>,
        list: &ExprList<'ctx>,
        op: Operator,
        ctx: &mut ModuleContext,
    ) {
        if list.is_empty() {
            self.emit(Production::Formula.arity(Arity::AtLeastOne), expr, ctx);
            return;
        }
        let Some(name) = self.check_atom_first(expr, list, ctx) else {
            return;
        };

        self.arguments(list, Production::Formula, ctx);

        let arity = list.len() - 1;
        if op == Operator::PredicateConstant && !self.oracle.predicate_exists(name, arity) {
            self.emit(
                FormulaError::UnknownPredicateConstant { name, arity },
                expr,
                ctx,
            );
        }
    }

    fn quantifier(
        &mut self,
        expr: Expr<'ctx>,
        list: &ExprList<'ctx>,
        op: Operator,
        ctx: &mut ModuleContext,
    ) {
        if !op.is_quantifier() {
            self.emit(FormulaError::QuantifierExpected, expr, ctx);
            return;
        }
        if !(2..=3).contains(&list.len()) {
            self.emit(Production::Formula.arity(Arity::TwoOrThree), expr, ctx);
            return;
        }

        let var = list.children()[0];
        {
            let mut ctx = ctx.enter(PathStep::Child(0));
            self.subject_variable(var, Production::Formula, &mut ctx);
        }

        if op == Operator::ExistsUnique && !self.oracle.identity_operator_exists() {
            self.emit(FormulaError::EqualityPredicateNotYetDefined, expr, ctx);
        }

        // The body and the optional restriction must not rebind the variable.
        for (idx, &child) in list.children().iter().enumerate().skip(1) {
            let mut ctx = ctx.enter(PathStep::Child(idx));
            self.formula(child, &mut ctx);
            self.check_not_rebound(var, child, Production::Formula, &ctx);
        }

        if list.len() == 3 {
            self.check_free_bound_disjoint(list, 1, Production::Formula, ctx);
        }
    }

    /// Checks `(VAR name)`. Returns whether the node is well-formed.
    fn subject_variable(
        &mut self,
        expr: Expr<'ctx>,
        production: Production,
        ctx: &mut ModuleContext,
    ) -> bool {
        let Some(list) = self.check_list(expr, ctx) else {
            return false;
        };

        if list.operator() != Some(Operator::SubjectVariable) {
            let ctx = ctx.enter(PathStep::Operator);
            self.emit(production.subject_variable_expected(), expr, &ctx);
            return false;
        }
        if list.len() != 1 {
            self.emit(production.arity(Arity::ExactlyOne), expr, ctx);
            return false;
        }

        self.check_atom_first(expr, list, ctx).is_some()
    }

    fn function(
        &mut self,
        expr: Expr<'ctx>,
        list: &ExprList<'ctx>,
        op: Operator,
        ctx: &mut ModuleContext,
    ) {
        if op == Operator::FunctionConstant && list.is_empty() {
            self.emit(Production::Term.arity(Arity::AtLeastOne), expr, ctx);
            return;
        }
        if op == Operator::FunctionVariable && list.len() < 2 {
            self.emit(Production::Term.arity(Arity::MoreThanOne), expr, ctx);
            return;
        }
        let Some(name) = self.check_atom_first(expr, list, ctx) else {
            return;
        };

        self.arguments(list, Production::Term, ctx);

        let arity = list.len() - 1;
        if op == Operator::FunctionConstant && !self.oracle.function_exists(name, arity) {
            self.emit(TermError::UnknownFunctionConstant { name, arity }, expr, ctx);
        }
    }

    fn class(&mut self, expr: Expr<'ctx>, list: &ExprList<'ctx>, ctx: &mut ModuleContext) {
        let &[var, formula] = list.children() else {
            self.emit(Production::Term.arity(Arity::ExactlyTwo), expr, ctx);
            return;
        };

        {
            let mut ctx = ctx.enter(PathStep::Child(0));
            self.subject_variable(var, Production::Term, &mut ctx);
        }
        {
            let mut ctx = ctx.enter(PathStep::Child(1));
            self.formula(formula, &mut ctx);
        }

        if !self.oracle.class_operator_exists() {
            self.emit(TermError::ClassOperatorStillUnknown, expr, ctx);
        }

        let ctx = ctx.enter(PathStep::Child(1));
        self.check_not_rebound(var, formula, Production::Term, &ctx);
    }

    /// Checks children 1.. of a predicate or function as terms.
    fn arguments(
        &mut self,
        list: &ExprList<'ctx>,
        production: Production,
        ctx: &mut ModuleContext,
    ) {
        for (idx, &child) in list.children().iter().enumerate().skip(1) {
            let mut ctx = ctx.enter(PathStep::Child(idx));
            self.term(child, &mut ctx);
        }

        self.check_free_bound_disjoint(list, 1, production, ctx);
    }

    fn check_not_rebound(
        &mut self,
        var: Expr<'ctx>,
        scope: Expr<'ctx>,
        production: Production,
        ctx: &ModuleContext,
    ) {
        if !var.is_subject_variable() || !bound_variables(scope).contains(var) {
            return;
        }

        let name = var
            .variable_name()
            .unwrap_or_else(|| Ustr::from(var.to_string().as_str()));
        let kind: ErrorKind = match production {
            Production::Formula => FormulaError::SubjectVariableAlreadyBound(name).into(),
            Production::Term => TermError::SubjectVariableAlreadyBound(name).into(),
        };
        self.emit(kind, scope, ctx);
    }

    /// No variable may be free in one of the children `start..` and bound in
    /// another.
    fn check_free_bound_disjoint(
        &mut self,
        list: &ExprList<'ctx>,
        start: usize,
        production: Production,
        ctx: &mut ModuleContext,
    ) {
        let mut free = VariableSet::new();
        let mut bound = VariableSet::new();

        for (idx, &child) in list.children().iter().enumerate().skip(start) {
            if self.halted() {
                return;
            }

            let child_free = free_variables(child);
            let child_bound = bound_variables(child);
            let ctx = ctx.enter(PathStep::Child(idx));

            let clash = child_free.intersection(&bound);
            if !clash.is_empty() {
                let clash = VariableClash::FreeAlreadyBound(clash.to_string());
                self.emit(production.clash(clash), child, &ctx);
            }

            let clash = child_bound.intersection(&free);
            if !clash.is_empty() {
                let clash = VariableClash::BoundAlreadyFree(clash.to_string());
                self.emit(production.clash(clash), child, &ctx);
            }

            free = free.union(&child_free);
            bound = bound.union(&child_bound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expr::ExprArena,
        semant::{check_error::ElementError, existence::DefinitionTable},
    };

    fn ctx() -> ModuleContext {
        ModuleContext::new("m").with_field("f")
    }

    fn kinds(diags: &[CheckDiagnostic]) -> Vec<ErrorKind> {
        diags.iter().map(|d| d.kind().clone()).collect()
    }

    fn u(s: &str) -> Ustr {
        Ustr::from(s)
    }

    #[test]
    fn shared_free_variable_is_fine() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let formula = arena.and([arena.pred_var("P", [x]), arena.pred_var("Q", [x])]);

        assert!(check_formula_syntax(formula, &ctx()).is_empty());
    }

    #[test]
    fn nested_rebinding_is_reported_once() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let formula = arena.forall(x, arena.exists(x, arena.pred_var("P", [x])));

        let diags = check_formula_syntax(formula, &ctx());
        assert_eq!(
            kinds(&diags),
            vec![FormulaError::SubjectVariableAlreadyBound(u("x")).into()]
        );
        assert_eq!(diags[0].context().to_string(), "m.f.child(1)");
        assert!(diags[0].message().contains("already bound in formula"));
    }

    #[test]
    fn free_occurrence_in_body_is_not_rebinding() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let body = arena.pred_var("P", [x]);
        let formula = arena.forall(x, body);

        assert!(free_variables(body).contains(x));
        assert!(check_formula_syntax(formula, &ctx()).is_empty());
    }

    #[test]
    fn undefined_predicate_constant() {
        let arena = ExprArena::new();
        let formula = arena.pred_con("isSet", [arena.var("x")]);

        let diags = check_formula(formula, &ctx(), &DefinitionTable::new());
        assert_eq!(
            kinds(&diags),
            vec![
                FormulaError::UnknownPredicateConstant {
                    name: u("isSet"),
                    arity: 1
                }
                .into()
            ]
        );
        assert!(diags[0].message().contains("unknown predicate constant"));
        assert_eq!(diags[0].expr(), formula);
    }

    #[test]
    fn defined_predicate_constant() {
        let arena = ExprArena::new();
        let mut table = DefinitionTable::new();
        table.define_predicate(u("isSet"), 1, u("defSet")).unwrap();
        let formula = arena.pred_con("isSet", [arena.var("x")]);

        assert!(check_formula(formula, &ctx(), &table).is_empty());
    }

    #[test]
    fn unique_existence_needs_equality() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let formula = arena.exists_unique(x, arena.pred_var("P", [x]));

        let diags = check_formula(formula, &ctx(), &DefinitionTable::new());
        assert_eq!(
            kinds(&diags),
            vec![FormulaError::EqualityPredicateNotYetDefined.into()]
        );

        let mut table = DefinitionTable::new();
        table.define_predicate(u("equal"), 2, u("defEqual")).unwrap();
        table.set_identity_operator(u("equal")).unwrap();
        assert!(check_formula(formula, &ctx(), &table).is_empty());
    }

    #[test]
    fn empty_operator_is_an_element_error() {
        let arena = ExprArena::new();
        let diags = check_formula_syntax(arena.list("", vec![]), &ctx());

        assert_eq!(kinds(&diags), vec![ElementError::EmptyOperator.into()]);
        assert_eq!(diags[0].code(), 9002);
        assert_eq!(diags[0].context().to_string(), "m.f.operator");
    }

    #[test]
    fn bound_then_free_sibling_clash() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let formula = arena.and([
            arena.pred_var("P", [x]),
            arena.forall(x, arena.pred_var("Q", [x])),
        ]);

        let diags = check_formula_syntax(formula, &ctx());
        assert_eq!(
            kinds(&diags),
            vec![FormulaError::Clash(VariableClash::BoundAlreadyFree("`x`".into())).into()]
        );
        assert_eq!(diags[0].code(), 9231);
        assert_eq!(diags[0].context().to_string(), "m.f.child(1)");
    }

    #[test]
    fn clash_is_checked_across_all_siblings() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let formula = arena.or([
            arena.exists(x, arena.pred_var("Q", [x])),
            arena.pred_var("R", []),
            arena.pred_var("P", [x]),
        ]);

        let diags = check_formula_syntax(formula, &ctx());
        assert_eq!(
            kinds(&diags),
            vec![FormulaError::Clash(VariableClash::FreeAlreadyBound("`x`".into())).into()]
        );
        assert_eq!(diags[0].context().to_string(), "m.f.child(2)");
    }

    #[test]
    fn binding_in_two_siblings_is_allowed() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let formula = arena.iff([
            arena.exists(x, arena.pred_var("P", [x])),
            arena.forall(x, arena.pred_var("Q", [x])),
        ]);

        assert!(check_formula_syntax(formula, &ctx()).is_empty());
    }

    #[test]
    fn malformed_sibling_does_not_stop_the_check() {
        let arena = ExprArena::new();
        let formula = arena.and([arena.atom("oops"), arena.pred_con("undefined", [arena.var("x")])]);

        let diags = check_formula(formula, &ctx(), &DefinitionTable::new());
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].kind(), &ElementError::ListExpected.into());
        assert_eq!(diags[0].context().to_string(), "m.f.child(0)");
        assert_eq!(diags[1].code(), 9204);
        assert_eq!(diags[1].context().to_string(), "m.f.child(1)");
    }

    #[test]
    fn fail_fast_stops_at_first_problem() {
        let arena = ExprArena::new();
        let formula = arena.and([arena.atom("oops"), arena.pred_con("undefined", [arena.var("x")])]);

        let table = DefinitionTable::new();
        let checker = FormulaChecker::with_policy(&table, ErrorPolicy::FailFast);
        let diags = checker.check_formula(formula, &ctx());
        assert_eq!(kinds(&diags), vec![ElementError::ListExpected.into()]);
    }

    #[test]
    fn connective_arities() {
        let arena = ExprArena::new();
        let p = arena.pred_var("P", []);

        let implication = arena.op(Operator::Implication, vec![p, p, p]);
        let conjunction = arena.and([p]);
        let negation = arena.op(Operator::Negation, vec![p, p]);

        assert_eq!(
            kinds(&check_formula_syntax(implication, &ctx())),
            vec![Production::Formula.arity(Arity::ExactlyTwo)]
        );
        assert_eq!(
            kinds(&check_formula_syntax(conjunction, &ctx())),
            vec![Production::Formula.arity(Arity::MoreThanOne)]
        );
        assert_eq!(
            kinds(&check_formula_syntax(negation, &ctx())),
            vec![Production::Formula.arity(Arity::ExactlyOne)]
        );
        assert!(check_formula_syntax(arena.iff([p, p, p]), &ctx()).is_empty());
    }

    #[test]
    fn unknown_operators() {
        let arena = ExprArena::new();
        let p = arena.pred_var("P", []);

        let diags = check_formula_syntax(arena.list("XOR", vec![p, p]), &ctx());
        assert_eq!(
            kinds(&diags),
            vec![FormulaError::UnknownLogicalOperator(u("XOR")).into()]
        );
        assert_eq!(diags[0].context().to_string(), "m.f.operator");

        // A term in formula position and a formula in term position.
        let diags = check_formula_syntax(arena.var("x"), &ctx());
        assert_eq!(
            kinds(&diags),
            vec![FormulaError::UnknownLogicalOperator(u("VAR")).into()]
        );
        let diags = check_formula_syntax(arena.pred_var("Q", [arena.and([p, p])]), &ctx());
        assert_eq!(
            kinds(&diags),
            vec![TermError::UnknownTermOperator(u("AND")).into()]
        );
        assert_eq!(diags[0].context().to_string(), "m.f.child(1).operator");
    }

    #[test]
    fn predicate_name_must_be_an_atom() {
        let arena = ExprArena::new();

        let diags = check_formula_syntax(arena.list("PREDVAR", vec![arena.var("x")]), &ctx());
        assert_eq!(kinds(&diags), vec![ElementError::AtomExpected.into()]);
        assert_eq!(diags[0].context().to_string(), "m.f.child(0).atom");

        let diags = check_formula_syntax(arena.pred_var("", [arena.var("x")]), &ctx());
        assert_eq!(kinds(&diags), vec![ElementError::EmptyAtom.into()]);

        let diags = check_formula_syntax(arena.list("PREDCON", vec![]), &ctx());
        assert_eq!(
            kinds(&diags),
            vec![Production::Formula.arity(Arity::AtLeastOne)]
        );
    }

    #[test]
    fn function_arities_and_existence() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let table = DefinitionTable::new();

        let term = arena.fun_var("f", []);
        assert_eq!(
            kinds(&check_term(term, &ctx(), &table)),
            vec![Production::Term.arity(Arity::MoreThanOne)]
        );

        let term = arena.fun_con("emptySet", []);
        assert_eq!(
            kinds(&check_term(term, &ctx(), &table)),
            vec![
                TermError::UnknownFunctionConstant {
                    name: u("emptySet"),
                    arity: 0
                }
                .into()
            ]
        );
        assert!(check_term_syntax(term, &ctx()).is_empty());

        let term = arena.fun_var("f", [x, arena.fun_var("g", [x])]);
        assert!(check_term(term, &ctx(), &table).is_empty());
    }

    #[test]
    fn subject_variable_shape() {
        let arena = ExprArena::new();
        let term = arena.list("VAR", vec![arena.atom("x"), arena.atom("y")]);

        assert_eq!(
            kinds(&check_term_syntax(term, &ctx())),
            vec![Production::Term.arity(Arity::ExactlyOne)]
        );
        assert!(check_term_syntax(arena.var("x"), &ctx()).is_empty());
    }

    #[test]
    fn quantifier_needs_a_subject_variable() {
        let arena = ExprArena::new();
        let formula = arena.forall(
            arena.fun_var("f", [arena.var("y")]),
            arena.pred_var("P", []),
        );

        let diags = check_formula_syntax(formula, &ctx());
        assert_eq!(
            kinds(&diags),
            vec![FormulaError::SubjectVariableExpected.into()]
        );
        assert_eq!(diags[0].context().to_string(), "m.f.child(0).operator");

        let formula = arena.op(Operator::Exists, vec![arena.var("x")]);
        assert_eq!(
            kinds(&check_formula_syntax(formula, &ctx())),
            vec![Production::Formula.arity(Arity::TwoOrThree)]
        );
    }

    #[test]
    fn every_quantifier_tag_is_dispatched_as_quantifier() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        for op in [Operator::Exists, Operator::ExistsUnique, Operator::ForAll] {
            let formula = arena.op(op, vec![x, arena.pred_var("P", [x])]);
            assert!(check_formula_syntax(formula, &ctx()).is_empty(), "{op}");
        }
    }

    #[test]
    fn quantifier_production_rejects_other_operators() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let expr = arena.and([arena.pred_var("P", [x]), arena.pred_var("Q", [x])]);
        let list = expr.as_list().unwrap();

        let checker = FormulaChecker::new(&AssumeAllExist);
        let mut run = CheckRun::new(&checker);
        run.quantifier(expr, list, Operator::And, &mut ctx());

        assert_eq!(run.diags.len(), 1);
        assert_eq!(run.diags[0].code(), 9202);
        assert_eq!(
            kinds(&run.diags),
            vec![ErrorKind::from(FormulaError::QuantifierExpected)]
        );
    }

    #[test]
    fn restriction_is_checked_like_the_body() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let formula = arena.restricted(
            Operator::ForAll,
            x,
            arena.pred_var("P", [x]),
            arena.exists(x, arena.pred_var("Q", [x])),
        );

        let diags = check_formula_syntax(formula, &ctx());
        assert_eq!(
            kinds(&diags),
            vec![
                FormulaError::SubjectVariableAlreadyBound(u("x")).into(),
                FormulaError::Clash(VariableClash::BoundAlreadyFree("`x`".into())).into(),
            ]
        );
        assert!(
            diags
                .iter()
                .all(|d| d.context().to_string() == "m.f.child(2)")
        );
    }

    #[test]
    fn class_terms() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let y = arena.var("y");
        let class = arena.class(x, arena.pred_con("in", [x, y]));

        let mut table = DefinitionTable::new();
        table.define_predicate(u("in"), 2, u("defIn")).unwrap();
        assert_eq!(
            kinds(&check_term(class, &ctx(), &table)),
            vec![TermError::ClassOperatorStillUnknown.into()]
        );

        table.set_class_operator(u("defClass"));
        assert!(check_term(class, &ctx(), &table).is_empty());

        let rebinding = arena.class(x, arena.exists(x, arena.pred_var("P", [x])));
        let diags = check_term(rebinding, &ctx(), &table);
        assert_eq!(
            kinds(&diags),
            vec![TermError::SubjectVariableAlreadyBound(u("x")).into()]
        );
        assert_eq!(diags[0].context().to_string(), "m.f.child(1)");

        let not_a_var = arena.class(arena.atom("x"), arena.pred_var("P", []));
        assert_eq!(
            kinds(&check_term(not_a_var, &ctx(), &table)),
            vec![ElementError::ListExpected.into()]
        );
    }

    #[test]
    fn context_points_at_the_nested_defect() {
        let arena = ExprArena::new();
        let formula = arena.not(arena.and([
            arena.pred_var("P", [arena.var("x")]),
            arena.list("", vec![]),
        ]));

        let diags = check_formula_syntax(formula, &ctx());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].context().to_string(), "m.f.child(0).child(1).operator");
        assert_eq!(diags[0].context().expr_path(), vec![0, 1]);
    }

    #[test]
    fn repeated_checks_agree() {
        let arena = ExprArena::new();
        let x = arena.var("x");
        let formula = arena.and([
            arena.pred_con("in", [x, arena.fun_con("emptySet", [])]),
            arena.forall(x, arena.exists(x, arena.pred_var("P", [x]))),
        ]);

        let table = DefinitionTable::new();
        let first = check_formula(formula, &ctx(), &table);
        let second = check_formula(formula, &ctx(), &table);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    struct BrokenOracle;

    impl ExistenceOracle for BrokenOracle {
        fn predicate_exists(&self, _name: Ustr, _arity: usize) -> bool {
            false
        }

        fn function_exists(&self, _name: Ustr, _arity: usize) -> bool {
            false
        }

        fn class_operator_exists(&self) -> bool {
            false
        }

        fn identity_operator_exists(&self) -> bool {
            true
        }

        fn identity_operator(&self) -> Option<Ustr> {
            Some(Ustr::from("equal"))
        }
    }

    #[test]
    #[should_panic(expected = "inconsistent existence oracle")]
    fn inconsistent_oracle_is_fatal() {
        let _ = FormulaChecker::new(&BrokenOracle);
    }
}
