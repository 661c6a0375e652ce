//! Constructors for expressions. `atom` and `list` accept anything, including
//! malformed shapes; the named helpers build well-formed nodes of each
//! operator in the vocabulary.

use crate::expr::{Expr, ExprArena, ExprData, ExprList, Operator};
use ustr::Ustr;

impl<'ctx> ExprArena<'ctx> {
    pub fn atom(&'ctx self, content: &str) -> Expr<'ctx> {
        self.intern(ExprData::Atom(Ustr::from(content)))
    }

    pub fn list(&'ctx self, operator: &str, children: Vec<Expr<'ctx>>) -> Expr<'ctx> {
        self.intern(ExprData::List(ExprList::new(Ustr::from(operator), children)))
    }

    pub fn op(&'ctx self, operator: Operator, children: Vec<Expr<'ctx>>) -> Expr<'ctx> {
        self.intern(ExprData::List(ExprList::new(operator.tag(), children)))
    }

    pub fn var(&'ctx self, name: &str) -> Expr<'ctx> {
        let name = self.atom(name);
        self.op(Operator::SubjectVariable, vec![name])
    }

    pub fn and(&'ctx self, operands: impl IntoIterator<Item = Expr<'ctx>>) -> Expr<'ctx> {
        self.op(Operator::And, operands.into_iter().collect())
    }

    pub fn or(&'ctx self, operands: impl IntoIterator<Item = Expr<'ctx>>) -> Expr<'ctx> {
        self.op(Operator::Or, operands.into_iter().collect())
    }

    pub fn implies(&'ctx self, lhs: Expr<'ctx>, rhs: Expr<'ctx>) -> Expr<'ctx> {
        self.op(Operator::Implication, vec![lhs, rhs])
    }

    pub fn iff(&'ctx self, operands: impl IntoIterator<Item = Expr<'ctx>>) -> Expr<'ctx> {
        self.op(Operator::Equivalence, operands.into_iter().collect())
    }

    pub fn not(&'ctx self, operand: Expr<'ctx>) -> Expr<'ctx> {
        self.op(Operator::Negation, vec![operand])
    }

    pub fn pred_var(
        &'ctx self,
        name: &str,
        args: impl IntoIterator<Item = Expr<'ctx>>,
    ) -> Expr<'ctx> {
        self.application(Operator::PredicateVariable, name, args)
    }

    pub fn pred_con(
        &'ctx self,
        name: &str,
        args: impl IntoIterator<Item = Expr<'ctx>>,
    ) -> Expr<'ctx> {
        self.application(Operator::PredicateConstant, name, args)
    }

    pub fn fun_var(
        &'ctx self,
        name: &str,
        args: impl IntoIterator<Item = Expr<'ctx>>,
    ) -> Expr<'ctx> {
        self.application(Operator::FunctionVariable, name, args)
    }

    pub fn fun_con(
        &'ctx self,
        name: &str,
        args: impl IntoIterator<Item = Expr<'ctx>>,
    ) -> Expr<'ctx> {
        self.application(Operator::FunctionConstant, name, args)
    }

    pub fn exists(&'ctx self, var: Expr<'ctx>, body: Expr<'ctx>) -> Expr<'ctx> {
        self.op(Operator::Exists, vec![var, body])
    }

    pub fn exists_unique(&'ctx self, var: Expr<'ctx>, body: Expr<'ctx>) -> Expr<'ctx> {
        self.op(Operator::ExistsUnique, vec![var, body])
    }

    pub fn forall(&'ctx self, var: Expr<'ctx>, body: Expr<'ctx>) -> Expr<'ctx> {
        self.op(Operator::ForAll, vec![var, body])
    }

    /// A quantifier with a restriction formula as third argument.
    pub fn restricted(
        &'ctx self,
        quantifier: Operator,
        var: Expr<'ctx>,
        body: Expr<'ctx>,
        restriction: Expr<'ctx>,
    ) -> Expr<'ctx> {
        debug_assert!(quantifier.is_quantifier());
        self.op(quantifier, vec![var, body, restriction])
    }

    pub fn class(&'ctx self, var: Expr<'ctx>, formula: Expr<'ctx>) -> Expr<'ctx> {
        self.op(Operator::Class, vec![var, formula])
    }

    fn application(
        &'ctx self,
        operator: Operator,
        name: &str,
        args: impl IntoIterator<Item = Expr<'ctx>>,
    ) -> Expr<'ctx> {
        let mut children = vec![self.atom(name)];
        children.extend(args);
        self.op(operator, children)
    }
}
