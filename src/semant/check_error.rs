//! The closed set of problems the formula checker reports. Codes are stable:
//! element-shape errors are 90xx, term errors 91xx, formula errors 92xx.

use crate::{expr::Expr, semant::module_context::ModuleContext};
use thiserror::Error;
use ustr::Ustr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    #[error(transparent)]
    Element(#[from] ElementError),
    #[error(transparent)]
    Term(#[from] TermError),
    #[error(transparent)]
    Formula(#[from] FormulaError),
}

impl ErrorKind {
    pub fn code(&self) -> u16 {
        match self {
            ErrorKind::Element(e) => e.code(),
            ErrorKind::Term(e) => e.code(),
            ErrorKind::Formula(e) => e.code(),
        }
    }
}

/// The tree itself is malformed, independent of any logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ElementError {
    #[error("list expected")]
    ListExpected,
    #[error("operator content must not be empty")]
    EmptyOperator,
    #[error("first argument missing, expected an atom naming the symbol")]
    MissingFirstArgument,
    #[error("atom expected")]
    AtomExpected,
    #[error("atom content must not be empty")]
    EmptyAtom,
}

impl ElementError {
    pub fn code(&self) -> u16 {
        match self {
            ElementError::ListExpected => 9001,
            ElementError::EmptyOperator => 9002,
            ElementError::MissingFirstArgument => 9003,
            ElementError::AtomExpected => 9004,
            ElementError::EmptyAtom => 9005,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Arity {
    #[error("exactly one argument expected")]
    ExactlyOne,
    #[error("exactly two arguments expected")]
    ExactlyTwo,
    #[error("exactly two or three arguments expected")]
    TwoOrThree,
    #[error("at least one argument expected")]
    AtLeastOne,
    #[error("more than one argument expected")]
    MoreThanOne,
}

impl Arity {
    fn offset(self) -> u16 {
        match self {
            Arity::ExactlyOne => 0,
            Arity::ExactlyTwo => 1,
            Arity::TwoOrThree => 2,
            Arity::AtLeastOne => 3,
            Arity::MoreThanOne => 4,
        }
    }
}

/// A variable that is free in one argument and bound in a sibling argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum VariableClash {
    #[error("free variables {0} already bound in a preceding argument")]
    FreeAlreadyBound(String),
    #[error("bound variables {0} already free in a preceding argument")]
    BoundAlreadyFree(String),
}

impl VariableClash {
    fn offset(&self) -> u16 {
        match self {
            VariableClash::FreeAlreadyBound(_) => 0,
            VariableClash::BoundAlreadyFree(_) => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum TermError {
    #[error("unknown term operator `{0}`")]
    UnknownTermOperator(Ustr),
    #[error("subject variable expected")]
    SubjectVariableExpected,
    #[error("unknown function constant `{name}` with arity {arity}")]
    UnknownFunctionConstant { name: Ustr, arity: usize },
    #[error("class operator still unknown")]
    ClassOperatorStillUnknown,
    #[error("subject variable already bound in formula: `{0}`")]
    SubjectVariableAlreadyBound(Ustr),
    #[error(transparent)]
    Arity(Arity),
    #[error(transparent)]
    Clash(VariableClash),
}

impl TermError {
    pub fn code(&self) -> u16 {
        match self {
            TermError::UnknownTermOperator(_) => 9101,
            TermError::SubjectVariableExpected => 9102,
            TermError::UnknownFunctionConstant { .. } => 9103,
            TermError::ClassOperatorStillUnknown => 9104,
            TermError::SubjectVariableAlreadyBound(_) => 9105,
            TermError::Arity(arity) => 9120 + arity.offset(),
            TermError::Clash(clash) => 9130 + clash.offset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum FormulaError {
    #[error("unknown logical operator `{0}`")]
    UnknownLogicalOperator(Ustr),
    #[error("quantifier expected")]
    QuantifierExpected,
    #[error("subject variable expected")]
    SubjectVariableExpected,
    #[error("unknown predicate constant `{name}` with arity {arity}")]
    UnknownPredicateConstant { name: Ustr, arity: usize },
    #[error("equality predicate not yet defined")]
    EqualityPredicateNotYetDefined,
    #[error("subject variable already bound in formula: `{0}`")]
    SubjectVariableAlreadyBound(Ustr),
    #[error("free variables {0} are not parameters of the definition")]
    FreeVariableNotAParameter(String),
    #[error("formulas are not equivalent")]
    NotEquivalent,
    #[error(transparent)]
    Arity(Arity),
    #[error(transparent)]
    Clash(VariableClash),
}

impl FormulaError {
    pub fn code(&self) -> u16 {
        match self {
            FormulaError::UnknownLogicalOperator(_) => 9201,
            FormulaError::QuantifierExpected => 9202,
            FormulaError::SubjectVariableExpected => 9203,
            FormulaError::UnknownPredicateConstant { .. } => 9204,
            FormulaError::EqualityPredicateNotYetDefined => 9205,
            FormulaError::SubjectVariableAlreadyBound(_) => 9206,
            FormulaError::FreeVariableNotAParameter(_) => 9207,
            FormulaError::NotEquivalent => 9208,
            FormulaError::Arity(arity) => 9220 + arity.offset(),
            FormulaError::Clash(clash) => 9230 + clash.offset(),
        }
    }
}

/// Which production a shared rule (arity, subject variable, clash) was
/// applied from. Decides whether its problems are term or formula errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    Formula,
    Term,
}

impl Production {
    pub fn arity(self, arity: Arity) -> ErrorKind {
        match self {
            Production::Formula => FormulaError::Arity(arity).into(),
            Production::Term => TermError::Arity(arity).into(),
        }
    }

    pub fn clash(self, clash: VariableClash) -> ErrorKind {
        match self {
            Production::Formula => FormulaError::Clash(clash).into(),
            Production::Term => TermError::Clash(clash).into(),
        }
    }

    pub fn subject_variable_expected(self) -> ErrorKind {
        match self {
            Production::Formula => FormulaError::SubjectVariableExpected.into(),
            Production::Term => TermError::SubjectVariableExpected.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDiagnostic<'ctx> {
    kind: ErrorKind,
    expr: Expr<'ctx>,
    context: ModuleContext,
}

impl<'ctx> CheckDiagnostic<'ctx> {
    pub fn new(kind: impl Into<ErrorKind>, expr: Expr<'ctx>, context: ModuleContext) -> Self {
        Self {
            kind: kind.into(),
            expr,
            context,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// The node at which the problem was found.
    pub fn expr(&self) -> Expr<'ctx> {
        self.expr
    }

    pub fn context(&self) -> &ModuleContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_grouped_by_category() {
        let element = ErrorKind::from(ElementError::EmptyOperator);
        let term = Production::Term.arity(Arity::AtLeastOne);
        let formula = Production::Formula.clash(VariableClash::BoundAlreadyFree("`x`".into()));

        assert_eq!(element.code(), 9002);
        assert_eq!(term.code(), 9123);
        assert_eq!(formula.code(), 9231);
    }

    #[test]
    fn messages_name_the_offender() {
        let err = FormulaError::UnknownPredicateConstant {
            name: Ustr::from("isSet"),
            arity: 1,
        };
        assert_eq!(err.to_string(), "unknown predicate constant `isSet` with arity 1");
        assert_eq!(
            Production::Formula.arity(Arity::ExactlyTwo).to_string(),
            "exactly two arguments expected"
        );
    }
}
