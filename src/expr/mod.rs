use crate::{context::arena::InternedArena, generate_arena_handle, strings};
use itertools::Itertools;
use std::fmt::{self, Debug, Display};
use ustr::Ustr;

pub mod build;
pub mod reader;
mod stream;

pub use reader::{ExprSpans, ParsedExpr, ReadError, read_expr};

generate_arena_handle! { Expr<'ctx> => ExprData<'ctx> }

pub type ExprArena<'ctx> = InternedArena<ExprData<'ctx>, Expr<'ctx>>;

/// The closed operator vocabulary. Anything else found in a list's operator
/// position is kept as a raw string and reported by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    And,
    Or,
    Implication,
    Equivalence,
    Negation,
    PredicateVariable,
    PredicateConstant,
    Exists,
    ExistsUnique,
    ForAll,
    SubjectVariable,
    FunctionVariable,
    FunctionConstant,
    Class,
}

impl Operator {
    pub const ALL: [Operator; 14] = [
        Operator::And,
        Operator::Or,
        Operator::Implication,
        Operator::Equivalence,
        Operator::Negation,
        Operator::PredicateVariable,
        Operator::PredicateConstant,
        Operator::Exists,
        Operator::ExistsUnique,
        Operator::ForAll,
        Operator::SubjectVariable,
        Operator::FunctionVariable,
        Operator::FunctionConstant,
        Operator::Class,
    ];

    pub fn tag(self) -> Ustr {
        match self {
            Operator::And => *strings::AND,
            Operator::Or => *strings::OR,
            Operator::Implication => *strings::IMPL,
            Operator::Equivalence => *strings::EQUI,
            Operator::Negation => *strings::NOT,
            Operator::PredicateVariable => *strings::PREDVAR,
            Operator::PredicateConstant => *strings::PREDCON,
            Operator::Exists => *strings::EXISTS,
            Operator::ExistsUnique => *strings::EXISTSU,
            Operator::ForAll => *strings::FORALL,
            Operator::SubjectVariable => *strings::VAR,
            Operator::FunctionVariable => *strings::FUNVAR,
            Operator::FunctionConstant => *strings::FUNCON,
            Operator::Class => *strings::CLASS,
        }
    }

    pub fn from_tag(tag: Ustr) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.tag() == tag)
    }

    pub fn is_quantifier(self) -> bool {
        matches!(
            self,
            Operator::Exists | Operator::ExistsUnique | Operator::ForAll
        )
    }

    /// Quantifiers and class terms bind the subject variable in child 0.
    pub fn is_binder(self) -> bool {
        self.is_quantifier() || self == Operator::Class
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprData<'ctx> {
    Atom(Ustr),
    List(ExprList<'ctx>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExprList<'ctx> {
    raw_operator: Ustr,
    operator: Option<Operator>,
    children: Vec<Expr<'ctx>>,
}

impl<'ctx> ExprList<'ctx> {
    pub fn new(raw_operator: Ustr, children: Vec<Expr<'ctx>>) -> Self {
        Self {
            raw_operator,
            operator: Operator::from_tag(raw_operator),
            children,
        }
    }

    /// The operator string exactly as it appeared in the source.
    pub fn raw_operator(&self) -> Ustr {
        self.raw_operator
    }

    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    pub fn children(&self) -> &[Expr<'ctx>] {
        &self.children
    }

    pub fn child(&self, idx: usize) -> Option<Expr<'ctx>> {
        self.children.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<'ctx> Expr<'ctx> {
    pub fn is_atom(self) -> bool {
        matches!(self.0, ExprData::Atom(_))
    }

    pub fn is_list(self) -> bool {
        matches!(self.0, ExprData::List(_))
    }

    pub fn as_atom(self) -> Option<Ustr> {
        match self.0 {
            ExprData::Atom(str) => Some(*str),
            ExprData::List(_) => None,
        }
    }

    pub fn as_list(self) -> Option<&'ctx ExprList<'ctx>> {
        match self.0 {
            ExprData::Atom(_) => None,
            ExprData::List(list) => Some(list),
        }
    }

    /// The decoded operator, if this is a list with a known operator.
    pub fn operator(self) -> Option<Operator> {
        self.as_list().and_then(|list| list.operator())
    }

    pub fn is_subject_variable(self) -> bool {
        self.operator() == Some(Operator::SubjectVariable)
    }

    /// The name of a well-formed subject variable `(VAR x)`.
    pub fn variable_name(self) -> Option<Ustr> {
        let list = self.as_list()?;
        if list.operator() != Some(Operator::SubjectVariable) || list.len() != 1 {
            return None;
        }
        list.child(0)?.as_atom()
    }
}

fn write_token(f: &mut fmt::Formatter<'_>, token: &str) -> fmt::Result {
    let bare = !token.is_empty()
        && token
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | ';'));

    if bare {
        write!(f, "{token}")
    } else {
        write!(f, "\"{}\"", token.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

impl Display for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ExprData::Atom(str) => write_token(f, str),
            ExprData::List(list) if list.is_empty() => {
                write!(f, "(")?;
                write_token(f, &list.raw_operator)?;
                write!(f, ")")
            }
            ExprData::List(list) => {
                write!(f, "(")?;
                write_token(f, &list.raw_operator)?;
                write!(f, " {})", list.children.iter().join(" "))
            }
        }
    }
}

impl Debug for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_gives_structural_equality() {
        let arena = ExprArena::new();
        let a = arena.forall(arena.var("x"), arena.pred_var("P", [arena.var("x")]));
        let b = arena.forall(arena.var("x"), arena.pred_var("P", [arena.var("x")]));
        let c = arena.forall(arena.var("y"), arena.pred_var("P", [arena.var("y")]));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn operators_round_trip_through_tags() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_tag(op.tag()), Some(op));
        }
        assert_eq!(Operator::from_tag(Ustr::from("XOR")), None);
        assert_eq!(Operator::from_tag(Ustr::from("")), None);
    }

    #[test]
    fn atoms_and_lists_are_exclusive() {
        let arena = ExprArena::new();
        let atom = arena.atom("x");
        let var = arena.var("x");

        assert!(atom.is_atom() && !atom.is_list());
        assert!(var.is_list() && !var.is_atom());
        assert_eq!(atom.as_list(), None);
        assert_eq!(var.as_atom(), None);
        assert_eq!(var.variable_name(), Some(Ustr::from("x")));
    }

    #[test]
    fn display_quotes_awkward_tokens() {
        let arena = ExprArena::new();
        let expr = arena.list("", vec![arena.atom("a b"), arena.atom("")]);
        assert_eq!(expr.to_string(), r#"("" "a b" "")"#);

        let expr = arena.pred_con("in", [arena.var("x"), arena.var("y")]);
        assert_eq!(expr.to_string(), "(PREDCON in (VAR x) (VAR y))");
    }
}
