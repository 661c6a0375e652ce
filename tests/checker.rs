//! The checker through the public API, on expressions read from text.

use wff::{
    ExprArena, read_expr,
    semant::{
        AssumeAllExist, DefinitionTable, ElementError, ErrorKind, FormulaError, ModuleContext,
        check_equivalence, check_formula, check_term,
    },
};
use ustr::Ustr;

fn kinds(text: &str, oracle: &dyn wff::semant::ExistenceOracle) -> Vec<ErrorKind> {
    let arena = ExprArena::new();
    let parsed = read_expr(text, &arena).unwrap();
    check_formula(parsed.root, &ModuleContext::new("t"), oracle)
        .into_iter()
        .map(|d| d.kind().clone())
        .collect()
}

#[test]
fn conjunction_sharing_a_free_variable() {
    let found = kinds(
        "(AND (PREDVAR P (VAR x)) (PREDVAR Q (VAR x)))",
        &AssumeAllExist,
    );
    assert!(found.is_empty());
}

#[test]
fn nested_quantifier_over_the_same_variable() {
    let found = kinds(
        "(FORALL (VAR x) (EXISTS (VAR x) (PREDVAR P (VAR x))))",
        &AssumeAllExist,
    );
    assert_eq!(
        found,
        vec![FormulaError::SubjectVariableAlreadyBound(Ustr::from("x")).into()]
    );
}

#[test]
fn undefined_predicate_constant() {
    let found = kinds("(PREDCON isSet (VAR x))", &DefinitionTable::new());
    assert_eq!(
        found,
        vec![
            FormulaError::UnknownPredicateConstant {
                name: Ustr::from("isSet"),
                arity: 1,
            }
            .into()
        ]
    );
}

#[test]
fn unique_existence_without_identity() {
    let found = kinds(
        "(EXISTSU (VAR x) (PREDVAR P (VAR x)))",
        &DefinitionTable::new(),
    );
    assert_eq!(found, vec![FormulaError::EqualityPredicateNotYetDefined.into()]);
}

#[test]
fn empty_operator() {
    assert_eq!(
        kinds("()", &AssumeAllExist),
        vec![ElementError::EmptyOperator.into()]
    );
}

#[test]
fn restricted_quantifiers_and_class_terms() {
    let found = kinds(
        "(FORALL (VAR x) (PREDVAR P (VAR x)) (PREDVAR Q (VAR x)))",
        &AssumeAllExist,
    );
    assert!(found.is_empty());

    let arena = ExprArena::new();
    let class = read_expr("(CLASS (VAR y) (PREDCON in (VAR y) (VAR z)))", &arena).unwrap();
    let diags = check_term(class.root, &ModuleContext::new("t"), &AssumeAllExist);
    assert!(diags.is_empty());
}

#[test]
fn equivalence_is_order_insensitive() {
    let arena = ExprArena::new();
    let a = read_expr("(OR (PREDVAR P) (PREDVAR Q) (PREDVAR R))", &arena).unwrap();
    let b = read_expr("(OR (PREDVAR R) (PREDVAR P) (PREDVAR Q))", &arena).unwrap();
    let c = read_expr("(OR (PREDVAR R) (PREDVAR P))", &arena).unwrap();

    let ctx = ModuleContext::new("t");
    assert!(check_equivalence(a.root, b.root, &ctx).is_ok());
    assert!(check_equivalence(a.root, c.root, &ctx).is_err());
}
