use crate::strings;
use rustc_hash::FxHashMap;
use std::fmt::{self, Display};
use thiserror::Error;
use ustr::Ustr;

/// Answers whether a constant is defined at the current point of elaboration.
///
/// Implementations must be consistent: when `identity_operator_exists()`
/// holds, `identity_operator()` names a predicate for which
/// `predicate_exists(name, 2)` holds.
pub trait ExistenceOracle {
    fn predicate_exists(&self, name: Ustr, arity: usize) -> bool;
    fn function_exists(&self, name: Ustr, arity: usize) -> bool;
    fn class_operator_exists(&self) -> bool;
    fn identity_operator_exists(&self) -> bool;
    fn identity_operator(&self) -> Option<Ustr>;
}

/// Treats every constant as defined. Used for pure syntax checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeAllExist;

impl ExistenceOracle for AssumeAllExist {
    fn predicate_exists(&self, _name: Ustr, _arity: usize) -> bool {
        true
    }

    fn function_exists(&self, _name: Ustr, _arity: usize) -> bool {
        true
    }

    fn class_operator_exists(&self) -> bool {
        true
    }

    fn identity_operator_exists(&self) -> bool {
        true
    }

    fn identity_operator(&self) -> Option<Ustr> {
        Some(*strings::EQUAL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantKind {
    Predicate,
    Function,
}

impl Display for ConstantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantKind::Predicate => write!(f, "predicate"),
            ConstantKind::Function => write!(f, "function"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("{kind} `{name}` with arity {arity} is already defined by `{previous}`")]
    AlreadyDefined {
        kind: ConstantKind,
        name: Ustr,
        arity: usize,
        previous: Ustr,
    },
    #[error("identity operator `{0}` must be a defined predicate with arity 2")]
    IdentityNotBinaryPredicate(Ustr),
    #[error("identity operator already set to `{0}`")]
    IdentityAlreadySet(Ustr),
}

/// The constants a module has defined so far, each mapped to the label of
/// the node that defined it. Grows in declaration order.
#[derive(Debug, Clone, Default)]
pub struct DefinitionTable {
    predicates: FxHashMap<(Ustr, usize), Ustr>,
    functions: FxHashMap<(Ustr, usize), Ustr>,
    identity: Option<Ustr>,
    class_operator: Option<Ustr>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_predicate(
        &mut self,
        name: Ustr,
        arity: usize,
        label: Ustr,
    ) -> Result<(), DefinitionError> {
        Self::define(&mut self.predicates, ConstantKind::Predicate, name, arity, label)
    }

    pub fn define_function(
        &mut self,
        name: Ustr,
        arity: usize,
        label: Ustr,
    ) -> Result<(), DefinitionError> {
        Self::define(&mut self.functions, ConstantKind::Function, name, arity, label)
    }

    fn define(
        map: &mut FxHashMap<(Ustr, usize), Ustr>,
        kind: ConstantKind,
        name: Ustr,
        arity: usize,
        label: Ustr,
    ) -> Result<(), DefinitionError> {
        if let Some(&previous) = map.get(&(name, arity)) {
            return Err(DefinitionError::AlreadyDefined {
                kind,
                name,
                arity,
                previous,
            });
        }
        map.insert((name, arity), label);
        Ok(())
    }

    /// Declares the identity operator. The 2-ary predicate must already be
    /// defined, which keeps the table a consistent oracle.
    pub fn set_identity_operator(&mut self, name: Ustr) -> Result<(), DefinitionError> {
        if let Some(existing) = self.identity {
            return Err(DefinitionError::IdentityAlreadySet(existing));
        }
        if !self.predicates.contains_key(&(name, 2)) {
            return Err(DefinitionError::IdentityNotBinaryPredicate(name));
        }
        self.identity = Some(name);
        Ok(())
    }

    pub fn set_class_operator(&mut self, label: Ustr) {
        self.class_operator.get_or_insert(label);
    }

    pub fn predicate_definition(&self, name: Ustr, arity: usize) -> Option<Ustr> {
        self.predicates.get(&(name, arity)).copied()
    }

    pub fn function_definition(&self, name: Ustr, arity: usize) -> Option<Ustr> {
        self.functions.get(&(name, arity)).copied()
    }
}

impl ExistenceOracle for DefinitionTable {
    fn predicate_exists(&self, name: Ustr, arity: usize) -> bool {
        self.predicates.contains_key(&(name, arity))
    }

    fn function_exists(&self, name: Ustr, arity: usize) -> bool {
        self.functions.contains_key(&(name, arity))
    }

    fn class_operator_exists(&self) -> bool {
        self.class_operator.is_some()
    }

    fn identity_operator_exists(&self) -> bool {
        self.identity.is_some()
    }

    fn identity_operator(&self) -> Option<Ustr> {
        self.identity
    }
}

/// What a module can see: its own definitions followed by those of the
/// modules it imports directly.
#[derive(Debug, Clone, Copy)]
pub struct ModuleScope<'a> {
    local: &'a DefinitionTable,
    imports: &'a [&'a DefinitionTable],
}

impl<'a> ModuleScope<'a> {
    pub fn new(local: &'a DefinitionTable, imports: &'a [&'a DefinitionTable]) -> Self {
        Self { local, imports }
    }

    fn tables(&self) -> impl Iterator<Item = &'a DefinitionTable> {
        std::iter::once(self.local).chain(self.imports.iter().copied())
    }
}

impl ExistenceOracle for ModuleScope<'_> {
    fn predicate_exists(&self, name: Ustr, arity: usize) -> bool {
        self.tables().any(|t| t.predicate_exists(name, arity))
    }

    fn function_exists(&self, name: Ustr, arity: usize) -> bool {
        self.tables().any(|t| t.function_exists(name, arity))
    }

    fn class_operator_exists(&self) -> bool {
        self.tables().any(|t| t.class_operator_exists())
    }

    fn identity_operator_exists(&self) -> bool {
        self.identity_operator().is_some()
    }

    fn identity_operator(&self) -> Option<Ustr> {
        self.tables().find_map(|t| t.identity_operator())
    }
}
