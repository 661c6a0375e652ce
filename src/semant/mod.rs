pub mod check_error;
pub mod check_formula;
pub mod equivalence;
pub mod existence;
pub mod module;
pub mod module_context;
pub mod variables;

pub use check_error::{
    Arity, CheckDiagnostic, ElementError, ErrorKind, FormulaError, TermError, VariableClash,
};
pub use check_formula::{
    ErrorPolicy, FormulaChecker, check_formula, check_formula_syntax, check_term,
    check_term_syntax,
};
pub use equivalence::check_equivalence;
pub use existence::{AssumeAllExist, DefinitionError, DefinitionTable, ExistenceOracle, ModuleScope};
pub use module::{
    ModuleReport, NodeKind, NodeStatus, check_module, check_module_file, check_module_files,
};
pub use module_context::{ModuleContext, PathStep};
pub use variables::{VariableSet, bound_variables, free_variables};
