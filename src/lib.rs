//! Well-formedness checking of first-order formulas and terms written as
//! S-expressions, either one at a time or as module documents whose
//! definitions build on each other.

pub mod cli;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod expr;
pub mod logging;
pub mod report;
pub mod semant;
pub mod span;
pub mod strings;
pub mod util;

pub use context::{CheckOptions, Ctx};
pub use expr::{Expr, ExprArena, Operator, read_expr};
