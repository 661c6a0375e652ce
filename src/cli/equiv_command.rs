use crate::{
    cli::{formula_command::read_snippet, start_logging},
    diagnostics::{DiagManager, Diagnostic},
    expr::ExprArena,
    semant::{ModuleContext, check_equivalence},
    span::{SourceCache, Span},
    util::ansi::{ANSI_BOLD, ANSI_GREEN, ANSI_RESET},
};
use argh::FromArgs;
use std::path::PathBuf;

/// Check whether two formulas are equivalent up to the order of conjuncts or
/// disjuncts.
#[derive(FromArgs)]
#[argh(subcommand, name = "equiv")]
pub struct EquivCommand {
    /// the first formula.
    #[argh(positional)]
    first: String,

    /// the second formula.
    #[argh(positional)]
    second: String,
}

pub fn run_equiv(cmd: EquivCommand) {
    start_logging(None);

    let arena = ExprArena::new();
    let mut sources = SourceCache::new(PathBuf::from("."));
    let diags = compare(&cmd.first, &cmd.second, &arena, &mut sources);

    if diags.has_errors() {
        diags.print_errors(&sources);
        std::process::exit(1)
    }
    println!("{ANSI_GREEN}{ANSI_BOLD}✓{ANSI_RESET} equivalent");
}

fn compare<'ctx>(
    first: &str,
    second: &str,
    arena: &'ctx ExprArena<'ctx>,
    sources: &mut SourceCache,
) -> DiagManager {
    let mut diags = DiagManager::new();
    let first = read_snippet(first, arena, sources, &mut diags);
    let second = read_snippet(second, arena, sources, &mut diags);
    let (Some((_, first)), Some((source, second))) = (first, second) else {
        return diags;
    };

    let context = ModuleContext::new("equiv");
    if let Err(diag) = check_equivalence(first.root, second.root, &context) {
        let span = second.spans.get(&[]).map(|range| Span::from_range(source, range));
        diags.add_diag(Diagnostic::from_check(&diag, span));
    }

    diags
}
