use crate::{
    cli::start_logging,
    diagnostics::{DiagManager, Diagnostic},
    expr::{ExprArena, ParsedExpr, read_expr},
    semant::{ModuleContext, check_formula_syntax, check_term_syntax},
    span::{SourceCache, SourceId, Span},
    util::ansi::{ANSI_BOLD, ANSI_GREEN, ANSI_RESET},
};
use argh::FromArgs;
use std::path::PathBuf;

/// Check the syntax of a single formula or term.
#[derive(FromArgs)]
#[argh(subcommand, name = "formula")]
pub struct FormulaCommand {
    /// check the text as a term instead of a formula.
    #[argh(switch)]
    term: bool,

    /// the expression, written as an S-expression.
    #[argh(positional)]
    text: String,
}

pub fn run_formula(cmd: FormulaCommand) {
    start_logging(None);

    let arena = ExprArena::new();
    let mut sources = SourceCache::new(PathBuf::from("."));
    let diags = check_text(&cmd.text, cmd.term, &arena, &mut sources);

    if diags.has_errors() {
        diags.print_errors(&sources);
        std::process::exit(1)
    }
    let what = if cmd.term { "term" } else { "formula" };
    println!("{ANSI_GREEN}{ANSI_BOLD}✓{ANSI_RESET} well-formed {what}");
}

/// Adds `text` to the cache as a fresh snippet and reads it.
pub(super) fn read_snippet<'ctx>(
    text: &str,
    arena: &'ctx ExprArena<'ctx>,
    sources: &mut SourceCache,
    diags: &mut DiagManager,
) -> Option<(SourceId, ParsedExpr<'ctx>)> {
    let source = SourceId::new_snippet();
    sources.add(source, text.to_string());

    match read_expr(text, arena) {
        Ok(parsed) => Some((source, parsed)),
        Err(err) => {
            diags.add_diag(Diagnostic::err_expr_syntax(&err, Span::new(source, 0, 0)));
            None
        }
    }
}

fn check_text<'ctx>(
    text: &str,
    as_term: bool,
    arena: &'ctx ExprArena<'ctx>,
    sources: &mut SourceCache,
) -> DiagManager {
    let mut diags = DiagManager::new();
    let Some((source, parsed)) = read_snippet(text, arena, sources, &mut diags) else {
        return diags;
    };

    let context = ModuleContext::new(source.name().as_str());
    let found = if as_term {
        check_term_syntax(parsed.root, &context)
    } else {
        check_formula_syntax(parsed.root, &context)
    };
    for diag in &found {
        let span = parsed
            .spans
            .get(&diag.context().expr_path())
            .map(|range| Span::from_range(source, range));
        diags.add_diag(Diagnostic::from_check(diag, span));
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_problems_with_spans() {
        let arena = ExprArena::new();
        let mut sources = SourceCache::new(PathBuf::from("."));
        let text = "(FORALL (VAR x) (EXISTS (VAR x) (PREDVAR P)))";

        let diags = check_text(text, false, &arena, &mut sources);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.diags()[0].code(), Some("9206"));
        let crate::diagnostics::DiagnosticPart::Error(_, span) = &diags.diags()[0].parts()[0] else {
            panic!("expected an error part");
        };
        assert_eq!(&text[span.bytes()], "(EXISTS (VAR x) (PREDVAR P))");
    }

    #[test]
    fn terms_and_read_errors() {
        let arena = ExprArena::new();
        let mut sources = SourceCache::new(PathBuf::from("."));

        assert!(!check_text("(FUNCON zero)", true, &arena, &mut sources).has_errors());
        assert!(check_text("(FUNCON zero)", false, &arena, &mut sources).has_errors());

        let diags = check_text("(AND (PREDVAR P)", false, &arena, &mut sources);
        assert_eq!(diags.diags()[0].title(), "malformed expression");
    }

    #[test]
    fn deep_nesting_is_a_read_error() {
        let arena = ExprArena::new();
        let mut sources = SourceCache::new(PathBuf::from("."));
        let text = format!("{}(PREDVAR P){}", "(NOT ".repeat(100_000), ")".repeat(100_000));

        let diags = check_text(&text, false, &arena, &mut sources);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.diags()[0].title(), "malformed expression");
    }
}
