use crate::{
    semant::ModuleReport,
    util::{
        ansi::{ANSI_BOLD, ANSI_GRAY, ANSI_GREEN, ANSI_RED, ANSI_RESET},
        plural,
    },
};
use std::fmt::Write;

/// Renders the summary of a check. `iteration` is set in watch mode.
pub fn format_report(reports: &[ModuleReport], iteration: Option<usize>) -> String {
    let mut out = String::new();

    let node_count: usize = reports.iter().map(|r| r.nodes.len()).sum();
    let _ = write!(
        out,
        "Checked {} module{} ({} node{})",
        reports.len(),
        plural(reports.len()),
        node_count,
        plural(node_count),
    );
    if let Some(i) = iteration {
        let _ = write!(out, " {ANSI_GRAY}[run {i}]{ANSI_RESET}");
    }
    out.push_str(":\n");

    for report in reports {
        let failing = report.nodes.iter().filter(|n| !n.is_ok()).count();
        let errors = report.error_count();
        if errors == 0 {
            let _ = writeln!(
                out,
                " {ANSI_GREEN}✓{ANSI_RESET} {ANSI_BOLD}{}{ANSI_RESET}",
                report.name
            );
            continue;
        }

        let _ = writeln!(
            out,
            " {ANSI_RED}✗{ANSI_RESET} {ANSI_BOLD}{}{ANSI_RESET}: {errors} error{} in {failing} node{}",
            report.name,
            plural(errors),
            plural(failing),
        );
        for node in report.nodes.iter().filter(|n| !n.is_ok()) {
            let _ = writeln!(
                out,
                "     - {} {} ({} error{})",
                node.kind,
                node.label,
                node.errors,
                plural(node.errors)
            );
        }
    }

    if reports.iter().all(ModuleReport::is_ok) {
        let _ = write!(out, "\nAll nodes well-formed.\n");
    }

    out
}

/// Prints the summary. Returns whether everything was well-formed.
pub fn display_report(reports: &[ModuleReport], iteration: Option<usize>) -> bool {
    print!("{}", format_report(reports, iteration));
    reports.iter().all(ModuleReport::is_ok)
}
