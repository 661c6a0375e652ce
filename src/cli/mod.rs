use crate::{
    cli::{
        check_command::{CheckCommand, run_check},
        equiv_command::{EquivCommand, run_equiv},
        formula_command::{FormulaCommand, run_formula},
        new_command::{NewCommand, run_new},
    },
    logging,
    util::ansi::{ANSI_BOLD, ANSI_RED, ANSI_RESET},
};
use argh::FromArgs;

mod check_command;
mod equiv_command;
mod formula_command;
mod new_command;

/// The wff formula checker.
#[derive(FromArgs)]
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    New(NewCommand),
    Check(CheckCommand),
    Formula(FormulaCommand),
    Equiv(EquivCommand),
}

pub fn run_cli() {
    let args: Args = argh::from_env();

    match args.command {
        Command::New(cmd) => run_new(cmd),
        Command::Check(cmd) => run_check(cmd),
        Command::Formula(cmd) => run_formula(cmd),
        Command::Equiv(cmd) => run_equiv(cmd),
    }
}

fn start_logging(config_filter: Option<&str>) {
    if let Err(err) = logging::init_logging(config_filter) {
        eprintln!("{ANSI_RED}{ANSI_BOLD}warning:{ANSI_RESET} {err}");
    }
}

fn exit_with_error(err: impl std::fmt::Display) -> ! {
    eprintln!("{ANSI_RED}{ANSI_BOLD}error:{ANSI_RESET} {err}");
    std::process::exit(1)
}
