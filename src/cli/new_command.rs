use crate::{
    cli::exit_with_error,
    strings,
    util::ansi::{ANSI_BOLD, ANSI_GREEN, ANSI_RESET},
};
use argh::FromArgs;
use std::{fs, path::Path};

/// Create a new wff project.
#[derive(FromArgs)]
#[argh(subcommand, name = "new")]
pub struct NewCommand {
    /// the name of the project to create
    #[argh(positional)]
    name: String,
}

const CONFIG_CONTENT: &str = r#"[check]
modules = ["logic.toml"]

[log]
filter = "warn"
"#;

const LOGIC_CONTENT: &str = r#"[module]
name = "logic"

[[node]]
kind = "predicate"
label = "defEqual"
name = "equal"
parameters = ["x", "y"]
identity = true

[[node]]
kind = "axiom"
label = "reflexivity"
formula = "(FORALL (VAR x) (PREDCON equal (VAR x) (VAR x)))"

[[node]]
kind = "proposition"
label = "uniqueSelf"
formula = "(FORALL (VAR x) (EXISTSU (VAR y) (PREDCON equal (VAR y) (VAR x))))"
"#;

pub fn run_new(cmd: NewCommand) {
    let project_path = Path::new(&cmd.name);

    if project_path.exists() {
        exit_with_error(format!("directory '{}' already exists", cmd.name));
    }
    if let Err(err) = scaffold(project_path) {
        exit_with_error(format!("creating project '{}': {err}", cmd.name));
    }

    println!(
        "{ANSI_GREEN}{ANSI_BOLD}Created{ANSI_RESET} wff project '{}'",
        cmd.name
    );
}

fn scaffold(project_path: &Path) -> Result<(), std::io::Error> {
    fs::create_dir(project_path)?;
    fs::write(
        project_path.join(strings::CONFIG_FILE_NAME.as_str()),
        CONFIG_CONTENT,
    )?;
    fs::write(project_path.join("logic.toml"), LOGIC_CONTENT)?;
    Ok(())
}
