use crate::{
    cli::{exit_with_error, start_logging},
    config::{ConfigError, WffConfig, find_config_file},
    context::Ctx,
    expr::ExprArena,
    report::display_report,
    semant::{ModuleReport, check_module_files},
    span::SourceCache,
};
use argh::FromArgs;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use notify::Watcher;
use std::{env, io, path::PathBuf, sync::mpsc};

/// Check the module documents of a wff project.
#[derive(FromArgs)]
#[argh(subcommand, name = "check")]
pub struct CheckCommand {
    /// continually recheck on file changes.
    #[argh(switch, short = 'w')]
    watch: bool,

    /// path to wff.toml config file.
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// assume every predicate and function constant is defined.
    #[argh(switch)]
    syntax_only: bool,

    /// report only the first problem of each expression.
    #[argh(switch)]
    fail_fast: bool,

    /// module files to check instead of the configured ones, in order.
    #[argh(positional)]
    files: Vec<PathBuf>,
}

pub fn run_check(cmd: CheckCommand) {
    let config = load_config(&cmd).unwrap_or_else(|err| exit_with_error(err));
    start_logging(config.log_filter());

    if cmd.watch {
        watch(&config);
    } else {
        let arenas = ExprArena::new();
        let (ctx, reports) = check(&config, &arenas);

        let all_ok = display_report(&reports, None);
        if ctx.diags.has_errors() {
            ctx.diags.print_errors(&ctx.sources);
        }
        if !all_ok || ctx.diags.has_errors() {
            std::process::exit(1)
        }
    }
}

fn load_config(cmd: &CheckCommand) -> Result<WffConfig, ConfigError> {
    let mut config = match &cmd.config {
        Some(path) => WffConfig::from_file(path)?,
        None => match find_config_file() {
            Ok(path) => WffConfig::from_file(&path)?,
            Err(ConfigError::NotFound) if !cmd.files.is_empty() => {
                let dir = env::current_dir().map_err(|e| ConfigError::Io(PathBuf::from("."), e))?;
                WffConfig::in_dir(dir)
            }
            Err(err) => return Err(err),
        },
    };

    if !cmd.files.is_empty() {
        config.set_modules(cmd.files.clone());
    }
    config.set_syntax_only(cmd.syntax_only);
    config.set_fail_fast(cmd.fail_fast);

    Ok(config)
}

fn watch(config: &WffConfig) {
    let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();
    let mut watcher = notify::recommended_watcher(tx).unwrap_or_else(|err| exit_with_error(err));
    watcher
        .watch(config.project_dir(), notify::RecursiveMode::Recursive)
        .unwrap_or_else(|err| exit_with_error(err));

    for i in 1.. {
        let _ = rx.try_iter().count();
        let arenas = ExprArena::new();
        let (ctx, reports) = check(config, &arenas);

        // Clear the screen to print the new info
        _ = execute!(io::stdout(), Clear(ClearType::Purge), MoveTo(0, 0));

        display_report(&reports, Some(i));
        if ctx.diags.has_errors() {
            ctx.diags.print_errors(&ctx.sources);
        }

        loop {
            match rx.recv() {
                Ok(Ok(event)) if matches!(event.kind, notify::EventKind::Access(_)) => {}
                Ok(Ok(_)) => break,
                Ok(Err(err)) => tracing::warn!(%err, "file watcher error"),
                Err(_) => return,
            }
        }
    }
}

pub fn check<'ctx>(
    config: &WffConfig,
    arenas: &'ctx ExprArena<'ctx>,
) -> (Ctx<'ctx>, Vec<ModuleReport>) {
    let sources = SourceCache::new(config.project_dir().to_path_buf());
    let mut ctx = Ctx::new(sources, arenas, config.options());
    let reports = check_module_files(config.modules(), &mut ctx);
    tracing::info!(
        modules = reports.len(),
        diagnostics = ctx.diags.len(),
        "check finished"
    );
    (ctx, reports)
}
