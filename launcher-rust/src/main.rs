mod config;
mod dialog;
mod fallback;
mod logging;
mod outcome;
mod paths;
mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use crate::runner::LaunchMode;

#[derive(Debug, Parser)]
#[command(name = "pds", version = config::VERSION, about = "Prepares the Python environment and starts the launcher")]
struct Args {
    /// Skip the dialog box; failures are still printed to stderr
    #[arg(long)]
    no_dialog: bool,

    /// Override the configured launch mode (staged or composed)
    #[arg(long, value_name = "MODE")]
    mode: Option<LaunchMode>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            dialog::report_startup(&err, !args.no_dialog);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let root = paths::root_dir()?;
    std::env::set_current_dir(&root)
        .with_context(|| format!("enter {}", root.display()))?;
    let log = logging::init_or_warn(&root, &mut std::io::stderr().lock());
    tracing::info!(
        version = config::VERSION,
        root = %root.display(),
        log = ?log.as_ref().map(|handle| handle.path.display().to_string()),
        "launcher starting"
    );

    let mode = args.mode.unwrap_or_else(LaunchMode::configured);
    let outcome = runner::run(&root, mode);
    if outcome.is_success() {
        tracing::info!("launch finished");
        return Ok(ExitCode::SUCCESS);
    }

    dialog::report(outcome, mode, !args.no_dialog);
    Ok(ExitCode::FAILURE)
}
