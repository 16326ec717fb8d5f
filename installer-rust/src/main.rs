mod config;
mod frontend;
mod fs_ops;
mod installer;
mod license;
mod logging;
mod paths;
mod shortcuts;
mod wizard;

use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use std::{path::PathBuf, process::ExitCode};

use crate::{
    frontend::{ConsoleLog, UnattendedOptions},
    wizard::Wizard,
};

#[derive(Debug, Parser)]
#[command(
    name = "picodulce-installer",
    version = config::VERSION,
    about = "Installs the PicoDulce Launcher"
)]
struct Args {
    /// Installation directory (defaults to ~/picodulce)
    #[arg(long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Accept the license terms without being asked
    #[arg(long)]
    accept_license: bool,

    /// Skip the desktop shortcut
    #[arg(long)]
    no_desktop_shortcut: bool,

    /// Skip the start menu entry
    #[arg(long)]
    no_start_menu: bool,

    /// Run without prompts; requires --accept-license
    #[arg(long, short = 'y')]
    yes: bool,
}

impl Args {
    fn unattended_options(&self) -> UnattendedOptions {
        UnattendedOptions {
            accept_license: self.accept_license,
            destination: self.dest.clone(),
            desktop_shortcut: !self.no_desktop_shortcut,
            start_menu: !self.no_start_menu,
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let root = paths::root_dir()?;
    let log = logging::init(&logging::default_logs_dir())?;
    tracing::info!(
        version = config::VERSION,
        root = %root.display(),
        log = %log.path.display(),
        "installer starting"
    );

    let default_dest = match &args.dest {
        Some(dest) => dest.clone(),
        None => paths::default_install_dir()?,
    };
    let mut wizard = Wizard::new(default_dest);

    if args.yes {
        frontend::run_unattended(&mut wizard, &args.unattended_options())
            .context("unattended install")?;
    } else {
        let license_text = license::load(&root);
        if !frontend::run_interactive(&mut wizard, &license_text)? {
            println!("Installation cancelled.");
            return Ok(ExitCode::FAILURE);
        }
    }

    let choice = wizard
        .take_choice()
        .context("wizard reached install without a choice")?;
    let mut screen_log = ConsoleLog::new();
    let ok = installer::run(&root, &choice, &mut screen_log);
    wizard.finish()?;

    if !args.yes {
        println!("Press Enter to close.");
        let _ = Term::stdout().read_line();
    }

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
