use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{
    config, fs_ops, paths,
    shortcuts::{self, Shortcut, ShortcutKind},
    wizard::InstallationChoice,
};

/// Append-only log shown on the Installing screen.
pub trait InstallLog {
    fn line(&mut self, message: &str);
}

impl InstallLog for Vec<String> {
    fn line(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Please select a directory for installation.")]
    EmptyDestination,
    #[error("\"{0}\" folder not found.")]
    BundleMissing(String),
}

pub fn run(root: &Path, choice: &InstallationChoice, log: &mut impl InstallLog) -> bool {
    run_with_deps(&paths::bundle_dir(root), choice, log, shortcuts::create)
}

/// Runs the install step and reports through `log`. Returns whether it
/// completed; nothing is rolled back on failure.
pub fn run_with_deps(
    bundle: &Path,
    choice: &InstallationChoice,
    log: &mut impl InstallLog,
    create_shortcut_fn: impl FnMut(ShortcutKind, &Shortcut) -> Result<PathBuf>,
) -> bool {
    tracing::info!(
        bundle = %bundle.display(),
        dest = %choice.destination_directory.display(),
        desktop = choice.create_desktop_shortcut,
        start_menu = choice.add_to_start_menu,
        "starting install"
    );
    match install(bundle, choice, log, create_shortcut_fn) {
        Ok(()) => {
            log.line("Installation completed successfully.");
            true
        }
        Err(err) => {
            tracing::error!("install failed: {err:#}");
            match err.downcast_ref::<InstallError>() {
                Some(known) => log.line(&format!("Error: {known}")),
                None => log.line(&format!("Error: Failed to install: {err:#}")),
            }
            false
        }
    }
}

fn install(
    bundle: &Path,
    choice: &InstallationChoice,
    log: &mut impl InstallLog,
    mut create_shortcut_fn: impl FnMut(ShortcutKind, &Shortcut) -> Result<PathBuf>,
) -> Result<()> {
    let dest = &choice.destination_directory;
    if dest.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(InstallError::EmptyDestination.into());
    }

    log.line("Creating installation directory...");
    fs::create_dir_all(dest).with_context(|| format!("create {}", dest.display()))?;

    if !bundle.is_dir() {
        return Err(InstallError::BundleMissing(config::BUNDLE_DIR.to_string()).into());
    }

    log.line(&format!("Copying files to {}...", dest.display()));
    for source in fs_ops::top_level_entries(bundle)? {
        let name = source
            .file_name()
            .context("bundle entry has no name")?
            .to_os_string();
        let target = dest.join(&name);
        let name = name.to_string_lossy();
        if source.is_dir() {
            log.line(&format!("Copying directory {name}..."));
            let files = fs_ops::copy_dir_all(&source, &target)?;
            tracing::debug!(%name, files, "directory copied");
        } else {
            log.line(&format!("Copying file {name}..."));
            fs_ops::copy_file_atomic(&source, &target)?;
        }
    }

    let shortcut = Shortcut::for_install(dest);
    if choice.create_desktop_shortcut {
        log.line("Creating desktop shortcut...");
        create_shortcut_fn(ShortcutKind::Desktop, &shortcut)?;
    }
    if choice.add_to_start_menu {
        log.line("Adding to Start Menu...");
        create_shortcut_fn(ShortcutKind::StartMenu, &shortcut)?;
    }
    Ok(())
}
