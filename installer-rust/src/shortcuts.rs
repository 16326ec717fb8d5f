use anyhow::{bail, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{config, paths};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKind {
    Desktop,
    StartMenu,
}

/// A launcher entry pointing at the installed executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub name: String,
    pub target: PathBuf,
    pub working_dir: PathBuf,
}

impl Shortcut {
    pub fn for_install(install_dir: &Path) -> Self {
        Self {
            name: config::SHORTCUT_NAME.to_string(),
            target: paths::installed_exe(install_dir),
            working_dir: install_dir.to_path_buf(),
        }
    }
}

pub fn default_desktop_dir() -> Result<PathBuf> {
    if let Some(dir) = dirs::desktop_dir() {
        return Ok(dir);
    }
    let home = dirs::home_dir().context("home directory not found")?;
    Ok(home.join("Desktop"))
}

pub fn default_start_menu_dir() -> Result<PathBuf> {
    let data = dirs::data_dir().context("user data directory not found")?;
    if cfg!(windows) {
        Ok(data
            .join("Microsoft")
            .join("Windows")
            .join("Start Menu")
            .join("Programs"))
    } else {
        Ok(data.join("applications"))
    }
}

pub fn shortcut_path(dir: &Path, name: &str) -> Result<PathBuf> {
    if name.is_empty() {
        bail!("shortcut name is empty");
    }
    let ext = if cfg!(windows) { "lnk" } else { "desktop" };
    Ok(dir.join(format!("{name}.{ext}")))
}

pub fn create(kind: ShortcutKind, shortcut: &Shortcut) -> Result<PathBuf> {
    let dir = match kind {
        ShortcutKind::Desktop => default_desktop_dir()?,
        ShortcutKind::StartMenu => default_start_menu_dir()?,
    };
    let path = create_shortcut(&dir, shortcut)?;
    tracing::info!(?kind, path = %path.display(), "shortcut created");
    Ok(path)
}

pub fn create_shortcut(dir: &Path, shortcut: &Shortcut) -> Result<PathBuf> {
    let path = shortcut_path(dir, &shortcut.name)?;
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    write_shortcut(&path, shortcut)?;
    Ok(path)
}

#[cfg(windows)]
fn write_shortcut(lnk_path: &Path, shortcut: &Shortcut) -> Result<()> {
    use std::process::Command;

    let lnk = ps_quote(&lnk_path.display().to_string());
    let tgt = ps_quote(&shortcut.target.display().to_string());
    let wd = ps_quote(&shortcut.working_dir.display().to_string());

    let script = format!(
        "$WshShell = New-Object -ComObject WScript.Shell; \
         $Shortcut = $WshShell.CreateShortcut({lnk}); \
         $Shortcut.TargetPath = {tgt}; \
         $Shortcut.WorkingDirectory = {wd}; \
         $Shortcut.Save();"
    );

    let status = Command::new("powershell")
        .arg("-NoProfile")
        .arg("-Command")
        .arg(script)
        .status()
        .context("run powershell")?;

    if !status.success() {
        bail!("failed to create shortcut (exit {:?})", status.code());
    }
    Ok(())
}

#[cfg(windows)]
fn ps_quote(value: &str) -> String {
    let escaped = value.replace('\'', "''");
    format!("'{}'", escaped)
}

#[cfg(not(windows))]
fn write_shortcut(path: &Path, shortcut: &Shortcut) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, desktop_entry(shortcut))
        .with_context(|| format!("write {}", path.display()))?;
    // Desktop environments refuse to launch entries that are not executable.
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod {}", path.display()))?;
    Ok(())
}

#[cfg(not(windows))]
fn desktop_entry(shortcut: &Shortcut) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name={name}\n\
         Exec=\"{exec}\"\n\
         Path={dir}\n\
         Terminal=false\n",
        name = shortcut.name,
        exec = shortcut.target.display(),
        dir = shortcut.working_dir.display(),
    )
}
