use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config;

pub const ROOT_ENV: &str = "PICODULCE_ROOT";

pub fn self_path() -> Result<PathBuf> {
    std::env::current_exe().context("current_exe")
}

/// Directory holding the manifest, the main script and the venv.
pub fn root_dir() -> Result<PathBuf> {
    if let Ok(dev_root) = std::env::var(ROOT_ENV) {
        return Ok(PathBuf::from(dev_root));
    }
    let exe = self_path()?;
    Ok(exe.parent().context("exe has no parent")?.to_path_buf())
}

pub fn requirements_path(root: &Path) -> PathBuf {
    root.join(config::REQUIREMENTS_FILE)
}

pub fn script_path(root: &Path) -> PathBuf {
    root.join(config::MAIN_SCRIPT)
}

pub fn venv_dir(root: &Path) -> PathBuf {
    root.join(config::VENV_DIR)
}

pub fn venv_bin_dir(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts")
    } else {
        venv.join("bin")
    }
}

pub fn venv_python(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_bin_dir(venv).join("python.exe")
    } else {
        venv_bin_dir(venv).join("python")
    }
}

pub fn activate_script(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_bin_dir(venv).join("activate.bat")
    } else {
        venv_bin_dir(venv).join("activate")
    }
}
