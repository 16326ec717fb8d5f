use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config;

pub const ROOT_ENV: &str = "PICODULCE_ROOT";

pub fn self_path() -> Result<PathBuf> {
    std::env::current_exe().context("current_exe")
}

/// Directory the installer ships from; the bundle and license sit next to it.
pub fn root_dir() -> Result<PathBuf> {
    if let Ok(dev_root) = std::env::var(ROOT_ENV) {
        return Ok(PathBuf::from(dev_root));
    }
    let exe = self_path()?;
    Ok(exe.parent().context("exe has no parent")?.to_path_buf())
}

pub fn bundle_dir(root: &Path) -> PathBuf {
    root.join(config::BUNDLE_DIR)
}

pub fn license_path(root: &Path) -> PathBuf {
    root.join(config::LICENSE_FILE)
}

pub fn default_install_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("home directory not found")?;
    Ok(home.join(config::DEFAULT_DIR_NAME))
}

/// The launcher binary inside an install, `pds.exe` on Windows.
pub fn installed_exe(install_dir: &Path) -> PathBuf {
    install_dir.join(format!(
        "{}{}",
        config::TARGET_EXE,
        std::env::consts::EXE_SUFFIX
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn root_dir_prefers_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let prior = std::env::var(ROOT_ENV).ok();

        let tmp = tempfile::tempdir().unwrap();
        std::env::set_var(ROOT_ENV, tmp.path());
        let root = root_dir().unwrap();
        assert_eq!(root, tmp.path());

        if let Some(v) = prior {
            std::env::set_var(ROOT_ENV, v);
        } else {
            std::env::remove_var(ROOT_ENV);
        }
    }

    #[test]
    fn bundle_and_license_sit_next_to_root() {
        let root = PathBuf::from("/media/setup");
        assert_eq!(bundle_dir(&root), root.join(config::BUNDLE_DIR));
        assert_eq!(license_path(&root), root.join(config::LICENSE_FILE));
    }

    #[test]
    fn installed_exe_uses_platform_suffix() {
        let dest = PathBuf::from("/opt/picodulce");
        let exe = installed_exe(&dest);
        let name = exe.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(config::TARGET_EXE));
        assert_eq!(exe.parent(), Some(dest.as_path()));
        if cfg!(windows) {
            assert!(name.ends_with(".exe"));
        }
    }
}
