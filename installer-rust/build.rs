use serde::Deserialize;
use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

#[derive(Debug, Deserialize)]
#[cfg_attr(not(windows), allow(dead_code))]
struct Config {
    app_id: String,
    name: String,
    product_name: String,
    company: String,
    description: String,
    version: String,
    #[serde(default)]
    icon: String,
    installer: InstallerSection,
}

#[derive(Debug, Deserialize)]
struct InstallerSection {
    bundle_dir: String,
    license_file: String,
    default_dir_name: String,
    target_exe: String,
    shortcut_name: String,
}

fn main() {
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR not set");
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let repo_root = PathBuf::from(manifest_dir).join("..");
    let config = load_config(&repo_root).unwrap_or_else(|err| {
        panic!("failed to load config.toml: {err}");
    });

    if let Err(err) = validate(&config) {
        panic!("invalid config.toml: {err}");
    }

    if let Err(err) = embed_icon(&repo_root, &config) {
        panic!("failed to embed icon: {err}");
    }

    if let Err(err) = write_config_rs(&PathBuf::from(&out_dir), &config) {
        panic!("failed to write config: {err}");
    }
}

fn load_config(repo_root: &Path) -> io::Result<Config> {
    let config_path = repo_root.join("config.toml");
    println!("cargo:rerun-if-changed={}", config_path.display());
    let contents = fs::read_to_string(&config_path)?;
    let cfg: Config = toml::from_str(&contents)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok(cfg)
}

fn validate(config: &Config) -> io::Result<()> {
    for (key, value) in [
        ("name", &config.name),
        ("product_name", &config.product_name),
        ("installer.bundle_dir", &config.installer.bundle_dir),
        ("installer.default_dir_name", &config.installer.default_dir_name),
        ("installer.target_exe", &config.installer.target_exe),
        ("installer.shortcut_name", &config.installer.shortcut_name),
    ] {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{key} is required"),
            ));
        }
    }
    Ok(())
}

#[cfg(not(windows))]
fn embed_icon(_repo_root: &Path, _config: &Config) -> io::Result<()> {
    Ok(())
}

#[cfg(windows)]
fn embed_icon(repo_root: &Path, config: &Config) -> io::Result<()> {
    let mut res = winres::WindowsResource::new();
    if !config.icon.is_empty() {
        let icon_path = repo_root.join(&config.icon);
        if icon_path.exists() {
            res.set_icon(icon_path.to_string_lossy().as_ref());
        }
    }
    res.set("ProductName", &format!("{} Installer", config.product_name));
    if !config.description.is_empty() {
        res.set("FileDescription", &config.description);
    }
    if !config.company.is_empty() {
        res.set("CompanyName", &config.company);
    }
    if !config.version.is_empty() {
        res.set("FileVersion", &config.version);
        res.set("ProductVersion", &config.version);
    }
    if !config.app_id.is_empty() {
        res.set("InternalName", &config.app_id);
    }
    res.compile()?;
    Ok(())
}

fn write_config_rs(out_dir: &Path, config: &Config) -> io::Result<()> {
    let out_path = out_dir.join("installer_config.rs");
    let mut file = File::create(&out_path)?;
    let installer = &config.installer;
    writeln!(file, "pub const PRODUCT_NAME: &str = {:?};", config.product_name)?;
    writeln!(file, "pub const VERSION: &str = {:?};", config.version)?;
    writeln!(file, "pub const BUNDLE_DIR: &str = {:?};", installer.bundle_dir)?;
    writeln!(file, "pub const LICENSE_FILE: &str = {:?};", installer.license_file)?;
    writeln!(file, "pub const DEFAULT_DIR_NAME: &str = {:?};", installer.default_dir_name)?;
    writeln!(file, "pub const TARGET_EXE: &str = {:?};", installer.target_exe)?;
    writeln!(file, "pub const SHORTCUT_NAME: &str = {:?};", installer.shortcut_name)?;
    Ok(())
}
