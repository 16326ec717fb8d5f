use serde::Deserialize;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[derive(Debug, Deserialize)]
#[cfg_attr(not(windows), allow(dead_code))]
struct Config {
    app_id: String,
    product_name: String,
    company: String,
    description: String,
    version: String,
    #[serde(default)]
    icon: String,
    launcher: LauncherSection,
}

#[derive(Debug, Deserialize)]
struct LauncherSection {
    runtime_candidates: Vec<String>,
    requirements_file: String,
    main_script: String,
    venv_dir: String,
    venv_scripts_windows: Vec<String>,
    venv_scripts_unix: Vec<String>,
    #[serde(default = "default_launch_mode")]
    launch_mode: String,
}

fn default_launch_mode() -> String {
    "staged".to_string()
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let repo_root = PathBuf::from(manifest_dir).join("..");
    let config = load_config(&repo_root).unwrap_or_else(|err| {
        panic!("failed to load config.toml: {err}");
    });

    if !matches!(config.launcher.launch_mode.as_str(), "staged" | "composed") {
        panic!(
            "launcher.launch_mode must be \"staged\" or \"composed\", got {:?}",
            config.launcher.launch_mode
        );
    }
    if config.launcher.runtime_candidates.is_empty() {
        panic!("launcher.runtime_candidates must not be empty");
    }

    if let Err(err) = embed_icon(&repo_root, &config) {
        panic!("failed to embed icon: {err}");
    }

    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if let Err(err) = write_config_rs(
        &PathBuf::from(std::env::var("OUT_DIR").unwrap()),
        &config,
        target_os == "windows",
    ) {
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
    if !config.product_name.is_empty() {
        res.set("ProductName", &config.product_name);
    }
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

fn write_str_list(file: &mut fs::File, name: &str, values: &[String]) -> io::Result<()> {
    let items: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
    writeln!(file, "pub const {name}: &[&str] = &[{}];", items.join(", "))
}

fn write_config_rs(out_dir: &Path, config: &Config, windows: bool) -> io::Result<()> {
    let out_path = out_dir.join("launcher_config.rs");
    let mut file = fs::File::create(&out_path)?;
    let launcher = &config.launcher;
    writeln!(file, "pub const PRODUCT_NAME: &str = {:?};", config.product_name)?;
    writeln!(file, "pub const VERSION: &str = {:?};", config.version)?;
    write_str_list(&mut file, "RUNTIME_CANDIDATES", &launcher.runtime_candidates)?;
    writeln!(file, "pub const REQUIREMENTS_FILE: &str = {:?};", launcher.requirements_file)?;
    writeln!(file, "pub const MAIN_SCRIPT: &str = {:?};", launcher.main_script)?;
    writeln!(file, "pub const VENV_DIR: &str = {:?};", launcher.venv_dir)?;
    let scripts = if windows {
        &launcher.venv_scripts_windows
    } else {
        &launcher.venv_scripts_unix
    };
    write_str_list(&mut file, "VENV_SCRIPTS", scripts)?;
    writeln!(file, "pub const LAUNCH_MODE: &str = {:?};", launcher.launch_mode)?;
    Ok(())
}
