use anyhow::{bail, Context, Result};
use std::{
    ffi::OsString,
    path::Path,
    process::{Command, ExitStatus, Stdio},
    str::FromStr,
};
use thiserror::Error;

use crate::{config, fallback, outcome::BootstrapOutcome, paths};

/// How the activate/install/run tail of the chain is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Three separate steps, each with its own failure code.
    Staged,
    /// One shell command; any failure reports `VenvActivateFailed`.
    Composed,
}

#[derive(Debug, Error)]
#[error("unknown launch mode {0:?} (expected \"staged\" or \"composed\")")]
pub struct UnknownLaunchMode(String);

impl FromStr for LaunchMode {
    type Err = UnknownLaunchMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staged" => Ok(LaunchMode::Staged),
            "composed" => Ok(LaunchMode::Composed),
            _ => Err(UnknownLaunchMode(s.to_string())),
        }
    }
}

impl LaunchMode {
    pub fn configured() -> Self {
        config::LAUNCH_MODE.parse().unwrap_or(LaunchMode::Staged)
    }
}

pub fn run(root: &Path, mode: LaunchMode) -> BootstrapOutcome {
    run_with_executor(root, mode, |cmd| cmd.status().context("spawn command"))
}

pub fn run_with_executor(
    root: &Path,
    mode: LaunchMode,
    mut exec: impl FnMut(&mut Command) -> Result<ExitStatus>,
) -> BootstrapOutcome {
    let Some(runtime) = detect_runtime(config::RUNTIME_CANDIDATES, &mut exec) else {
        tracing::error!(candidates = ?config::RUNTIME_CANDIDATES, "no python runtime found");
        return BootstrapOutcome::PythonMissing;
    };
    tracing::info!(%runtime, "python runtime detected");

    let requirements = paths::requirements_path(root);
    if !requirements.exists() {
        tracing::error!(path = %requirements.display(), "dependency manifest missing");
        return BootstrapOutcome::RequirementsMissing;
    }
    let script = paths::script_path(root);
    if !script.exists() {
        tracing::error!(path = %script.display(), "main script missing");
        return BootstrapOutcome::ScriptMissing;
    }

    let venv = paths::venv_dir(root);
    let reused = venv.exists();
    if reused {
        println!("Virtual environment '{}' already exists.", config::VENV_DIR);
        tracing::info!(venv = %venv.display(), "reusing virtual environment");
    } else {
        if create_venv(root, config::VENV_SCRIPTS, &mut exec).is_none() {
            tracing::error!(scripts = ?config::VENV_SCRIPTS, "every venv creation script failed");
            return BootstrapOutcome::VenvCreateFailed;
        }
        println!("Virtual environment created successfully.");
    }

    let outcome = match mode {
        LaunchMode::Staged => launch_staged(root, reused, &mut exec),
        LaunchMode::Composed => launch_composed(root, reused, &mut exec),
    };

    if outcome.is_success() {
        let prefix = if reused {
            "Existing virtual environment activated"
        } else {
            "Virtual environment activated"
        };
        println!(
            "{prefix}, dependencies installed, and {} executed successfully.",
            config::MAIN_SCRIPT
        );
    }
    outcome
}

fn detect_runtime<'a>(
    candidates: &'a [&'a str],
    exec: &mut impl FnMut(&mut Command) -> Result<ExitStatus>,
) -> Option<&'a str> {
    fallback::first_success(candidates, |name| {
        let mut probe = Command::new(name);
        probe
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        require_success(exec(&mut probe)?, name)
    })
    .copied()
}

fn create_venv<'a>(
    root: &Path,
    scripts: &'a [&'a str],
    exec: &mut impl FnMut(&mut Command) -> Result<ExitStatus>,
) -> Option<&'a str> {
    fallback::first_success(scripts, |script| {
        let mut cmd = script_command(&root.join(script));
        cmd.current_dir(root);
        require_success(exec(&mut cmd)?, script)
    })
    .copied()
}

fn launch_staged(
    root: &Path,
    reused: bool,
    exec: &mut impl FnMut(&mut Command) -> Result<ExitStatus>,
) -> BootstrapOutcome {
    let venv = paths::venv_dir(root);
    let python = paths::venv_python(&venv);
    if !python.exists() {
        tracing::error!(python = %python.display(), "venv has no interpreter");
        return BootstrapOutcome::VenvActivateFailed { reused };
    }

    let mut install = activated_command(&python, &venv, root);
    install
        .args(["-m", "pip", "install", "-r"])
        .arg(paths::requirements_path(root));
    if let Err(err) = run_step(exec, &mut install, "pip install") {
        tracing::error!("{err:#}");
        return BootstrapOutcome::DependenciesInstallFailed;
    }

    let mut launch = activated_command(&python, &venv, root);
    launch.arg(paths::script_path(root));
    if let Err(err) = run_step(exec, &mut launch, config::MAIN_SCRIPT) {
        tracing::error!("{err:#}");
        return BootstrapOutcome::ScriptExecutionFailed;
    }

    BootstrapOutcome::Success
}

fn launch_composed(
    root: &Path,
    reused: bool,
    exec: &mut impl FnMut(&mut Command) -> Result<ExitStatus>,
) -> BootstrapOutcome {
    let mut cmd = composed_command(root);
    match run_step(exec, &mut cmd, "activate, install and run") {
        Ok(()) => BootstrapOutcome::Success,
        Err(err) => {
            tracing::error!("{err:#}");
            BootstrapOutcome::VenvActivateFailed { reused }
        }
    }
}

/// Runs `python` as if the venv had been activated.
fn activated_command(python: &Path, venv: &Path, root: &Path) -> Command {
    let mut cmd = Command::new(python);
    cmd.current_dir(root)
        .env("VIRTUAL_ENV", venv)
        .env_remove("PYTHONHOME");
    if let Some(path) = prepend_path(&paths::venv_bin_dir(venv)) {
        cmd.env("PATH", path);
    }
    cmd
}

fn prepend_path(dir: &Path) -> Option<OsString> {
    let mut entries = vec![dir.to_path_buf()];
    if let Some(current) = std::env::var_os("PATH") {
        entries.extend(std::env::split_paths(&current));
    }
    std::env::join_paths(entries).ok()
}

#[cfg(not(windows))]
fn composed_command(root: &Path) -> Command {
    let venv = paths::venv_dir(root);
    let line = format!(
        "source {} && pip install -r {} && python {}",
        sh_quote(&paths::activate_script(&venv).display().to_string()),
        sh_quote(&paths::requirements_path(root).display().to_string()),
        sh_quote(&paths::script_path(root).display().to_string()),
    );
    let mut cmd = Command::new("/bin/bash");
    cmd.arg("-c").arg(line).current_dir(root);
    cmd
}

#[cfg(windows)]
fn composed_command(root: &Path) -> Command {
    use std::os::windows::process::CommandExt;

    let venv = paths::venv_dir(root);
    let line = format!(
        "/c \"\"{}\" & pip install -r \"{}\" & python \"{}\"\"",
        paths::activate_script(&venv).display(),
        paths::requirements_path(root).display(),
        paths::script_path(root).display(),
    );
    let mut cmd = Command::new("cmd");
    cmd.raw_arg(line).current_dir(root);
    cmd
}

#[cfg(not(windows))]
fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Shell scripts go through `sh`, batch files through `cmd /C`.
fn script_command(script: &Path) -> Command {
    let ext = script
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "sh" => {
            let mut cmd = Command::new("sh");
            cmd.arg(script);
            cmd
        }
        "bat" | "cmd" if cfg!(windows) => {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(script);
            cmd
        }
        _ => Command::new(script),
    }
}

fn run_step(
    exec: &mut impl FnMut(&mut Command) -> Result<ExitStatus>,
    cmd: &mut Command,
    label: &str,
) -> Result<()> {
    tracing::info!(command = %format_command(cmd), "running {label}");
    let status = exec(cmd).with_context(|| format!("{label} could not start"))?;
    require_success(status, label)
}

fn require_success(status: ExitStatus, label: &str) -> Result<()> {
    if !status.success() {
        bail!("{label} failed (exit {:?})", status.code());
    }
    Ok(())
}

fn format_command(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    let args = cmd
        .get_args()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {args}")
    }
}
