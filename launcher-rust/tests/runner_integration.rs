#[path = "../src/config.rs"]
mod config;
#[path = "../src/fallback.rs"]
mod fallback;
#[path = "../src/outcome.rs"]
mod outcome;
#[path = "../src/paths.rs"]
mod paths;
#[path = "../src/runner.rs"]
mod runner;

use anyhow::anyhow;
use outcome::BootstrapOutcome;
use runner::LaunchMode;
use std::{
    fs,
    path::Path,
    process::{Command, ExitStatus},
};

#[derive(Debug, Clone)]
struct Call {
    program: String,
    args: Vec<String>,
}

impl Call {
    fn of(cmd: &Command) -> Self {
        Call {
            program: cmd.get_program().to_string_lossy().to_string(),
            args: cmd
                .get_args()
                .map(|a| a.to_string_lossy().to_string())
                .collect(),
        }
    }

    fn is_probe(&self) -> bool {
        config::RUNTIME_CANDIDATES.contains(&self.program.as_str())
            && self.args == ["--version"]
    }

    fn is_venv_script(&self) -> bool {
        self.args.iter().any(|a| {
            config::VENV_SCRIPTS
                .iter()
                .any(|s| Path::new(a).ends_with(s))
        }) || config::VENV_SCRIPTS
            .iter()
            .any(|s| Path::new(&self.program).ends_with(s))
    }

    fn is_pip(&self) -> bool {
        self.args.starts_with(&["-m".to_string(), "pip".to_string()])
    }

    fn is_script_run(&self) -> bool {
        !self.is_venv_script()
            && self
                .args
                .last()
                .map(|a| Path::new(a).ends_with(config::MAIN_SCRIPT))
                .unwrap_or(false)
            && !self.is_pip()
    }
}

fn status(code: i32) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

fn project(root: &Path) {
    fs::write(paths::requirements_path(root), "requests\n").unwrap();
    fs::write(paths::script_path(root), "print('hi')\n").unwrap();
}

fn fake_venv(root: &Path) {
    let python = paths::venv_python(&paths::venv_dir(root));
    fs::create_dir_all(python.parent().unwrap()).unwrap();
    fs::write(&python, "").unwrap();
}

#[test]
fn missing_runtime_stops_before_anything_else() {
    let tmp = tempfile::tempdir().unwrap();
    project(tmp.path());

    let mut seen = Vec::new();
    let outcome = runner::run_with_executor(tmp.path(), LaunchMode::Staged, |cmd| {
        let call = Call::of(cmd);
        seen.push(call.clone());
        if call.program == config::RUNTIME_CANDIDATES[0] {
            Err(anyhow!("program not found"))
        } else {
            Ok(status(1))
        }
    });

    assert_eq!(outcome, BootstrapOutcome::PythonMissing);
    assert_eq!(outcome.code(), Some(101));
    assert_eq!(seen.len(), config::RUNTIME_CANDIDATES.len());
    assert!(seen.iter().all(Call::is_probe));
    assert!(!paths::venv_dir(tmp.path()).exists());
}

#[test]
fn second_runtime_candidate_is_enough() {
    let tmp = tempfile::tempdir().unwrap();
    project(tmp.path());
    fake_venv(tmp.path());

    let outcome = runner::run_with_executor(tmp.path(), LaunchMode::Staged, |cmd| {
        let call = Call::of(cmd);
        if call.is_probe() && call.program == config::RUNTIME_CANDIDATES[0] {
            return Ok(status(9009));
        }
        Ok(status(0))
    });

    assert_eq!(outcome, BootstrapOutcome::Success);
}

#[test]
fn missing_manifest_and_script_are_reported_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let ok = |_: &mut Command| -> anyhow::Result<ExitStatus> { Ok(status(0)) };

    let outcome = runner::run_with_executor(tmp.path(), LaunchMode::Staged, ok);
    assert_eq!(outcome, BootstrapOutcome::RequirementsMissing);

    fs::write(paths::requirements_path(tmp.path()), "").unwrap();
    let outcome = runner::run_with_executor(tmp.path(), LaunchMode::Staged, ok);
    assert_eq!(outcome, BootstrapOutcome::ScriptMissing);
    assert_eq!(outcome.code(), Some(103));
}

#[test]
fn existing_venv_skips_creation() {
    let tmp = tempfile::tempdir().unwrap();
    project(tmp.path());
    fake_venv(tmp.path());

    let mut seen = Vec::new();
    let outcome = runner::run_with_executor(tmp.path(), LaunchMode::Staged, |cmd| {
        seen.push(Call::of(cmd));
        Ok(status(0))
    });

    assert_eq!(outcome, BootstrapOutcome::Success);
    assert!(!seen.iter().any(Call::is_venv_script));
    let tail: Vec<&Call> = seen.iter().filter(|c| !c.is_probe()).collect();
    assert_eq!(tail.len(), 2);
    assert!(tail[0].is_pip());
    assert!(tail[0].args.contains(&"install".to_string()));
    assert!(tail[1].is_script_run());
}

#[test]
fn creation_falls_back_to_second_script() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().to_path_buf();
    project(&root);

    let mut scripts_run = 0;
    let outcome = runner::run_with_executor(&root, LaunchMode::Staged, |cmd| {
        let call = Call::of(cmd);
        if call.is_venv_script() {
            scripts_run += 1;
            if scripts_run == 1 {
                return Ok(status(1));
            }
            fake_venv(&root);
        }
        Ok(status(0))
    });

    assert_eq!(scripts_run, 2);
    assert_eq!(outcome, BootstrapOutcome::Success);
}

#[test]
fn both_creation_scripts_failing_reports_104() {
    let tmp = tempfile::tempdir().unwrap();
    project(tmp.path());

    let mut seen = Vec::new();
    let outcome = runner::run_with_executor(tmp.path(), LaunchMode::Staged, |cmd| {
        let call = Call::of(cmd);
        let failed = call.is_venv_script();
        seen.push(call);
        Ok(status(if failed { 1 } else { 0 }))
    });

    assert_eq!(outcome, BootstrapOutcome::VenvCreateFailed);
    assert_eq!(outcome.code(), Some(104));
    assert_eq!(
        seen.iter().filter(|c| c.is_venv_script()).count(),
        config::VENV_SCRIPTS.len()
    );
    assert!(!seen.iter().any(|c| c.is_pip() || c.is_script_run()));
}

#[test]
fn staged_mode_separates_failure_codes() {
    let tmp = tempfile::tempdir().unwrap();
    project(tmp.path());
    fs::create_dir_all(paths::venv_dir(tmp.path())).unwrap();

    let ok = |_: &mut Command| -> anyhow::Result<ExitStatus> { Ok(status(0)) };
    let outcome = runner::run_with_executor(tmp.path(), LaunchMode::Staged, ok);
    assert_eq!(outcome, BootstrapOutcome::VenvActivateFailed { reused: true });

    fake_venv(tmp.path());
    let outcome = runner::run_with_executor(tmp.path(), LaunchMode::Staged, |cmd| {
        Ok(status(if Call::of(cmd).is_pip() { 1 } else { 0 }))
    });
    assert_eq!(outcome, BootstrapOutcome::DependenciesInstallFailed);

    let outcome = runner::run_with_executor(tmp.path(), LaunchMode::Staged, |cmd| {
        Ok(status(if Call::of(cmd).is_script_run() { 2 } else { 0 }))
    });
    assert_eq!(outcome, BootstrapOutcome::ScriptExecutionFailed);
    assert_eq!(outcome.code(), Some(107));
}

#[test]
fn composed_mode_reports_one_combined_code() {
    let tmp = tempfile::tempdir().unwrap();
    project(tmp.path());
    fs::create_dir_all(paths::venv_dir(tmp.path())).unwrap();

    let mut seen = Vec::new();
    let outcome = runner::run_with_executor(tmp.path(), LaunchMode::Composed, |cmd| {
        let call = Call::of(cmd);
        let probe = call.is_probe();
        seen.push(call);
        Ok(status(if probe { 0 } else { 1 }))
    });

    assert_eq!(outcome, BootstrapOutcome::VenvActivateFailed { reused: true });
    let composed: Vec<&Call> = seen.iter().filter(|c| !c.is_probe()).collect();
    assert_eq!(composed.len(), 1);
    let line = composed[0].args.join(" ");
    assert!(line.contains("pip install -r"));
    assert!(line.contains(config::MAIN_SCRIPT));
}

#[test]
fn composed_failure_after_fresh_creation_is_not_reported_as_existing() {
    let tmp = tempfile::tempdir().unwrap();
    project(tmp.path());

    let outcome = runner::run_with_executor(tmp.path(), LaunchMode::Composed, |cmd| {
        let call = Call::of(cmd);
        Ok(status(if call.is_probe() || call.is_venv_script() { 0 } else { 1 }))
    });

    assert_eq!(outcome, BootstrapOutcome::VenvActivateFailed { reused: false });
    assert!(!outcome.message(LaunchMode::Composed).contains("existing"));
}
