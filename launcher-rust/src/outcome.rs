use crate::{config, runner::LaunchMode};

/// Terminal result of one launcher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Success,
    PythonMissing,
    RequirementsMissing,
    ScriptMissing,
    VenvCreateFailed,
    /// `reused` is set when the environment existed before this run.
    VenvActivateFailed { reused: bool },
    DependenciesInstallFailed,
    ScriptExecutionFailed,
}

impl BootstrapOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, BootstrapOutcome::Success)
    }

    /// Error identifier shown to the user. `Success` has none.
    pub fn code(self) -> Option<u16> {
        match self {
            BootstrapOutcome::Success => None,
            BootstrapOutcome::PythonMissing => Some(101),
            BootstrapOutcome::RequirementsMissing => Some(102),
            BootstrapOutcome::ScriptMissing => Some(103),
            BootstrapOutcome::VenvCreateFailed => Some(104),
            BootstrapOutcome::VenvActivateFailed { .. } => Some(105),
            BootstrapOutcome::DependenciesInstallFailed => Some(106),
            BootstrapOutcome::ScriptExecutionFailed => Some(107),
        }
    }

    pub fn message(self, mode: LaunchMode) -> String {
        let script = config::MAIN_SCRIPT;
        match self {
            BootstrapOutcome::Success => format!("{script} finished successfully."),
            BootstrapOutcome::PythonMissing => "Please install Python.".to_string(),
            BootstrapOutcome::RequirementsMissing => {
                format!("{} not found.", config::REQUIREMENTS_FILE)
            }
            BootstrapOutcome::ScriptMissing => format!("{script} not found."),
            BootstrapOutcome::VenvCreateFailed => format!(
                "Failed to create a virtual environment using {}.",
                quoted_list(config::VENV_SCRIPTS)
            ),
            BootstrapOutcome::VenvActivateFailed { reused } => {
                let which = if reused { "the existing" } else { "the" };
                match mode {
                    LaunchMode::Composed => format!(
                        "Failed to activate {which} virtual environment, install dependencies, or run {script}."
                    ),
                    LaunchMode::Staged => format!(
                        "Failed to activate {which} virtual environment '{}'.",
                        config::VENV_DIR
                    ),
                }
            }
            BootstrapOutcome::DependenciesInstallFailed => format!(
                "Failed to install dependencies from {}.",
                config::REQUIREMENTS_FILE
            ),
            BootstrapOutcome::ScriptExecutionFailed => format!("{script} exited with an error."),
        }
    }
}

fn quoted_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{s}'")).collect();
    match quoted.len() {
        0 => "no creation scripts".to_string(),
        1 => quoted[0].clone(),
        2 => format!("both {} and {}", quoted[0], quoted[1]),
        n => format!("{} and {}", quoted[..n - 1].join(", "), quoted[n - 1]),
    }
}
