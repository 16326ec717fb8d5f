use rfd::{MessageButtons, MessageDialog, MessageLevel};
use std::io::{self, Write};

use crate::{outcome::BootstrapOutcome, runner::LaunchMode};

/// Title and body shown for a failed run.
pub fn error_text(outcome: BootstrapOutcome, mode: LaunchMode) -> (String, String) {
    let code = outcome.code().unwrap_or_default();
    let message = outcome.message(mode);
    (
        format!("Error {code}"),
        format!("{message}\n\nError Code: {code}"),
    )
}

/// Title and body for a failure before the decision chain starts.
pub fn startup_error_text(err: &anyhow::Error) -> (String, String) {
    (
        "Error".to_string(),
        format!("The launcher could not start: {err:#}"),
    )
}

/// The same text as the dialog, on a stream. Every failure gets one of these,
/// so the error is visible even when no dialog backend is available.
pub fn write_error(out: &mut impl Write, title: &str, body: &str) -> io::Result<()> {
    writeln!(out, "{title}: {body}")
}

/// Reports a failed run. Blocks until the user dismisses the box unless
/// `dialog` is false.
pub fn report(outcome: BootstrapOutcome, mode: LaunchMode, dialog: bool) {
    let (title, body) = error_text(outcome, mode);
    tracing::error!(code = outcome.code(), "{}", body.replace('\n', " "));
    show(&title, &body, dialog);
}

pub fn report_startup(err: &anyhow::Error, dialog: bool) {
    let (title, body) = startup_error_text(err);
    tracing::error!("{body}");
    show(&title, &body, dialog);
}

fn show(title: &str, body: &str, dialog: bool) {
    let _ = write_error(&mut io::stderr().lock(), title, body);
    if !dialog {
        return;
    }
    let _ = MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(body)
        .set_buttons(MessageButtons::Ok)
        .show();
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn error_text_carries_code_in_title_and_body() {
        let (title, body) = error_text(BootstrapOutcome::VenvCreateFailed, LaunchMode::Staged);
        assert_eq!(title, "Error 104");
        assert!(body.starts_with("Failed to create a virtual environment"));
        assert!(body.ends_with("\n\nError Code: 104"));
    }

    #[test]
    fn written_error_matches_dialog_text() {
        let (title, body) = error_text(BootstrapOutcome::PythonMissing, LaunchMode::Staged);
        let mut out = Vec::new();
        write_error(&mut out, &title, &body).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Error 101: Please install Python.\n\nError Code: 101\n");
    }

    #[test]
    fn startup_error_keeps_context_chain() {
        let err = Err::<(), _>(std::io::Error::from(std::io::ErrorKind::NotFound))
            .context("enter /opt/picodulce")
            .unwrap_err();
        let (title, body) = startup_error_text(&err);
        assert_eq!(title, "Error");
        assert!(body.starts_with("The launcher could not start: enter /opt/picodulce: "));
    }
}
