use anyhow::Result;
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use std::path::PathBuf;

use crate::{
    config,
    installer::InstallLog,
    wizard::{Screen, Wizard, WizardError},
};

/// Installing-screen log on the terminal. Each line is flushed right away so
/// progress shows while files are still being copied.
pub struct ConsoleLog {
    term: Term,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl InstallLog for ConsoleLog {
    fn line(&mut self, message: &str) {
        tracing::info!(target: "install", "{message}");
        let _ = self.term.write_line(message);
        let _ = self.term.flush();
    }
}

/// Answers for walking the wizard without prompts.
#[derive(Debug, Clone)]
pub struct UnattendedOptions {
    pub accept_license: bool,
    pub destination: Option<PathBuf>,
    pub desktop_shortcut: bool,
    pub start_menu: bool,
}

/// Drives the wizard from `Welcome` to `Installing` with fixed answers.
pub fn run_unattended(wizard: &mut Wizard, opts: &UnattendedOptions) -> Result<(), WizardError> {
    wizard.advance()?;
    wizard.set_license_accepted(opts.accept_license)?;
    wizard.advance()?;
    if let Some(dest) = &opts.destination {
        wizard.set_destination(dest.clone())?;
    }
    wizard.advance()?;
    wizard.set_desktop_shortcut(opts.desktop_shortcut)?;
    wizard.set_start_menu(opts.start_menu)?;
    wizard.advance()?;
    Ok(())
}

/// Prompts through every screen up to `Installing`. Returns `false` when the
/// user backs out.
pub fn run_interactive(wizard: &mut Wizard, license_text: &str) -> Result<bool> {
    let theme = ColorfulTheme::default();
    let term = Term::stdout();

    while wizard.screen() != Screen::Installing {
        match wizard.screen() {
            Screen::Welcome => {
                header(&term, &format!("{} {}", config::PRODUCT_NAME, Screen::Welcome.title()))?;
                term.write_line(&format!(
                    "Welcome to the {} Installer. This installer will help you set up the {} on your system.",
                    config::PRODUCT_NAME,
                    config::PRODUCT_NAME
                ))?;
                if !Confirm::with_theme(&theme)
                    .with_prompt("Next")
                    .default(true)
                    .interact()?
                {
                    return Ok(false);
                }
            }
            Screen::License => {
                header(&term, Screen::License.title())?;
                term.write_line("Please read the following license carefully:")?;
                term.write_line("")?;
                term.write_line(license_text.trim_end())?;
                term.write_line("")?;
                loop {
                    let accepted = Confirm::with_theme(&theme)
                        .with_prompt("I accept the Terms and Conditions")
                        .default(false)
                        .interact()?;
                    let answer = license_answer(wizard, accepted, || {
                        Ok(Confirm::with_theme(&theme)
                            .with_prompt("Cancel installation?")
                            .default(false)
                            .interact()?)
                    })?;
                    match answer {
                        LicenseAnswer::Accepted => break,
                        LicenseAnswer::AskAgain => {
                            term.write_line("The license must be accepted to continue.")?
                        }
                        LicenseAnswer::Cancel => return Ok(false),
                    }
                }
            }
            Screen::ChooseDirectory => {
                header(&term, Screen::ChooseDirectory.title())?;
                let dest: String = Input::with_theme(&theme)
                    .with_prompt("Choose a directory for the install")
                    .default(wizard.destination().display().to_string())
                    .allow_empty(true)
                    .interact_text()?;
                wizard.set_destination(PathBuf::from(dest.trim()))?;
            }
            Screen::Options => {
                header(&term, Screen::Options.title())?;
                let desktop = Confirm::with_theme(&theme)
                    .with_prompt("Create a shortcut on the desktop")
                    .default(wizard.desktop_shortcut())
                    .interact()?;
                wizard.set_desktop_shortcut(desktop)?;
                let start_menu = Confirm::with_theme(&theme)
                    .with_prompt("Add it to Start Menu")
                    .default(wizard.start_menu())
                    .interact()?;
                wizard.set_start_menu(start_menu)?;
            }
            Screen::Installing | Screen::Done => break,
        }
        wizard.advance()?;
    }

    header(&term, Screen::Installing.title())?;
    term.write_line("Installation in progress. Please wait...")?;
    Ok(true)
}

#[derive(Debug, PartialEq, Eq)]
enum LicenseAnswer {
    Accepted,
    AskAgain,
    Cancel,
}

/// Records one answer on the License screen. Declining leaves "Next"
/// disabled; `confirm_cancel` is only asked then.
fn license_answer(
    wizard: &mut Wizard,
    accepted: bool,
    confirm_cancel: impl FnOnce() -> Result<bool>,
) -> Result<LicenseAnswer> {
    wizard.set_license_accepted(accepted)?;
    if wizard.can_advance() {
        return Ok(LicenseAnswer::Accepted);
    }
    if confirm_cancel()? {
        Ok(LicenseAnswer::Cancel)
    } else {
        Ok(LicenseAnswer::AskAgain)
    }
}

fn header(term: &Term, title: &str) -> Result<()> {
    term.write_line("")?;
    term.write_line(&style(title).bold().cyan().to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(accept_license: bool) -> UnattendedOptions {
        UnattendedOptions {
            accept_license,
            destination: Some(PathBuf::from("/opt/picodulce")),
            desktop_shortcut: false,
            start_menu: true,
        }
    }

    #[test]
    fn unattended_walk_reaches_installing_with_choice() {
        let mut w = Wizard::new(PathBuf::from("/home/user/picodulce"));
        run_unattended(&mut w, &opts(true)).unwrap();
        assert_eq!(w.screen(), Screen::Installing);
        let choice = w.take_choice().unwrap();
        assert_eq!(choice.destination_directory, PathBuf::from("/opt/picodulce"));
        assert!(!choice.create_desktop_shortcut);
        assert!(choice.add_to_start_menu);
    }

    #[test]
    fn unattended_walk_stops_at_license_without_acceptance() {
        let mut w = Wizard::new(PathBuf::from("/home/user/picodulce"));
        let err = run_unattended(&mut w, &opts(false)).unwrap_err();
        assert_eq!(err, WizardError::LicenseNotAccepted);
        assert_eq!(w.screen(), Screen::License);
    }

    #[test]
    fn unattended_walk_keeps_default_destination() {
        let mut w = Wizard::new(PathBuf::from("/home/user/picodulce"));
        let mut o = opts(true);
        o.destination = None;
        run_unattended(&mut w, &o).unwrap();
        assert_eq!(
            w.take_choice().unwrap().destination_directory,
            PathBuf::from("/home/user/picodulce")
        );
    }

    fn at_license() -> Wizard {
        let mut w = Wizard::new(PathBuf::from("/home/user/picodulce"));
        w.advance().unwrap();
        w
    }

    #[test]
    fn declined_license_asks_again_without_leaving_the_screen() {
        let mut w = at_license();
        let answer = license_answer(&mut w, false, || Ok(false)).unwrap();
        assert_eq!(answer, LicenseAnswer::AskAgain);
        assert_eq!(w.screen(), Screen::License);
        assert!(!w.can_advance());

        let answer = license_answer(&mut w, true, || panic!("no cancel prompt expected")).unwrap();
        assert_eq!(answer, LicenseAnswer::Accepted);
        assert_eq!(w.advance().unwrap(), Screen::ChooseDirectory);
    }

    #[test]
    fn declined_license_cancels_only_when_confirmed() {
        let mut w = at_license();
        let answer = license_answer(&mut w, false, || Ok(true)).unwrap();
        assert_eq!(answer, LicenseAnswer::Cancel);
        assert_eq!(w.screen(), Screen::License);
    }
}
