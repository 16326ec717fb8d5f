use std::path::{Path, PathBuf};
use thiserror::Error;

/// Wizard screens, in the only order they can be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    License,
    ChooseDirectory,
    Options,
    Installing,
    Done,
}

impl Screen {
    /// Forward transition table.
    pub fn next(self) -> Option<Screen> {
        match self {
            Screen::Welcome => Some(Screen::License),
            Screen::License => Some(Screen::ChooseDirectory),
            Screen::ChooseDirectory => Some(Screen::Options),
            Screen::Options => Some(Screen::Installing),
            Screen::Installing => Some(Screen::Done),
            Screen::Done => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Welcome => "Installer",
            Screen::License => "License Agreement",
            Screen::ChooseDirectory => "Choose Installation Directory",
            Screen::Options => "Additional Options",
            Screen::Installing => "Installing",
            Screen::Done => "Done",
        }
    }
}

/// What the user picked; handed to the install step exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationChoice {
    pub destination_directory: PathBuf,
    pub create_desktop_shortcut: bool,
    pub add_to_start_menu: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("the license must be accepted before continuing")]
    LicenseNotAccepted,
    #[error("{action} is not available on the {screen:?} screen")]
    WrongScreen { screen: Screen, action: &'static str },
    #[error("installation is in progress")]
    InstallInProgress,
    #[error("the wizard has already finished")]
    Finished,
}

#[derive(Debug)]
pub struct Wizard {
    screen: Screen,
    license_accepted: bool,
    destination: PathBuf,
    desktop_shortcut: bool,
    start_menu: bool,
    choice: Option<InstallationChoice>,
}

impl Wizard {
    pub fn new(default_destination: PathBuf) -> Self {
        Self {
            screen: Screen::Welcome,
            license_accepted: false,
            destination: default_destination,
            desktop_shortcut: true,
            start_menu: true,
            choice: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn license_accepted(&self) -> bool {
        self.license_accepted
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn desktop_shortcut(&self) -> bool {
        self.desktop_shortcut
    }

    pub fn start_menu(&self) -> bool {
        self.start_menu
    }

    pub fn set_license_accepted(&mut self, accepted: bool) -> Result<(), WizardError> {
        self.expect_screen(Screen::License, "accepting the license")?;
        self.license_accepted = accepted;
        Ok(())
    }

    pub fn set_destination(&mut self, destination: PathBuf) -> Result<(), WizardError> {
        self.expect_screen(Screen::ChooseDirectory, "choosing a directory")?;
        self.destination = destination;
        Ok(())
    }

    pub fn set_desktop_shortcut(&mut self, enabled: bool) -> Result<(), WizardError> {
        self.expect_screen(Screen::Options, "the desktop shortcut option")?;
        self.desktop_shortcut = enabled;
        Ok(())
    }

    pub fn set_start_menu(&mut self, enabled: bool) -> Result<(), WizardError> {
        self.expect_screen(Screen::Options, "the start menu option")?;
        self.start_menu = enabled;
        Ok(())
    }

    /// Whether "Next" is enabled on the current screen.
    pub fn can_advance(&self) -> bool {
        match self.screen {
            Screen::License => self.license_accepted,
            Screen::Installing | Screen::Done => false,
            Screen::Welcome | Screen::ChooseDirectory | Screen::Options => true,
        }
    }

    /// Moves one screen forward. Leaving `Options` freezes the choice.
    pub fn advance(&mut self) -> Result<Screen, WizardError> {
        match self.screen {
            Screen::License if !self.license_accepted => {
                return Err(WizardError::LicenseNotAccepted)
            }
            Screen::Installing => return Err(WizardError::InstallInProgress),
            Screen::Done => return Err(WizardError::Finished),
            _ => {}
        }
        if self.screen == Screen::Options {
            self.choice = Some(InstallationChoice {
                destination_directory: self.destination.clone(),
                create_desktop_shortcut: self.desktop_shortcut,
                add_to_start_menu: self.start_menu,
            });
        }
        self.move_next()
    }

    /// Hands out the frozen choice; `None` before `Installing` or once taken.
    pub fn take_choice(&mut self) -> Option<InstallationChoice> {
        self.choice.take()
    }

    /// Marks the install step as run, whatever its result.
    pub fn finish(&mut self) -> Result<Screen, WizardError> {
        self.expect_screen(Screen::Installing, "finishing")?;
        self.choice = None;
        self.move_next()
    }

    fn move_next(&mut self) -> Result<Screen, WizardError> {
        let next = self.screen.next().ok_or(WizardError::Finished)?;
        tracing::debug!(from = ?self.screen, to = ?next, "wizard transition");
        self.screen = next;
        Ok(next)
    }

    fn expect_screen(&self, screen: Screen, action: &'static str) -> Result<(), WizardError> {
        if self.screen != screen {
            return Err(WizardError::WrongScreen {
                screen: self.screen,
                action,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_license() -> Wizard {
        let mut w = Wizard::new(PathBuf::from("/home/user/picodulce"));
        w.advance().unwrap();
        assert_eq!(w.screen(), Screen::License);
        w
    }

    #[test]
    fn starts_on_welcome_with_both_options_checked() {
        let w = Wizard::new(PathBuf::from("/tmp/dest"));
        assert_eq!(w.screen(), Screen::Welcome);
        assert!(w.can_advance());
        assert!(w.desktop_shortcut());
        assert!(w.start_menu());
        assert!(!w.license_accepted());
    }

    #[test]
    fn declined_license_keeps_next_disabled() {
        let mut w = at_license();
        assert!(!w.can_advance());
        w.set_license_accepted(false).unwrap();
        assert!(!w.can_advance());
        assert_eq!(w.advance(), Err(WizardError::LicenseNotAccepted));
        assert_eq!(w.screen(), Screen::License);
    }

    #[test]
    fn accepting_license_enables_next_and_unchecking_disables_it() {
        let mut w = at_license();
        w.set_license_accepted(true).unwrap();
        assert!(w.can_advance());
        w.set_license_accepted(false).unwrap();
        assert!(!w.can_advance());
        w.set_license_accepted(true).unwrap();
        assert_eq!(w.advance(), Ok(Screen::ChooseDirectory));
    }

    #[test]
    fn full_walk_produces_choice_once() {
        let mut w = at_license();
        w.set_license_accepted(true).unwrap();
        w.advance().unwrap();
        w.set_destination(PathBuf::from("/opt/picodulce")).unwrap();
        w.advance().unwrap();
        w.set_start_menu(false).unwrap();
        assert_eq!(w.take_choice(), None);
        assert_eq!(w.advance(), Ok(Screen::Installing));
        assert!(!w.can_advance());

        let choice = w.take_choice().unwrap();
        assert_eq!(
            choice,
            InstallationChoice {
                destination_directory: PathBuf::from("/opt/picodulce"),
                create_desktop_shortcut: true,
                add_to_start_menu: false,
            }
        );
        assert_eq!(w.take_choice(), None);

        assert_eq!(w.advance(), Err(WizardError::InstallInProgress));
        assert_eq!(w.finish(), Ok(Screen::Done));
        assert_eq!(w.advance(), Err(WizardError::Finished));
    }

    #[test]
    fn setters_are_bound_to_their_screen() {
        let mut w = Wizard::new(PathBuf::from("/tmp/dest"));
        assert!(matches!(
            w.set_license_accepted(true),
            Err(WizardError::WrongScreen { screen: Screen::Welcome, .. })
        ));
        assert!(w.set_destination(PathBuf::from("/elsewhere")).is_err());
        assert!(w.set_desktop_shortcut(false).is_err());
        assert_eq!(w.destination(), Path::new("/tmp/dest"));
        assert!(w.finish().is_err());
    }

    #[test]
    fn transition_table_is_strictly_forward() {
        let mut screen = Screen::Welcome;
        let mut visited = vec![screen];
        while let Some(next) = screen.next() {
            visited.push(next);
            screen = next;
        }
        assert_eq!(
            visited,
            vec![
                Screen::Welcome,
                Screen::License,
                Screen::ChooseDirectory,
                Screen::Options,
                Screen::Installing,
                Screen::Done,
            ]
        );
    }
}
