use std::{fs, io::ErrorKind, path::Path};

use crate::{config, paths};

/// Text for the license screen. Never fails: a missing or unreadable file
/// turns into a notice the user can read instead.
pub fn load(root: &Path) -> String {
    let path = paths::license_path(root);
    match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "license file missing");
            format!("{} file not found.", config::LICENSE_FILE)
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), "license unreadable: {err}");
            format!("{} could not be read: {err}", config::LICENSE_FILE)
        }
    }
}
