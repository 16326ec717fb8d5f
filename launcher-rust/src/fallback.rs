use anyhow::Result;
use std::fmt::Display;

/// Tries `candidates` in order and returns the first one `attempt` accepts.
///
/// Failed attempts are logged and skipped. `None` means every candidate was
/// exhausted.
pub fn first_success<'a, T, F>(candidates: &'a [T], mut attempt: F) -> Option<&'a T>
where
    T: Display,
    F: FnMut(&T) -> Result<()>,
{
    for candidate in candidates {
        match attempt(candidate) {
            Ok(()) => {
                tracing::debug!(%candidate, "candidate succeeded");
                return Some(candidate);
            }
            Err(err) => {
                tracing::warn!(%candidate, "candidate failed: {err:#}");
            }
        }
    }
    None
}
