use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "installer.log";

pub struct LogHandle {
    pub path: PathBuf,
    _guard: WorkerGuard,
}

/// Under the system temp directory, away from the bundle and the destination.
pub fn default_logs_dir() -> PathBuf {
    std::env::temp_dir().join("picodulce-installer")
}

pub fn init(dir: &Path) -> Result<LogHandle> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let log_path = dir.join(LOG_FILE_NAME);
    let _file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open {}", log_path.display()))?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init();

    Ok(LogHandle {
        path: log_path,
        _guard: guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_log_file() {
        let tmp = tempfile::tempdir().unwrap();
        let handle = init(tmp.path()).unwrap();
        assert!(handle.path.exists());
        assert_eq!(handle.path, tmp.path().join(LOG_FILE_NAME));
    }
}
