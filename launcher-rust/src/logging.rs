use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "launcher.log";

/// Keeps the background log writer alive; logs are flushed when dropped.
pub struct LogHandle {
    pub path: PathBuf,
    _guard: WorkerGuard,
}

pub fn logs_dir(root: &Path) -> PathBuf {
    root.join("logs")
}

pub fn init(root: &Path) -> Result<LogHandle> {
    let dir = logs_dir(root);
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let log_path = dir.join(LOG_FILE_NAME);
    let _file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open {}", log_path.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init in the same process keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init();

    Ok(LogHandle {
        path: log_path,
        _guard: guard,
    })
}

/// Like [`init`], but a log directory that cannot be opened only costs the
/// file output: a warning goes to `warn` and warnings and errors go to stderr.
pub fn init_or_warn(root: &Path, warn: &mut impl Write) -> Option<LogHandle> {
    match init(root) {
        Ok(handle) => Some(handle),
        Err(err) => {
            let _ = writeln!(warn, "warning: file logging disabled: {err:#}");
            init_stderr();
            None
        }
    }
}

fn init_stderr() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .try_init();
}
