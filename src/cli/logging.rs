//! Tracing subscriber setup

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log file path: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error("failed to prepare log directory: {0}")]
    Io(#[from] io::Error),
    #[error("subscriber init failed: {0}")]
    SubscriberInit(#[from] tracing_subscriber::util::TryInitError),
}

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Number of `-v` flags given
    pub verbosity: u8,
    pub log_file: Option<PathBuf>,
}

impl LogOptions {
    /// Console level. Progress is drawn on stderr too, so only errors
    /// are shown unless asked for more.
    fn console_level(&self) -> &'static str {
        match self.verbosity {
            0 => "error",
            1 => "info",
            _ => "debug",
        }
    }

    fn file_level(&self) -> &'static str {
        if self.verbosity >= 2 {
            "debug"
        } else {
            "info"
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the console level.
///
/// The returned guard flushes the log file when dropped and must be kept
/// alive until the program exits.
pub fn init_logging(options: &LogOptions) -> Result<Option<WorkerGuard>, LogError> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.console_level()));
    let console = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(console_filter);

    let (file_layer, guard) = match options.log_file {
        Some(ref path) => {
            let (dir, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(options.file_level()));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), LogError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LogError::InvalidPath(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(file_name)))
}
