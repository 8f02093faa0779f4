use std::fs::{self, File};
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Keeps the background log writer alive; dropping it flushes pending events.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// Install a global `tracing` subscriber described by `logging`.
///
/// Returns `None` when structured logging is disabled. `RUST_LOG` overrides
/// the configured level.
pub fn init_logging(logging: &LoggingConfig) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let (writer, guard) = match &logging.file {
        Some(path) => file_writer(path)?,
        None => non_blocking::NonBlockingBuilder::default()
            .lossy(false)
            .finish(io::stderr()),
    };

    let level = logging.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer);

    // Ignore error if a global subscriber is already set (e.g., when running in tests)
    let _ = match logging.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            builder.json().with_current_span(false).finish(),
        ),
        LogFormat::Pretty => {
            tracing::subscriber::set_global_default(builder.pretty().finish())
        }
    };

    Ok(Some(LoggingGuard { _guard: guard }))
}

fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory at {}", dir.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("creating log file at {}", path.display()))?;
    Ok(non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file))
}
