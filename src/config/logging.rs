use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, thiserror::Error)]
pub enum TracingInitError {
    #[error("LOG_LEVEL is not a valid filter directive: {0}")]
    Filter(String),

    #[error("Could not prepare the log file location: {0}")]
    LogFile(#[from] std::io::Error),

    #[error("A tracing subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

/// Install the global tracing subscriber.
///
/// `LOG_LEVEL` accepts any `EnvFilter` directive string (default `info`).
/// Console output keeps ANSI colors and source locations for an operator at
/// a terminal; setting `APP_LOG_FILE` adds a daily-rotated plain copy of
/// the same stream for log shippers. Ingest and query lines carry the
/// generated request id and the tenant id as structured fields, so one
/// grep follows a request across the auth, coordinator, and store layers.
pub fn setup_tracing() -> Result<(), TracingInitError> {
    let directives = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(&directives)
        .map_err(|e| TracingInitError::Filter(format!("{}: {}", directives, e)))?;

    let console = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter.clone());

    let registry = tracing_subscriber::registry().with(console);

    let Some(file_target) = std::env::var("APP_LOG_FILE").ok() else {
        return registry
            .try_init()
            .map_err(|e| TracingInitError::AlreadyInstalled(e.to_string()));
    };

    let file_layer = fmt::layer()
        .with_writer(rolling_writer(Path::new(&file_target))?)
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter);

    registry
        .with(file_layer)
        .try_init()
        .map_err(|e| TracingInitError::AlreadyInstalled(e.to_string()))
}

/// Daily-rotated appender next to the requested file, creating the
/// directory on demand
fn rolling_writer(
    target: &Path,
) -> Result<tracing_appender::rolling::RollingFileAppender, TracingInitError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let file_name = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "pulsestream.log".into());

    Ok(tracing_appender::rolling::daily(dir, file_name))
}
