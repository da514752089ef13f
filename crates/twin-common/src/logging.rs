//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the dashboard runtime."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const LOG_ENV: &str = "TWIN_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Keeps the non-blocking log writers alive.
///
/// Dropping it flushes buffered events to the rolling file and stderr, so
/// hold it until the process is about to exit.
#[must_use = "dropping the guard stops the log writers"]
#[derive(Debug)]
pub struct TracingGuard {
    _writers: Vec<WorkerGuard>,
}

/// Available log formats for the console sink.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    StructuredJson,
    Pretty,
}

/// Where log events are written besides the rolling file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    /// Rolling file only. Used while the terminal UI owns the screen.
    FileOnly,
    /// Rolling file plus stderr in the configured format.
    FileAndStderr,
}

/// Resolve the filter directive from `TWIN_LOG`, then `RUST_LOG`, then `info`.
pub fn env_filter() -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!("invalid {LOG_ENV} directive ({err}); defaulting to {DEFAULT_DIRECTIVE}");
            EnvFilter::new(DEFAULT_DIRECTIVE)
        }),
        Err(_) => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
        }
    }
}

/// Initialize the tracing subscriber based on configuration and environment variables.
///
/// A daily rolling JSON file is always written under `config.directory`. The
/// console layer goes to stderr, never stdout, so it cannot corrupt the
/// terminal UI or the JSON lines of headless mode.
pub fn init_tracing(
    service_name: &str,
    config: &LoggingConfig,
    sink: LogSink,
) -> Result<TracingGuard> {
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!(
            "unable to create log directory {}",
            config.directory.display()
        )
    })?;
    let prefix = config
        .file_prefix
        .clone()
        .unwrap_or_else(|| service_name.to_owned());

    let file_appender = daily(&config.directory, format!("{prefix}.log"));
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let mut writers = vec![file_guard];

    let file_layer = fmt::layer()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .json()
        .with_writer(file_writer)
        .boxed();

    let console_layer = match sink {
        LogSink::FileOnly => None,
        LogSink::FileAndStderr => {
            let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
            writers.push(stderr_guard);
            let layer = match config.format {
                LogFormat::StructuredJson => fmt::layer()
                    .with_target(false)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .json()
                    .with_writer(stderr_writer)
                    .boxed(),
                LogFormat::Pretty => fmt::layer()
                    .with_target(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_writer(stderr_writer)
                    .boxed(),
            };
            Some(layer)
        }
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .ok();

    info!(
        service = %service_name,
        log_dir = %config.directory.display(),
        format = ?config.format,
        sink = ?sink,
        "tracing initialised"
    );
    Ok(TracingGuard { _writers: writers })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_uses_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: LogFormat,
        }
        let parsed: Wrapper = toml::from_str("format = \"structured-json\"").unwrap();
        assert_eq!(parsed.format, LogFormat::StructuredJson);
        let parsed: Wrapper = toml::from_str("format = \"pretty\"").unwrap();
        assert_eq!(parsed.format, LogFormat::Pretty);
    }

    #[test]
    fn init_creates_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            directory: dir.path().join("logs"),
            format: LogFormat::Pretty,
            file_prefix: Some("unit".to_owned()),
        };
        let _guard = init_tracing("twin-test", &config, LogSink::FileOnly).unwrap();
        assert!(config.directory.is_dir());
    }
}
