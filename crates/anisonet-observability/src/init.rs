// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console (stdout/stderr) output in text or JSON, or a timestamped log file
//! when built with `file-logging`.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LogOutput, LoggingConfig};

/// Keeps file writers alive; logs are flushed when it is dropped.
#[derive(Default)]
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    log_file: Option<PathBuf>,
}

impl LoggingGuard {
    /// Path of the log file, when logging to a file
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// File name for a run started now: `anisonet_<YYYYmmdd_HHMMSS>.log`.
pub fn run_log_file_name() -> String {
    format!("anisonet_{}.log", Utc::now().format("%Y%m%d_%H%M%S"))
}

/// Filter from `RUST_LOG` when set, otherwise from the config level and debug flags.
pub fn build_filter(config: &LoggingConfig, debug_flags: &CrateDebugFlags) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = debug_flags.to_filter_string(&config.level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter: {}", directives))
}

fn console_layer<W>(format: LogFormat, writer: W) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true);
    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails on an invalid filter, an unusable log directory, file output without
/// the `file-logging` feature, or when a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig, debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    let filter = build_filter(config, debug_flags)?;
    let mut guard = LoggingGuard::default();

    let layer = match &config.output {
        LogOutput::Stdout => console_layer(config.format, std::io::stdout),
        LogOutput::Stderr => console_layer(config.format, std::io::stderr),
        LogOutput::File(dir) => file_layer(config.format, dir, &mut guard)?,
    };

    Registry::default()
        .with(layer.with_filter(filter))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(feature = "file-logging")]
fn file_layer(
    format: LogFormat,
    dir: &Path,
    guard: &mut LoggingGuard,
) -> Result<Box<dyn Layer<Registry> + Send + Sync>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let file_name = run_log_file_name();
    let appender = tracing_appender::rolling::never(dir, &file_name);
    let (writer, worker) = tracing_appender::non_blocking(appender);
    guard._file_guard = Some(worker);
    guard.log_file = Some(dir.join(file_name));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);
    Ok(match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    })
}

#[cfg(not(feature = "file-logging"))]
fn file_layer(
    _format: LogFormat,
    dir: &Path,
    _guard: &mut LoggingGuard,
) -> Result<Box<dyn Layer<Registry> + Send + Sync>> {
    anyhow::bail!(
        "File logging to {} requires the `file-logging` feature",
        dir.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_log_file_name() {
        let name = run_log_file_name();
        assert!(name.starts_with("anisonet_") && name.ends_with(".log"));
        assert_eq!(name.len(), "anisonet_20250101_120000.log".len());
    }

    #[test]
    fn test_filter_from_config_and_flags() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig::default().with_level("WARN");
        let flags = CrateDebugFlags::from_args(vec!["--debug-anisonet-config".to_string()]);
        let filter = build_filter(&config, &flags).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("anisonet-config=debug"), "{}", rendered);
        assert!(rendered.contains("warn"), "{}", rendered);
    }

    #[cfg(not(feature = "file-logging"))]
    #[test]
    fn test_file_output_needs_feature() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig::default().with_output(LogOutput::File(dir.path().to_path_buf()));
        let err = init_logging(&config, &CrateDebugFlags::default()).err().unwrap();
        assert!(err.to_string().contains("file-logging"));
    }
}
