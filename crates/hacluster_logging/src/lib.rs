//! Shared logging setup for hacluster binaries.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILTER: &str =
    "hacluster=info,hacluster_cluster=info,hacluster_config=info,hacluster_db=info";

/// Logging configuration shared by hacluster binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Lower the console threshold to debug when RUST_LOG is unset.
    pub verbose: bool,
    /// Directory for the daily-rolling log file; `None` logs to stderr only.
    pub log_dir: Option<PathBuf>,
}

/// Initialize tracing with stderr output and an optional daily log file.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init_logging(config: LogConfig<'_>) -> Result<Option<WorkerGuard>> {
    let file_filter = base_filter();
    let console_filter = if config.verbose && std::env::var_os("RUST_LOG").is_none() {
        EnvFilter::new(verbose_filter())
    } else {
        base_filter()
    };

    let mut guard = None;
    let file_layer = match config.log_dir.as_deref() {
        Some(dir) => {
            ensure_dir(dir)?;
            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", sanitize_name(config.app_name)));
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(worker_guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn base_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn verbose_filter() -> String {
    DEFAULT_LOG_FILTER.replace("=info", "=debug")
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}
