//! Tracing setup shared by the dashboard binary and integration tests.

use tracing_appender::{non_blocking::WorkerGuard, rolling};

use crate::config;

/// Installs the global tracing subscriber.
///
/// Log lines always go to a daily-rolling file under `logs/`; stdout output
/// is additionally enabled when `LOG_TO_STDOUT=true`. The returned guard must
/// stay alive for the duration of the program, otherwise buffered lines are
/// dropped on shutdown.
pub fn init_logging(log_file: &str, log_level: &str) -> WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let log_to_stdout = config::log_to_stdout();

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(true);

    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if log_to_stdout {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
