use std::fs::OpenOptions;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::JsonFields;
use tracing_subscriber::prelude::*;

use crate::config;

/// Installs the JSON file logger. Stdout carries the protocol, so nothing is
/// ever written there.
///
/// The returned guard flushes buffered records when dropped and must be held
/// for the lifetime of the process.
pub fn init(level: &str, path: Option<&Path>) -> anyhow::Result<WorkerGuard> {
    let log_path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let data_dir = config::data_dir();
            std::fs::create_dir_all(&data_dir).inspect_err(|e| {
                eprintln!("Failed to create data directory: {}", e);
            })?;
            config::log_path()
        }
    };

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .inspect_err(|e| {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
        })?;
    let (writer, guard) = tracing_appender::non_blocking(log_file);

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(writer)
        .with_thread_names(true)
        .fmt_fields(JsonFields::default());

    // Use RUST_LOG if set, otherwise the requested level
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .try_init()?;

    Ok(guard)
}
