//! Diagnostic logging. Nothing reads these logs back; the bridge behaves the
//! same whether or not a subscriber is installed.

use anyhow::Result;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prelim_core::config::{expand_path, LogConfig};

/// Per-process log file name, so concurrent workers never share a file.
pub fn log_file_name() -> String {
    format!("prelim-bridge.{}.log", std::process::id())
}

/// Installs a global subscriber: stderr always, plus an append-only file in
/// `config.dir` when set. `RUST_LOG` overrides `config.level`. Keep the
/// returned guard alive for as long as file logging should flush.
pub fn init_tracing(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            let dir = expand_path(dir);
            fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::never(&dir, log_file_name());
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;
    Ok(guard)
}
