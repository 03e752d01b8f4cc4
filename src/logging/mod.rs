//! Structured logging setup for the registration pipeline.
//!
//! Console and optional file output over `tracing`, filtered through
//! `RUST_LOG` when set. Pipeline runs correlate their events with a
//! per-run id.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub global_level: String,
    pub console_output: bool,
    pub json_format: bool,
    /// When set, daily-rolled JSON logs are written into this directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            global_level: "info".to_string(),
            console_output: true,
            json_format: false,
            log_dir: None,
        }
    }
}

/// Initialize the logging system with the provided configuration.
///
/// Returns the worker guard keeping the file writer alive; hold on to it
/// for the lifetime of the program when file output is enabled.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match config.global_level.as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => "info",
        };
        EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            level
        ))
    });

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.console_output {
        let console_layer = if config.json_format {
            fmt::layer().json().boxed()
        } else {
            fmt::layer().with_target(true).boxed()
        };
        layers.push(console_layer);
    }

    let mut guard = None;
    if let Some(dir) = &config.log_dir {
        let appender = tracing_appender::rolling::daily(dir, "registration.log");
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        guard = Some(worker_guard);
        layers.push(fmt::layer().json().with_writer(writer).boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    Ok(guard)
}
