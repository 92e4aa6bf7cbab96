//! Structured logging for sd-core.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for launch scripts and CI
//!
//! stdout is reserved for command payloads; all log output goes to stderr.
//!
//! ```ignore
//! use sd_core::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env(None, None);
//! init_logging(&config)?;
//! tracing::info!(path = "config.yaml", "resolving");
//! ```

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events pass the level filter.
const LOG_TARGETS: [&str; 3] = ["sd_core", "sd_config", "sd_common"];

/// Filter directives for `level` across the workspace crates.
pub fn filter_directives(level: LogLevel) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level.as_directive()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs. Raw `RUST_LOG`
/// directives are used only when nothing else chose a level.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::new(filter_spec(config));

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    }
}

/// Directives in effect for `config`. Unparseable `RUST_LOG` text falls
/// back to the configured level.
fn filter_spec(config: &LogConfig) -> String {
    match config.env_filter.as_deref() {
        Some(directives) if EnvFilter::try_new(directives).is_ok() => directives.to_string(),
        _ => filter_directives(config.level),
    }
}
