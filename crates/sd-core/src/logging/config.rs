//! Logging configuration.
//!
//! Sources, lowest to highest precedence: `RUST_LOG`, `SD_LOG`,
//! `SD_LOG_FORMAT`, then the `-v` / `-q` / `--log-format` flags.

use clap::ValueEnum;

/// Where log lines go and how they look. Always stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Console lines with timestamps.
    #[default]
    #[value(alias = "console")]
    Human,
    /// One JSON object per line.
    #[value(alias = "json")]
    Jsonl,
}

/// Minimum level for workspace crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    /// Unknown document keys are reported at this level.
    #[default]
    #[value(alias = "warning")]
    Warn,
    Error,
    #[value(aliases = ["none", "quiet"])]
    Off,
}

impl LogLevel {
    /// Level implied by `-v` / `-q` counts.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Directive spelling understood by `EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Raw `RUST_LOG` directives, used verbatim when neither `SD_LOG` nor a
    /// CLI flag picked a level.
    pub env_filter: Option<String>,
}

impl LogConfig {
    /// Create config from environment and CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    /// Same as [`LogConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let env_level = lookup("SD_LOG").and_then(|v| LogLevel::from_str(v.trim(), true).ok());
        let env_format =
            lookup("SD_LOG_FORMAT").and_then(|v| LogFormat::from_str(v.trim(), true).ok());

        let env_filter = match (cli_level, env_level) {
            (None, None) => lookup("RUST_LOG").filter(|v| !v.trim().is_empty()),
            _ => None,
        };

        LogConfig {
            format: cli_format.or(env_format).unwrap_or_default(),
            level: cli_level.or(env_level).unwrap_or_default(),
            env_filter,
        }
    }
}
