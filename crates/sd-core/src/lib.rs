//! strapdown core: command-line front end for parameter resolution.
//!
//! The binary validates and renders estimator configuration documents; this
//! library holds the pieces shared with its integration tests.

pub mod exit_codes;
pub mod logging;
pub mod output;

pub use exit_codes::ExitCode;
pub use output::OutputFormat;

/// Schema version of JSON payloads emitted by the CLI.
pub const SCHEMA_VERSION: &str = "1.0.0";
