//! Exit codes for the sd-core CLI.
//!
//! Exit code ranges:
//! - 0: Success
//! - 2: Usage errors, reported by clap before any command runs
//! - 11-19: Configuration errors (fixable by editing a file or argument)
//! - 20-29: Internal errors

use sd_config::ConfigError;

/// Exit codes for sd-core operations.
///
/// These codes are a stable contract for scripts that validate
/// configuration before launching the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Configuration resolved cleanly.
    Clean = 0,

    // ========================================================================
    // Configuration Errors (11-19)
    // ========================================================================
    /// Document or prior file could not be read
    LoadError = 11,

    /// Document or prior file is malformed
    ParseError = 12,

    /// A mandatory key is absent
    MissingKey = 13,

    /// A key has the wrong shape or scalar type
    TypeError = 14,

    /// A prior default failed validation
    InvalidPrior = 15,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Check if this exit code is a configuration error (codes 11-19).
    pub fn is_config_error(self) -> bool {
        let code = self as i32;
        (10..20).contains(&code)
    }

    /// Check if this exit code is an internal error (codes 20-29).
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::LoadError => "ERR_LOAD",
            ExitCode::ParseError => "ERR_PARSE",
            ExitCode::MissingKey => "ERR_MISSING",
            ExitCode::TypeError => "ERR_TYPE",
            ExitCode::InvalidPrior => "ERR_PRIOR",
            ExitCode::InternalError => "ERR_INTERNAL",
        }
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(error: &ConfigError) -> Self {
        match error {
            ConfigError::LoadError { .. } => ExitCode::LoadError,
            ConfigError::ParseError(_) => ExitCode::ParseError,
            ConfigError::ConfigMissing(_) => ExitCode::MissingKey,
            ConfigError::TypeError(_) => ExitCode::TypeError,
            ConfigError::InvalidPrior { .. } => ExitCode::InvalidPrior,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
