//! Resolution errors.
//!
//! Every variant names exactly one offending resource or configuration key.

use thiserror::Error;

/// Result alias for resolution operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading a document or resolving parameters from it.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration source could not be opened or read.
    #[error("Failed to load {resource}: {source}")]
    LoadError {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    /// The source was read but is not a well-formed document.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A mandatory key is absent from the document.
    #[error("Missing mandatory configuration key: {0}")]
    ConfigMissing(String),

    /// A key is present but its value has the wrong shape or scalar type.
    #[error("Type error at configuration key: {0}")]
    TypeError(String),

    /// A prior default failed semantic validation.
    #[error("Invalid prior value for {field}: {message}")]
    InvalidPrior { field: String, message: String },
}

impl ConfigError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::LoadError { .. } => 40,
            ConfigError::ParseError(_) => 41,
            ConfigError::ConfigMissing(_) => 42,
            ConfigError::TypeError(_) => 43,
            ConfigError::InvalidPrior { .. } => 44,
        }
    }

    /// The dotted configuration key this error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::ConfigMissing(path) | ConfigError::TypeError(path) => Some(path),
            ConfigError::InvalidPrior { field, .. } => Some(field),
            _ => None,
        }
    }

    /// The resource identifier for load failures.
    pub fn resource(&self) -> Option<&str> {
        match self {
            ConfigError::LoadError { resource, .. } => Some(resource),
            _ => None,
        }
    }

    pub(crate) fn load(resource: impl Into<String>, source: std::io::Error) -> Self {
        ConfigError::LoadError {
            resource: resource.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            ConfigError::load("a.yaml", std::io::Error::from(std::io::ErrorKind::NotFound)),
            ConfigError::ParseError("bad".to_string()),
            ConfigError::ConfigMissing("camera.intrinsic".to_string()),
            ConfigError::TypeError("camera.noise".to_string()),
            ConfigError::InvalidPrior {
                field: "sliding_window_size".to_string(),
                message: "must be positive".to_string(),
            },
        ];
        let mut codes: Vec<u32> = errors.iter().map(ConfigError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_path_and_resource_accessors() {
        let missing = ConfigError::ConfigMissing("imu.noise.cov_g".to_string());
        assert_eq!(missing.path(), Some("imu.noise.cov_g"));
        assert_eq!(missing.resource(), None);

        let load = ConfigError::load("/nope.yaml", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(load.resource(), Some("/nope.yaml"));
        assert_eq!(load.path(), None);
        assert!(load.to_string().contains("/nope.yaml"));
    }

    #[test]
    fn test_display_names_key() {
        let err = ConfigError::TypeError("sliding_window_size".to_string());
        assert!(err.to_string().contains("sliding_window_size"));
    }
}
