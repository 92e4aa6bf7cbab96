//! Prior file discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → /etc → defaults.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::priors::PriorConfig;
use crate::validate::validate_priors;

/// Where the prior file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/strapdown/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for PriorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriorSource::CliArgument => write!(f, "CLI argument"),
            PriorSource::Environment => write!(f, "environment variable"),
            PriorSource::XdgConfig => write!(f, "XDG config"),
            PriorSource::SystemConfig => write!(f, "system config"),
            PriorSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Discovered prior file.
#[derive(Debug, Clone, Default)]
pub struct PriorPaths {
    /// Path to the prior file, or None for built-in defaults.
    pub priors: Option<PathBuf>,

    /// Where it was found.
    pub source: PriorSource,
}

/// Environment variable names.
pub const ENV_PRIORS_PATH: &str = "STRAPDOWN_PRIORS";
pub const ENV_CONFIG_DIR: &str = "STRAPDOWN_CONFIG_DIR";

/// Prior file names, checked in order within each directory.
const PRIORS_FILENAMES: [&str; 2] = ["priors.yaml", "priors.json"];

/// Application name for XDG and system directories.
const APP_NAME: &str = "strapdown";

/// Locate the prior file.
///
/// Resolution order:
/// 1. Explicit CLI path (if it exists)
/// 2. `STRAPDOWN_PRIORS`
/// 3. `STRAPDOWN_CONFIG_DIR` + `priors.yaml` / `priors.json`
/// 4. XDG config directory (~/.config/strapdown/)
/// 5. System config (/etc/strapdown/)
/// 6. Built-in defaults (None)
pub fn resolve_priors(cli_priors: Option<&Path>) -> PriorPaths {
    // 1. CLI argument
    if let Some(path) = cli_priors {
        if path.exists() {
            return found(path.to_path_buf(), PriorSource::CliArgument);
        }
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_PRIORS_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return found(path, PriorSource::Environment);
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        if let Some(path) = first_in(Path::new(&config_dir)) {
            return found(path, PriorSource::Environment);
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        if let Some(path) = first_in(&dir) {
            return found(path, PriorSource::XdgConfig);
        }
    }

    // 5. System config
    if let Some(path) = first_in(&system_config_dir()) {
        return found(path, PriorSource::SystemConfig);
    }

    // 6. Built-in default
    debug!(source = %PriorSource::BuiltinDefault, "no prior file found");
    PriorPaths::default()
}

fn found(path: PathBuf, source: PriorSource) -> PriorPaths {
    debug!(path = %path.display(), source = %source, "prior file found");
    PriorPaths {
        priors: Some(path),
        source,
    }
}

fn first_in(dir: &Path) -> Option<PathBuf> {
    PRIORS_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Resolve, load and validate priors.
///
/// An explicit `cli_priors` path that does not exist is an error rather than
/// a silent fallback.
pub fn load_priors(cli_priors: Option<&Path>) -> ConfigResult<(PriorConfig, PriorPaths)> {
    if let Some(path) = cli_priors {
        if !path.exists() {
            return Err(ConfigError::load(
                path.display().to_string(),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }
    }

    let paths = resolve_priors(cli_priors);
    let priors = match &paths.priors {
        Some(path) => PriorConfig::from_file(path)?,
        None => PriorConfig::default(),
    };
    validate_priors(&priors)?;
    info!(source = %paths.source, "priors loaded");
    Ok((priors, paths))
}

/// The XDG config directory for strapdown.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// The system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
