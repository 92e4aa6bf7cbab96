//! Prior file discovery and loading through the environment.
//!
//! Covers:
//! - Resolution order (CLI > env path > config dir > XDG)
//! - Validation of discovered files
//! - Snapshot provenance

use sd_config::resolve::{ENV_CONFIG_DIR, ENV_PRIORS_PATH};
use sd_config::{
    load_priors, resolve_priors, ConfigError, ConfigSnapshot, ParameterSetBuilder, PriorSource,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const ENV_KEYS: [&str; 3] = [ENV_PRIORS_PATH, ENV_CONFIG_DIR, "XDG_CONFIG_HOME"];

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let mut saved = Vec::with_capacity(keys.len());
        for key in keys {
            saved.push(env::var(key).ok());
        }
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (idx, key) in self.keys.iter().enumerate() {
            match self.saved.get(idx).and_then(|v| v.as_ref()) {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .expect("env lock poisoned");
    f()
}

fn write_priors(dir: &Path, name: &str, body: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("create priors dir");
    let path = dir.join(name);
    fs::write(&path, body).expect("write priors");
    path
}

/// Point every discovery location at an empty temp tree.
fn isolate(temp: &TempDir) {
    env::remove_var(ENV_PRIORS_PATH);
    env::remove_var(ENV_CONFIG_DIR);
    env::set_var("XDG_CONFIG_HOME", temp.path().join("xdg"));
}

#[test]
fn cli_path_beats_environment() {
    with_env_lock(|| {
        let _env = EnvGuard::new(&ENV_KEYS);
        let temp = TempDir::new().unwrap();
        isolate(&temp);

        let cli = write_priors(&temp.path().join("cli"), "priors.yaml", "sliding_window_size: 3\n");
        let env_file = write_priors(&temp.path().join("env"), "priors.yaml", "sliding_window_size: 4\n");
        env::set_var(ENV_PRIORS_PATH, &env_file);

        let (priors, paths) = load_priors(Some(&cli)).unwrap();
        assert_eq!(paths.source, PriorSource::CliArgument);
        assert_eq!(priors.sliding_window_size, 3);
    });
}

#[test]
fn env_path_beats_config_dir() {
    with_env_lock(|| {
        let _env = EnvGuard::new(&ENV_KEYS);
        let temp = TempDir::new().unwrap();
        isolate(&temp);

        let env_file = write_priors(&temp.path().join("env"), "custom.json", r#"{"solver_iteration_limit": 7}"#);
        let config_dir = temp.path().join("config");
        write_priors(&config_dir, "priors.yaml", "solver_iteration_limit: 8\n");
        env::set_var(ENV_PRIORS_PATH, &env_file);
        env::set_var(ENV_CONFIG_DIR, &config_dir);

        let (priors, paths) = load_priors(None).unwrap();
        assert_eq!(paths.source, PriorSource::Environment);
        assert_eq!(paths.priors.unwrap(), env_file);
        assert_eq!(priors.solver_iteration_limit, 7);
    });
}

#[test]
fn config_dir_is_used_when_no_direct_path() {
    with_env_lock(|| {
        let _env = EnvGuard::new(&ENV_KEYS);
        let temp = TempDir::new().unwrap();
        isolate(&temp);

        let config_dir = temp.path().join("config");
        let file = write_priors(&config_dir, "priors.json", r#"{"initializer_min_matches": 12}"#);
        env::set_var(ENV_CONFIG_DIR, &config_dir);

        let (priors, paths) = load_priors(None).unwrap();
        assert_eq!(paths.source, PriorSource::Environment);
        assert_eq!(paths.priors.unwrap(), file);
        assert_eq!(priors.initializer_min_matches, 12);
    });
}

#[cfg(target_os = "linux")]
#[test]
fn xdg_config_dir_is_searched() {
    with_env_lock(|| {
        let _env = EnvGuard::new(&ENV_KEYS);
        let temp = TempDir::new().unwrap();
        isolate(&temp);

        let xdg_app = temp.path().join("xdg").join("strapdown");
        write_priors(&xdg_app, "priors.yaml", "plane_distance_cov: 0.5\n");

        let paths = resolve_priors(None);
        assert_eq!(paths.source, PriorSource::XdgConfig);
        let (priors, _) = load_priors(None).unwrap();
        assert_eq!(priors.plane_distance_cov, 0.5);
    });
}

#[test]
fn invalid_discovered_priors_are_rejected() {
    with_env_lock(|| {
        let _env = EnvGuard::new(&ENV_KEYS);
        let temp = TempDir::new().unwrap();
        isolate(&temp);

        let file = write_priors(
            &temp.path().join("env"),
            "priors.yaml",
            "feature_tracker_max_init_frames: 500\nfeature_tracker_max_frames: 100\n",
        );
        env::set_var(ENV_PRIORS_PATH, &file);

        let err = load_priors(None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrior { .. }), "got {err:?}");
        assert_eq!(err.path(), Some("feature_tracker_max_init_frames"));
        assert_eq!(err.code(), 44);
    });
}

#[test]
fn snapshot_records_prior_provenance() {
    with_env_lock(|| {
        let _env = EnvGuard::new(&ENV_KEYS);
        let temp = TempDir::new().unwrap();
        isolate(&temp);

        let file = write_priors(&temp.path().join("env"), "priors.yaml", "sliding_window_size: 9\n");
        env::set_var(ENV_PRIORS_PATH, &file);

        let (priors, paths) = load_priors(None).unwrap();
        let doc_path = fixtures_dir().join("minimal.yaml");
        let text = fs::read_to_string(&doc_path).unwrap();
        let resolved = ParameterSetBuilder::new(&priors).build_str(&text).unwrap();
        assert_eq!(resolved.params.sliding_window_size(), 9);

        let snapshot = ConfigSnapshot::new(
            Some(&doc_path.display().to_string()),
            &text,
            &priors,
            &paths,
            &resolved.report,
        );
        assert_eq!(snapshot.priors_source, "environment variable");
        assert_eq!(snapshot.priors_path, Some(file.display().to_string()));
        assert_eq!(snapshot.from_document, 10);
        assert_eq!(snapshot.from_prior, 17);
    });
}
