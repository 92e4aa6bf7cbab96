//! Configuration snapshots for reproducibility.
//!
//! A snapshot records which document and priors produced a parameter set, so a
//! run can be matched to the exact configuration it was started with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::params::{Origin, ResolutionReport};
use crate::priors::PriorConfig;
use crate::resolve::PriorPaths;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Document the parameters were resolved from.
    #[serde(default)]
    pub document_path: Option<String>,

    /// SHA-256 of the document text.
    pub document_hash: String,

    /// SHA-256 of the priors, serialized as JSON.
    pub priors_hash: String,

    /// Path where priors were loaded from.
    #[serde(default)]
    pub priors_path: Option<String>,

    /// Source of the priors.
    pub priors_source: String,

    /// Combined hash of document and priors (for quick comparison).
    pub combined_hash: String,

    /// Keys read from the document.
    pub from_document: usize,

    /// Keys left at their prior default.
    pub from_prior: usize,

    /// Document keys that were ignored.
    #[serde(default)]
    pub unrecognized_keys: Vec<String>,
}

impl ConfigSnapshot {
    /// Capture the inputs and outcome of a resolution.
    pub fn new(
        document_path: Option<&str>,
        document_text: &str,
        priors: &PriorConfig,
        paths: &PriorPaths,
        report: &ResolutionReport,
    ) -> Self {
        let document_hash = hash_content(document_text);
        // Serializing a plain struct of numbers cannot fail.
        let priors_json = serde_json::to_string(priors).unwrap_or_default();
        let priors_hash = hash_content(&priors_json);
        let combined_hash = hash_content(&format!("{}:{}", document_hash, priors_hash));

        ConfigSnapshot {
            timestamp: Utc::now(),
            document_path: document_path.map(str::to_string),
            document_hash,
            priors_hash,
            priors_path: paths.priors.as_ref().map(|p| p.display().to_string()),
            priors_source: paths.source.to_string(),
            combined_hash,
            from_document: report.count(Origin::Document),
            from_prior: report.count(Origin::Prior),
            unrecognized_keys: report.unrecognized_keys.clone(),
        }
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same inputs).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.combined_hash == other.combined_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.combined_hash[..12.min(self.combined_hash.len())]
    }
}

/// Hash content with SHA-256 and return hex string.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(text: &str, priors: &PriorConfig) -> ConfigSnapshot {
        ConfigSnapshot::new(
            Some("config.yaml"),
            text,
            priors,
            &PriorPaths::default(),
            &ResolutionReport::default(),
        )
    }

    #[test]
    fn test_hash_content() {
        let hash1 = hash_content("test");
        let hash2 = hash_content("test");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_snapshot_short_id() {
        let s = snapshot("a: 1", &PriorConfig::default());
        assert_eq!(s.short_id().len(), 12);
        assert_eq!(s.priors_source, "builtin default");
    }

    #[test]
    fn test_snapshot_matches_same_inputs() {
        let priors = PriorConfig::default();
        assert!(snapshot("a: 1", &priors).matches(&snapshot("a: 1", &priors)));
        assert!(!snapshot("a: 1", &priors).matches(&snapshot("a: 2", &priors)));

        let other = PriorConfig {
            sliding_window_size: 11,
            ..PriorConfig::default()
        };
        assert!(!snapshot("a: 1", &priors).matches(&snapshot("a: 1", &other)));
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let s = snapshot("a: 1", &PriorConfig::default());
        let json = s.to_json().unwrap();
        let restored = ConfigSnapshot::from_json(&json).unwrap();
        assert!(s.matches(&restored));
        assert_eq!(restored.document_path.as_deref(), Some("config.yaml"));
    }
}
