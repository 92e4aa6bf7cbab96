//! Prior defaults for optional parameters.
//!
//! A [`PriorConfig`] seeds every optional slot of a parameter set before the
//! document is consulted. It is an ordinary value handed to the builder, so
//! resolution stays a function of (document, priors, bindings).

use std::path::Path;

use serde::{Deserialize, Serialize};

use sd_common::types::{Quaternion, Vector3};

use crate::error::{ConfigError, ConfigResult};

/// Defaults for every optional parameter.
///
/// Prior files may set any subset of these fields; the rest keep the built-in
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriorConfig {
    /// Plane-distance measurement variance.
    pub plane_distance_cov: f64,

    /// Output frame rotation, `[x, y, z, w]`.
    pub output_to_body_rotation: Quaternion,

    /// Output frame translation.
    pub output_to_body_translation: Vector3,

    /// Keyframes kept in the optimisation window.
    pub sliding_window_size: usize,

    /// Minimum pixel distance between detected keypoints.
    pub feature_tracker_min_keypoint_distance: f64,
    pub feature_tracker_max_keypoint_detection: usize,
    pub feature_tracker_max_init_frames: usize,
    pub feature_tracker_max_frames: usize,
    pub feature_tracker_predict_keypoints: bool,

    pub initializer_keyframe_gap: usize,
    pub initializer_min_matches: usize,
    /// Minimum parallax in pixels before attempting initialization.
    pub initializer_min_parallax: f64,
    pub initializer_min_triangulation: usize,
    pub initializer_min_landmarks: usize,
    pub initializer_refine_imu: bool,

    pub solver_iteration_limit: usize,
    /// Solver wall-clock budget in seconds.
    pub solver_time_limit: f64,
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            plane_distance_cov: 1.0e-4,
            output_to_body_rotation: Quaternion::identity(),
            output_to_body_translation: Vector3::zeros(),
            sliding_window_size: 10,
            feature_tracker_min_keypoint_distance: 20.0,
            feature_tracker_max_keypoint_detection: 150,
            feature_tracker_max_init_frames: 60,
            feature_tracker_max_frames: 200,
            feature_tracker_predict_keypoints: true,
            initializer_keyframe_gap: 5,
            initializer_min_matches: 50,
            initializer_min_parallax: 10.0,
            initializer_min_triangulation: 20,
            initializer_min_landmarks: 30,
            initializer_refine_imu: true,
            solver_iteration_limit: 10,
            solver_time_limit: 1.0e6,
        }
    }
}

impl PriorConfig {
    /// Load priors from a JSON or YAML file, chosen by extension.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::load(path.display().to_string(), e))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse priors from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ConfigError::ParseError(format!("Invalid priors JSON: {}", e)))
    }

    /// Parse priors from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| ConfigError::ParseError(format!("Invalid priors YAML: {}", e)))
    }
}
