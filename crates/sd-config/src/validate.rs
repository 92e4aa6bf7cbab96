//! Semantic validation of prior defaults.
//!
//! Documents are only shape-checked; priors come from a separate file that the
//! estimator trusts blindly, so they get a sanity pass before use.

use crate::error::{ConfigError, ConfigResult};
use crate::priors::PriorConfig;

/// Validate prior defaults semantically.
pub fn validate_priors(priors: &PriorConfig) -> ConfigResult<()> {
    require_non_negative("plane_distance_cov", priors.plane_distance_cov)?;

    let norm = priors.output_to_body_rotation.norm();
    if !norm.is_finite() || norm == 0.0 {
        return Err(ConfigError::InvalidPrior {
            field: "output_to_body_rotation".to_string(),
            message: format!("Must be a non-zero finite quaternion, got norm {}", norm),
        });
    }

    if priors
        .output_to_body_translation
        .iter()
        .any(|v| !v.is_finite())
    {
        return Err(ConfigError::InvalidPrior {
            field: "output_to_body_translation".to_string(),
            message: "Must be finite".to_string(),
        });
    }

    require_positive_count("sliding_window_size", priors.sliding_window_size)?;

    require_non_negative(
        "feature_tracker_min_keypoint_distance",
        priors.feature_tracker_min_keypoint_distance,
    )?;
    require_positive_count(
        "feature_tracker_max_keypoint_detection",
        priors.feature_tracker_max_keypoint_detection,
    )?;
    if priors.feature_tracker_max_init_frames > priors.feature_tracker_max_frames {
        return Err(ConfigError::InvalidPrior {
            field: "feature_tracker_max_init_frames".to_string(),
            message: format!(
                "Must not exceed feature_tracker_max_frames ({}), got {}",
                priors.feature_tracker_max_frames, priors.feature_tracker_max_init_frames
            ),
        });
    }

    require_positive_count("initializer_keyframe_gap", priors.initializer_keyframe_gap)?;
    require_non_negative("initializer_min_parallax", priors.initializer_min_parallax)?;

    require_positive_count("solver_iteration_limit", priors.solver_iteration_limit)?;
    if priors.solver_time_limit.is_nan() || priors.solver_time_limit <= 0.0 {
        return Err(ConfigError::InvalidPrior {
            field: "solver_time_limit".to_string(),
            message: format!("Must be positive, got {}", priors.solver_time_limit),
        });
    }

    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidPrior {
            field: field.to_string(),
            message: format!("Must be finite and non-negative, got {}", value),
        })
    }
}

fn require_positive_count(field: &str, value: usize) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::InvalidPrior {
            field: field.to_string(),
            message: "Must be positive".to_string(),
        });
    }
    Ok(())
}
