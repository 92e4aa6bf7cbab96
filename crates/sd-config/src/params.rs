//! The resolved parameter set and the builder that produces it.
//!
//! Construction runs through a fixed sequence of stages:
//!
//! ```text
//! Seeded ──► DocumentLoaded ──► Resolving ──► Complete
//!               │                   │
//!               ▼                   ▼
//!           LoadFailed            Failed
//! ```
//!
//! Priors seed every optional slot, the document is loaded, then bindings are
//! applied in table order. The first failing binding aborts the whole
//! construction; a [`ParameterSet`] is only ever handed out complete.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use sd_common::debug_timer;
use sd_common::types::{Matrix2, Matrix3, Quaternion, Vector3};

use crate::binding::{Binding, Requirement, BINDINGS};
use crate::document::{self, DocumentNode};
use crate::error::ConfigResult;
use crate::path::{find_node, find_required, SEPARATOR};
use crate::priors::PriorConfig;

/// Construction stage, reported in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Seeded,
    DocumentLoaded,
    LoadFailed,
    Resolving,
    Complete,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Seeded => write!(f, "seeded"),
            Stage::DocumentLoaded => write!(f, "document_loaded"),
            Stage::LoadFailed => write!(f, "load_failed"),
            Stage::Resolving => write!(f, "resolving"),
            Stage::Complete => write!(f, "complete"),
            Stage::Failed => write!(f, "failed"),
        }
    }
}

/// Fully resolved estimator parameters.
///
/// Immutable once built; every accessor returns a copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pub(crate) camera_intrinsic: Matrix3,
    pub(crate) camera_to_body_rotation: Quaternion,
    pub(crate) camera_to_body_translation: Vector3,
    pub(crate) keypoint_noise_cov: Matrix2,
    pub(crate) imu_to_body_rotation: Quaternion,
    pub(crate) imu_to_body_translation: Vector3,
    pub(crate) gyroscope_noise_cov: Matrix3,
    pub(crate) accelerometer_noise_cov: Matrix3,
    pub(crate) gyroscope_bias_noise_cov: Matrix3,
    pub(crate) accelerometer_bias_noise_cov: Matrix3,
    pub(crate) plane_distance_cov: f64,
    pub(crate) output_to_body_rotation: Quaternion,
    pub(crate) output_to_body_translation: Vector3,
    pub(crate) sliding_window_size: usize,
    pub(crate) feature_tracker_min_keypoint_distance: f64,
    pub(crate) feature_tracker_max_keypoint_detection: usize,
    pub(crate) feature_tracker_max_init_frames: usize,
    pub(crate) feature_tracker_max_frames: usize,
    pub(crate) feature_tracker_predict_keypoints: bool,
    pub(crate) initializer_keyframe_gap: usize,
    pub(crate) initializer_min_matches: usize,
    pub(crate) initializer_min_parallax: f64,
    pub(crate) initializer_min_triangulation: usize,
    pub(crate) initializer_min_landmarks: usize,
    pub(crate) initializer_refine_imu: bool,
    pub(crate) solver_iteration_limit: usize,
    pub(crate) solver_time_limit: f64,
}

impl ParameterSet {
    /// Optional slots from `priors`; mandatory slots at identity/zero until resolved.
    pub(crate) fn seeded(priors: &PriorConfig) -> Self {
        Self {
            camera_intrinsic: Matrix3::identity(),
            camera_to_body_rotation: Quaternion::identity(),
            camera_to_body_translation: Vector3::zeros(),
            keypoint_noise_cov: Matrix2::zeros(),
            imu_to_body_rotation: Quaternion::identity(),
            imu_to_body_translation: Vector3::zeros(),
            gyroscope_noise_cov: Matrix3::zeros(),
            accelerometer_noise_cov: Matrix3::zeros(),
            gyroscope_bias_noise_cov: Matrix3::zeros(),
            accelerometer_bias_noise_cov: Matrix3::zeros(),
            plane_distance_cov: priors.plane_distance_cov,
            output_to_body_rotation: priors.output_to_body_rotation,
            output_to_body_translation: priors.output_to_body_translation,
            sliding_window_size: priors.sliding_window_size,
            feature_tracker_min_keypoint_distance: priors.feature_tracker_min_keypoint_distance,
            feature_tracker_max_keypoint_detection: priors.feature_tracker_max_keypoint_detection,
            feature_tracker_max_init_frames: priors.feature_tracker_max_init_frames,
            feature_tracker_max_frames: priors.feature_tracker_max_frames,
            feature_tracker_predict_keypoints: priors.feature_tracker_predict_keypoints,
            initializer_keyframe_gap: priors.initializer_keyframe_gap,
            initializer_min_matches: priors.initializer_min_matches,
            initializer_min_parallax: priors.initializer_min_parallax,
            initializer_min_triangulation: priors.initializer_min_triangulation,
            initializer_min_landmarks: priors.initializer_min_landmarks,
            initializer_refine_imu: priors.initializer_refine_imu,
            solver_iteration_limit: priors.solver_iteration_limit,
            solver_time_limit: priors.solver_time_limit,
        }
    }

    /// Resolve a YAML file against `priors`.
    pub fn from_file(path: &Path, priors: &PriorConfig) -> ConfigResult<Self> {
        ParameterSetBuilder::new(priors)
            .build_file(path)
            .map(Resolved::into_params)
    }

    /// Resolve YAML text against `priors`.
    pub fn from_yaml(text: &str, priors: &PriorConfig) -> ConfigResult<Self> {
        ParameterSetBuilder::new(priors)
            .build_str(text)
            .map(Resolved::into_params)
    }

    /// Render as a document in the same schema the resolver reads.
    ///
    /// Matrices are flattened row-major and quaternions written `[x, y, z, w]`,
    /// so the output resolves back to an equal set.
    pub fn to_document(&self) -> Value {
        let mut root = Mapping::new();
        for binding in BINDINGS.iter() {
            insert_path(&mut root, binding.path, binding.slot.render(self));
        }
        Value::Mapping(root)
    }

    /// Camera matrix `K`.
    pub fn camera_intrinsic(&self) -> Matrix3 {
        self.camera_intrinsic
    }

    pub fn camera_to_body_rotation(&self) -> Quaternion {
        self.camera_to_body_rotation
    }

    pub fn camera_to_body_translation(&self) -> Vector3 {
        self.camera_to_body_translation
    }

    pub fn imu_to_body_rotation(&self) -> Quaternion {
        self.imu_to_body_rotation
    }

    pub fn imu_to_body_translation(&self) -> Vector3 {
        self.imu_to_body_translation
    }

    /// Keypoint observation noise, in pixels².
    pub fn keypoint_noise_cov(&self) -> Matrix2 {
        self.keypoint_noise_cov
    }

    pub fn gyroscope_noise_cov(&self) -> Matrix3 {
        self.gyroscope_noise_cov
    }

    pub fn accelerometer_noise_cov(&self) -> Matrix3 {
        self.accelerometer_noise_cov
    }

    pub fn gyroscope_bias_noise_cov(&self) -> Matrix3 {
        self.gyroscope_bias_noise_cov
    }

    pub fn accelerometer_bias_noise_cov(&self) -> Matrix3 {
        self.accelerometer_bias_noise_cov
    }

    pub fn plane_distance_cov(&self) -> f64 {
        self.plane_distance_cov
    }

    pub fn output_to_body_rotation(&self) -> Quaternion {
        self.output_to_body_rotation
    }

    pub fn output_to_body_translation(&self) -> Vector3 {
        self.output_to_body_translation
    }

    pub fn sliding_window_size(&self) -> usize {
        self.sliding_window_size
    }

    pub fn feature_tracker_min_keypoint_distance(&self) -> f64 {
        self.feature_tracker_min_keypoint_distance
    }

    pub fn feature_tracker_max_keypoint_detection(&self) -> usize {
        self.feature_tracker_max_keypoint_detection
    }

    pub fn feature_tracker_max_init_frames(&self) -> usize {
        self.feature_tracker_max_init_frames
    }

    pub fn feature_tracker_max_frames(&self) -> usize {
        self.feature_tracker_max_frames
    }

    pub fn feature_tracker_predict_keypoints(&self) -> bool {
        self.feature_tracker_predict_keypoints
    }

    pub fn initializer_keyframe_gap(&self) -> usize {
        self.initializer_keyframe_gap
    }

    pub fn initializer_min_matches(&self) -> usize {
        self.initializer_min_matches
    }

    pub fn initializer_min_parallax(&self) -> f64 {
        self.initializer_min_parallax
    }

    pub fn initializer_min_triangulation(&self) -> usize {
        self.initializer_min_triangulation
    }

    pub fn initializer_min_landmarks(&self) -> usize {
        self.initializer_min_landmarks
    }

    pub fn initializer_refine_imu(&self) -> bool {
        self.initializer_refine_imu
    }

    pub fn solver_iteration_limit(&self) -> usize {
        self.solver_iteration_limit
    }

    /// Solver wall-clock budget in seconds.
    pub fn solver_time_limit(&self) -> f64 {
        self.solver_time_limit
    }
}

fn insert_path(map: &mut Mapping, path: &str, value: Value) {
    match path.split_once(SEPARATOR) {
        None => {
            map.insert(Value::String(path.to_string()), value);
        }
        Some((head, rest)) => {
            let key = Value::String(head.to_string());
            if !matches!(map.get(&key), Some(Value::Mapping(_))) {
                map.insert(key.clone(), Value::Mapping(Mapping::new()));
            }
            if let Some(Value::Mapping(child)) = map.get_mut(&key) {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Read from the document.
    Document,
    /// Key absent; prior default kept.
    Prior,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Document => write!(f, "document"),
            Origin::Prior => write!(f, "prior"),
        }
    }
}

/// Provenance of one binding.
#[derive(Debug, Clone, Serialize)]
pub struct BindingOutcome {
    pub path: &'static str,
    pub origin: Origin,
}

/// Per-key provenance of a successful resolution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionReport {
    /// One entry per binding, in resolution order.
    pub outcomes: Vec<BindingOutcome>,
    /// Document keys no binding recognizes. Accepted and ignored.
    pub unrecognized_keys: Vec<String>,
}

impl ResolutionReport {
    /// Origin of the value at `path`, if it is a bound key.
    pub fn origin(&self, path: &str) -> Option<Origin> {
        self.outcomes
            .iter()
            .find(|o| o.path == path)
            .map(|o| o.origin)
    }

    /// Number of bindings with the given origin.
    pub fn count(&self, origin: Origin) -> usize {
        self.outcomes.iter().filter(|o| o.origin == origin).count()
    }
}

/// A completed resolution.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub params: ParameterSet,
    pub report: ResolutionReport,
}

impl Resolved {
    pub fn into_params(self) -> ParameterSet {
        self.params
    }
}

/// Builds a [`ParameterSet`] from a document, prior defaults and a binding table.
#[derive(Debug, Clone, Copy)]
pub struct ParameterSetBuilder<'a> {
    priors: &'a PriorConfig,
    bindings: &'a [Binding],
}

impl<'a> ParameterSetBuilder<'a> {
    /// Builder over the standard binding table.
    pub fn new(priors: &'a PriorConfig) -> Self {
        Self {
            priors,
            bindings: &BINDINGS,
        }
    }

    /// Resolve against a different binding table.
    pub fn with_bindings(mut self, bindings: &'a [Binding]) -> Self {
        self.bindings = bindings;
        self
    }

    /// Load `path` and resolve it.
    pub fn build_file(&self, path: &Path) -> ConfigResult<Resolved> {
        let params = self.seed();
        let document = document::load_file(path).inspect_err(|e| {
            warn!(stage = %Stage::LoadFailed, source = %path.display(), error = %e, "configuration load failed");
        })?;
        debug!(stage = %Stage::DocumentLoaded, source = %path.display(), "configuration loaded");
        self.resolve(params, &document)
    }

    /// Parse `text` and resolve it.
    pub fn build_str(&self, text: &str) -> ConfigResult<Resolved> {
        let params = self.seed();
        let document = document::parse_str(text).inspect_err(|e| {
            warn!(stage = %Stage::LoadFailed, error = %e, "configuration parse failed");
        })?;
        debug!(stage = %Stage::DocumentLoaded, "configuration parsed");
        self.resolve(params, &document)
    }

    /// Resolve an already-loaded document.
    pub fn build<N: DocumentNode + ?Sized>(&self, root: &N) -> ConfigResult<Resolved> {
        let params = self.seed();
        self.resolve(params, root)
    }

    fn seed(&self) -> ParameterSet {
        let params = ParameterSet::seeded(self.priors);
        debug!(stage = %Stage::Seeded, "optional parameters seeded from priors");
        params
    }

    fn resolve<N: DocumentNode + ?Sized>(
        &self,
        mut params: ParameterSet,
        root: &N,
    ) -> ConfigResult<Resolved> {
        let _timer = debug_timer!("resolve parameters");
        debug!(stage = %Stage::Resolving, bindings = self.bindings.len(), "resolving bindings");

        let mut outcomes = Vec::with_capacity(self.bindings.len());
        for binding in self.bindings {
            let origin = apply(binding, root, &mut params).inspect_err(|e| {
                warn!(stage = %Stage::Failed, path = binding.path, error = %e, "parameter resolution failed");
            })?;
            outcomes.push(BindingOutcome {
                path: binding.path,
                origin,
            });
        }

        let mut unrecognized_keys = Vec::new();
        collect_unrecognized(root, "", self.bindings, &mut unrecognized_keys);
        for key in &unrecognized_keys {
            warn!(key = %key, "ignoring unrecognized configuration key");
        }

        let report = ResolutionReport {
            outcomes,
            unrecognized_keys,
        };
        info!(
            stage = %Stage::Complete,
            from_document = report.count(Origin::Document),
            from_prior = report.count(Origin::Prior),
            "parameter set resolved"
        );
        Ok(Resolved { params, report })
    }
}

fn apply<N: DocumentNode + ?Sized>(
    binding: &Binding,
    root: &N,
    params: &mut ParameterSet,
) -> ConfigResult<Origin> {
    let located = match binding.requirement {
        Requirement::Mandatory => find_required(root, binding.path)?,
        Requirement::Optional => match find_node(root, binding.path) {
            Some(located) => located,
            None => {
                debug!(path = binding.path, "key absent, keeping prior");
                return Ok(Origin::Prior);
            }
        },
    };
    binding.slot.assign(params, located)?;
    debug!(path = binding.path, shape = %binding.shape(), "key resolved");
    Ok(Origin::Document)
}

/// Dotted paths of document keys that are neither bound nor a prefix of a bound path.
fn collect_unrecognized<N: DocumentNode + ?Sized>(
    node: &N,
    prefix: &str,
    bindings: &[Binding],
    out: &mut Vec<String>,
) {
    for (key, child) in node.entries() {
        let path = if prefix.is_empty() {
            key.into_owned()
        } else {
            format!("{}{}{}", prefix, SEPARATOR, key)
        };

        if bindings.iter().any(|b| b.path == path) {
            continue;
        }

        let is_prefix = bindings.iter().any(|b| {
            b.path
                .strip_prefix(path.as_str())
                .is_some_and(|rest| rest.starts_with(SEPARATOR))
        });
        if !is_prefix {
            out.push(path);
        } else if child.kind() == crate::document::NodeKind::Mapping {
            collect_unrecognized(child, &path, bindings, out);
        } else {
            warn!(path = %path, kind = ?child.kind(), "expected a mapping, keys below it are ignored");
        }
    }
}
