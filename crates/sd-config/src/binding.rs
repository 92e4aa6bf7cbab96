//! The binding table: every recognized configuration key.
//!
//! Each [`Binding`] ties a dotted path to a typed slot of [`ParameterSet`] and
//! says whether the key must be present. The table is static, so every key
//! can be exercised in tests without building a whole document, and its order
//! is the order in which keys are resolved.

use std::fmt;

use serde_yaml::Value;

use sd_common::types::{
    intrinsic_coefficients, intrinsic_matrix, quaternion_from_xyzw, quaternion_to_xyzw, Matrix2,
    Matrix3, Quaternion, Vector3,
};

use crate::document::DocumentNode;
use crate::error::ConfigResult;
use crate::params::ParameterSet;
use crate::path::Located;
use crate::shape::{read_array, read_bool, read_float, read_matrix, read_unsigned, Shape};

/// Whether a key must appear in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Absence fails resolution with `ConfigMissing`.
    Mandatory,
    /// Absence keeps the prior default.
    Optional,
}

/// Shared and exclusive access to one [`ParameterSet`] field.
#[derive(Clone, Copy)]
pub struct Field<T: 'static> {
    get: fn(&ParameterSet) -> &T,
    get_mut: fn(&mut ParameterSet) -> &mut T,
}

macro_rules! field {
    ($name:ident) => {
        Field {
            get: |p| &p.$name,
            get_mut: |p| &mut p.$name,
        }
    };
}

/// Typed destination for a bound value.
#[derive(Clone, Copy)]
pub enum Slot {
    Flag(Field<bool>),
    Count(Field<usize>),
    Real(Field<f64>),
    /// 3-vector.
    Translation(Field<Vector3>),
    /// 4-vector of quaternion coefficients `[x, y, z, w]`.
    Rotation(Field<Quaternion>),
    /// Row-major 2×2.
    Covariance2(Field<Matrix2>),
    /// Row-major 3×3.
    Covariance3(Field<Matrix3>),
    /// 4-vector `[fx, fy, cx, cy]` expanded into a 3×3 camera matrix.
    Intrinsic(Field<Matrix3>),
}

impl Slot {
    /// Document layout this slot expects.
    pub fn shape(&self) -> Shape {
        match self {
            Slot::Flag(_) => Shape::Bool,
            Slot::Count(_) => Shape::Unsigned,
            Slot::Real(_) => Shape::Float,
            Slot::Translation(_) => Shape::Vector(3),
            Slot::Rotation(_) | Slot::Intrinsic(_) => Shape::Vector(4),
            Slot::Covariance2(_) => Shape::Matrix { rows: 2, cols: 2 },
            Slot::Covariance3(_) => Shape::Matrix { rows: 3, cols: 3 },
        }
    }

    /// Validate `located` against this slot's shape and store it.
    ///
    /// On error nothing is written.
    pub(crate) fn assign<N: DocumentNode + ?Sized>(
        &self,
        params: &mut ParameterSet,
        located: Located<'_, N>,
    ) -> ConfigResult<()> {
        match *self {
            Slot::Flag(field) => *(field.get_mut)(params) = read_bool(located)?,
            Slot::Count(field) => *(field.get_mut)(params) = read_unsigned(located)?,
            Slot::Real(field) => *(field.get_mut)(params) = read_float(located)?,
            Slot::Translation(field) => {
                *(field.get_mut)(params) = Vector3::from(read_array::<3, _>(located)?);
            }
            Slot::Rotation(field) => {
                *(field.get_mut)(params) = quaternion_from_xyzw(read_array::<4, _>(located)?);
            }
            Slot::Covariance2(field) => *(field.get_mut)(params) = read_matrix::<2, 2, _>(located)?,
            Slot::Covariance3(field) => *(field.get_mut)(params) = read_matrix::<3, 3, _>(located)?,
            Slot::Intrinsic(field) => {
                let [fx, fy, cx, cy] = read_array::<4, _>(located)?;
                *(field.get_mut)(params) = intrinsic_matrix(fx, fy, cx, cy);
            }
        }
        Ok(())
    }

    /// Current slot value in document form.
    pub(crate) fn render(&self, params: &ParameterSet) -> Value {
        match *self {
            Slot::Flag(field) => Value::Bool(*(field.get)(params)),
            Slot::Count(field) => Value::Number((*(field.get)(params) as u64).into()),
            Slot::Real(field) => Value::Number((*(field.get)(params)).into()),
            Slot::Translation(field) => float_sequence((field.get)(params).iter().copied()),
            Slot::Rotation(field) => float_sequence(quaternion_to_xyzw((field.get)(params))),
            Slot::Covariance2(field) => {
                float_sequence((field.get)(params).transpose().iter().copied())
            }
            Slot::Covariance3(field) => {
                float_sequence((field.get)(params).transpose().iter().copied())
            }
            Slot::Intrinsic(field) => float_sequence(intrinsic_coefficients((field.get)(params))),
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.shape())
    }
}

fn float_sequence(values: impl IntoIterator<Item = f64>) -> Value {
    Value::Sequence(values.into_iter().map(|v| Value::Number(v.into())).collect())
}

/// A recognized configuration key.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    /// Dotted document path.
    pub path: &'static str,
    pub requirement: Requirement,
    pub slot: Slot,
}

impl Binding {
    const fn mandatory(path: &'static str, slot: Slot) -> Self {
        Self {
            path,
            requirement: Requirement::Mandatory,
            slot,
        }
    }

    const fn optional(path: &'static str, slot: Slot) -> Self {
        Self {
            path,
            requirement: Requirement::Optional,
            slot,
        }
    }

    /// Expected document layout.
    pub fn shape(&self) -> Shape {
        self.slot.shape()
    }

    pub fn is_mandatory(&self) -> bool {
        self.requirement == Requirement::Mandatory
    }
}

/// Every recognized key, in resolution order.
pub static BINDINGS: [Binding; 27] = [
    // Camera
    Binding::mandatory("camera.intrinsic", Slot::Intrinsic(field!(camera_intrinsic))),
    Binding::mandatory("camera.extrinsic.q_bc", Slot::Rotation(field!(camera_to_body_rotation))),
    Binding::mandatory("camera.extrinsic.p_bc", Slot::Translation(field!(camera_to_body_translation))),
    Binding::mandatory("camera.noise", Slot::Covariance2(field!(keypoint_noise_cov))),
    // IMU
    Binding::mandatory("imu.extrinsic.q_bi", Slot::Rotation(field!(imu_to_body_rotation))),
    Binding::mandatory("imu.extrinsic.p_bi", Slot::Translation(field!(imu_to_body_translation))),
    Binding::mandatory("imu.noise.cov_g", Slot::Covariance3(field!(gyroscope_noise_cov))),
    Binding::mandatory("imu.noise.cov_a", Slot::Covariance3(field!(accelerometer_noise_cov))),
    Binding::mandatory("imu.noise.cov_bg", Slot::Covariance3(field!(gyroscope_bias_noise_cov))),
    Binding::mandatory("imu.noise.cov_ba", Slot::Covariance3(field!(accelerometer_bias_noise_cov))),
    // Optional tunables
    Binding::optional("plane.noise", Slot::Real(field!(plane_distance_cov))),
    Binding::optional("output.q_bo", Slot::Rotation(field!(output_to_body_rotation))),
    Binding::optional("output.p_bo", Slot::Translation(field!(output_to_body_translation))),
    Binding::optional("sliding_window_size", Slot::Count(field!(sliding_window_size))),
    Binding::optional(
        "feature_tracker.min_keypoint_distance",
        Slot::Real(field!(feature_tracker_min_keypoint_distance)),
    ),
    Binding::optional(
        "feature_tracker.max_keypoint_detection",
        Slot::Count(field!(feature_tracker_max_keypoint_detection)),
    ),
    Binding::optional(
        "feature_tracker.max_init_frames",
        Slot::Count(field!(feature_tracker_max_init_frames)),
    ),
    Binding::optional(
        "feature_tracker.max_frames",
        Slot::Count(field!(feature_tracker_max_frames)),
    ),
    Binding::optional(
        "feature_tracker.predict_keypoints",
        Slot::Flag(field!(feature_tracker_predict_keypoints)),
    ),
    Binding::optional("initializer.keyframe_gap", Slot::Count(field!(initializer_keyframe_gap))),
    Binding::optional("initializer.min_matches", Slot::Count(field!(initializer_min_matches))),
    Binding::optional("initializer.min_parallax", Slot::Real(field!(initializer_min_parallax))),
    Binding::optional(
        "initializer.min_triangulation",
        Slot::Count(field!(initializer_min_triangulation)),
    ),
    Binding::optional("initializer.min_landmarks", Slot::Count(field!(initializer_min_landmarks))),
    Binding::optional("initializer.refine_imu", Slot::Flag(field!(initializer_refine_imu))),
    Binding::optional("solver.iteration_limit", Slot::Count(field!(solver_iteration_limit))),
    Binding::optional("solver.time_limit", Slot::Real(field!(solver_time_limit))),
];

/// Look up the binding for `path`.
pub fn find_binding(path: &str) -> Option<&'static Binding> {
    BINDINGS.iter().find(|b| b.path == path)
}

/// Bindings that must be present in every document.
pub fn mandatory_bindings() -> impl Iterator<Item = &'static Binding> {
    BINDINGS.iter().filter(|b| b.is_mandatory())
}

/// Bindings that fall back to prior defaults.
pub fn optional_bindings() -> impl Iterator<Item = &'static Binding> {
    BINDINGS.iter().filter(|b| !b.is_mandatory())
}
