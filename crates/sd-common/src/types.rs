//! Linear-algebra aliases for estimator parameters.
//!
//! Quaternions are addressed coefficient-wise in `[x, y, z, w]` order, which is
//! also the storage order of [`nalgebra::Quaternion::coords`].

use nalgebra::Vector4;

/// 3-vector of doubles (translations).
pub type Vector3 = nalgebra::Vector3<f64>;

/// 2×2 matrix of doubles (keypoint noise).
pub type Matrix2 = nalgebra::Matrix2<f64>;

/// 3×3 matrix of doubles (intrinsics, IMU noise).
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Rotation quaternion. Not normalised on construction.
pub type Quaternion = nalgebra::Quaternion<f64>;

/// Build a quaternion from `[x, y, z, w]` coefficients.
pub fn quaternion_from_xyzw(coeffs: [f64; 4]) -> Quaternion {
    Quaternion::from(Vector4::from(coeffs))
}

/// Coefficients of `q` in `[x, y, z, w]` order.
pub fn quaternion_to_xyzw(q: &Quaternion) -> [f64; 4] {
    [q.coords[0], q.coords[1], q.coords[2], q.coords[3]]
}

/// Pinhole camera matrix with the given focal lengths and principal point.
///
/// Starts from identity, so the skew and bottom row stay `0, 0, 1`.
pub fn intrinsic_matrix(fx: f64, fy: f64, cx: f64, cy: f64) -> Matrix3 {
    let mut k = Matrix3::identity();
    k[(0, 0)] = fx;
    k[(1, 1)] = fy;
    k[(0, 2)] = cx;
    k[(1, 2)] = cy;
    k
}

/// Inverse of [`intrinsic_matrix`]: `[fx, fy, cx, cy]`.
pub fn intrinsic_coefficients(k: &Matrix3) -> [f64; 4] {
    [k[(0, 0)], k[(1, 1)], k[(0, 2)], k[(1, 2)]]
}
