//! Strapdown shared types.
//!
//! This crate provides:
//! - Fixed-size vector, matrix and quaternion aliases used by every estimator parameter
//! - Scope-exit timers for instrumenting call sites

pub mod timer;
pub mod types;

pub use timer::{timer, ScopedTimer};
pub use types::{Matrix2, Matrix3, Quaternion, Vector3};

#[doc(hidden)]
pub use tracing as __tracing;
