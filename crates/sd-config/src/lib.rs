//! Typed parameter resolution for the strapdown visual-inertial estimator.
//!
//! This crate provides:
//! - A document-node seam over the YAML parser
//! - Dotted-path resolution with shape and type validation
//! - A static binding table from document keys to typed parameters
//! - Prior defaults, their discovery and semantic validation
//! - Config snapshots for reproducibility
//!
//! ```
//! use sd_config::{ParameterSet, PriorConfig};
//!
//! let yaml = r#"
//! camera:
//!   intrinsic: [450.0, 450.0, 320.0, 240.0]
//!   extrinsic: { q_bc: [0, 0, 0, 1], p_bc: [0, 0, 0] }
//!   noise: [0.25, 0, 0, 0.25]
//! imu:
//!   extrinsic: { q_bi: [0, 0, 0, 1], p_bi: [0, 0, 0] }
//!   noise:
//!     cov_g: [1e-4, 0, 0, 0, 1e-4, 0, 0, 0, 1e-4]
//!     cov_a: [1e-3, 0, 0, 0, 1e-3, 0, 0, 0, 1e-3]
//!     cov_bg: [1e-6, 0, 0, 0, 1e-6, 0, 0, 0, 1e-6]
//!     cov_ba: [1e-5, 0, 0, 0, 1e-5, 0, 0, 0, 1e-5]
//! sliding_window_size: 8
//! "#;
//!
//! let params = ParameterSet::from_yaml(yaml, &PriorConfig::default()).unwrap();
//! assert_eq!(params.camera_intrinsic()[(0, 2)], 320.0);
//! assert_eq!(params.sliding_window_size(), 8);
//! ```

pub mod binding;
pub mod document;
pub mod error;
pub mod params;
pub mod path;
pub mod priors;
pub mod resolve;
pub mod shape;
pub mod snapshot;
pub mod validate;

pub use binding::{Binding, Requirement, BINDINGS};
pub use document::{DocumentNode, NodeKind};
pub use error::{ConfigError, ConfigResult};
pub use params::{Origin, ParameterSet, ParameterSetBuilder, ResolutionReport, Resolved, Stage};
pub use priors::PriorConfig;
pub use resolve::{load_priors, resolve_priors, PriorPaths, PriorSource};
pub use snapshot::ConfigSnapshot;
pub use shape::Shape;
pub use validate::validate_priors;
