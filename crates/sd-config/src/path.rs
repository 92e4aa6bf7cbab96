//! Dotted-path resolution.
//!
//! A path such as `imu.noise.cov_g` is walked one mapping key at a time from
//! the document root. Resolution is a pure function of the document and the
//! path; a missing key anywhere along the walk means the node is absent.

use crate::document::DocumentNode;
use crate::error::{ConfigError, ConfigResult};

/// Path separator.
pub const SEPARATOR: char = '.';

/// A node together with the dotted path it was found under.
///
/// Validation errors are reported against [`Located::path`].
#[derive(Debug)]
pub struct Located<'a, N: ?Sized> {
    path: &'a str,
    node: &'a N,
}

impl<N: ?Sized> Clone for Located<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: ?Sized> Copy for Located<'_, N> {}

impl<'a, N: DocumentNode + ?Sized> Located<'a, N> {
    /// Tag `node` with `path`.
    pub fn new(path: &'a str, node: &'a N) -> Self {
        Self { path, node }
    }

    /// The path this node was resolved from.
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// The located node.
    pub fn node(&self) -> &'a N {
        self.node
    }

    /// A type error naming this node's path.
    pub fn type_error(&self) -> ConfigError {
        ConfigError::TypeError(self.path.to_string())
    }
}

/// Split a dotted path into its segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR)
}

/// Locate the node at `path`, or `None` if any segment is absent.
pub fn find_node<'a, N: DocumentNode + ?Sized>(root: &'a N, path: &'a str) -> Option<Located<'a, N>> {
    let mut node = root;
    for segment in segments(path) {
        node = node.get(segment)?;
    }
    Some(Located::new(path, node))
}

/// Locate the node at `path`, failing with [`ConfigError::ConfigMissing`] if absent.
///
/// No shape or type checks happen here.
pub fn find_required<'a, N: DocumentNode + ?Sized>(
    root: &'a N,
    path: &'a str,
) -> ConfigResult<Located<'a, N>> {
    find_node(root, path).ok_or_else(|| ConfigError::ConfigMissing(path.to_string()))
}
