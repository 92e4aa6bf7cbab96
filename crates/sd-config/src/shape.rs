//! Shape and scalar-type validation.
//!
//! Vectors and matrices are both written as a flat sequence of scalars, so a
//! single "exact count, all scalars" check covers every rank. Matrices are
//! filled in row-major order. Nothing is coerced to fit: a sequence one
//! element short or long is rejected.

use std::fmt;

use nalgebra::SMatrix;

use crate::document::DocumentNode;
use crate::error::ConfigResult;
use crate::path::Located;

/// Expected layout of a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Bool,
    Unsigned,
    Float,
    /// Flat sequence of `n` scalars.
    Vector(usize),
    /// Flat row-major sequence of `rows * cols` scalars.
    Matrix { rows: usize, cols: usize },
}

impl Shape {
    /// Number of sequence elements expected, or `None` for scalar shapes.
    pub fn element_count(&self) -> Option<usize> {
        match self {
            Shape::Bool | Shape::Unsigned | Shape::Float => None,
            Shape::Vector(n) => Some(*n),
            Shape::Matrix { rows, cols } => Some(rows * cols),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Bool => write!(f, "bool"),
            Shape::Unsigned => write!(f, "unsigned"),
            Shape::Float => write!(f, "float"),
            Shape::Vector(n) => write!(f, "vector[{}]", n),
            Shape::Matrix { rows, cols } => write!(f, "matrix[{}x{}]", rows, cols),
        }
    }
}

fn require_scalar<N: DocumentNode + ?Sized>(located: Located<'_, N>) -> ConfigResult<()> {
    if located.node().is_scalar() {
        Ok(())
    } else {
        Err(located.type_error())
    }
}

/// Require a sequence of exactly `n` scalar elements.
pub fn require_vector<N: DocumentNode + ?Sized>(located: Located<'_, N>, n: usize) -> ConfigResult<()> {
    let node = located.node();
    if node.sequence_len() != n {
        return Err(located.type_error());
    }
    for i in 0..n {
        match node.at(i) {
            Some(element) if element.is_scalar() => {}
            _ => return Err(located.type_error()),
        }
    }
    Ok(())
}

/// Read a boolean scalar.
pub fn read_bool<N: DocumentNode + ?Sized>(located: Located<'_, N>) -> ConfigResult<bool> {
    require_scalar(located)?;
    located.node().as_bool().ok_or_else(|| located.type_error())
}

/// Read a non-negative integer scalar.
pub fn read_unsigned<N: DocumentNode + ?Sized>(located: Located<'_, N>) -> ConfigResult<usize> {
    require_scalar(located)?;
    located
        .node()
        .as_unsigned()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| located.type_error())
}

/// Read a floating-point scalar.
pub fn read_float<N: DocumentNode + ?Sized>(located: Located<'_, N>) -> ConfigResult<f64> {
    require_scalar(located)?;
    located.node().as_float().ok_or_else(|| located.type_error())
}

/// Read a flat sequence of exactly `N` floats, preserving document order.
pub fn read_array<const LEN: usize, N: DocumentNode + ?Sized>(
    located: Located<'_, N>,
) -> ConfigResult<[f64; LEN]> {
    require_vector(located, LEN)?;
    let mut out = [0.0; LEN];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = located
            .node()
            .at(i)
            .and_then(DocumentNode::as_float)
            .ok_or_else(|| located.type_error())?;
    }
    Ok(out)
}

/// Read an `R×C` matrix from a flat row-major sequence of `R*C` floats.
pub fn read_matrix<const R: usize, const C: usize, N: DocumentNode + ?Sized>(
    located: Located<'_, N>,
) -> ConfigResult<SMatrix<f64, R, C>> {
    require_vector(located, R * C)?;
    let mut mat = SMatrix::<f64, R, C>::zeros();
    for i in 0..R {
        for j in 0..C {
            mat[(i, j)] = located
                .node()
                .at(i * C + j)
                .and_then(DocumentNode::as_float)
                .ok_or_else(|| located.type_error())?;
        }
    }
    Ok(mat)
}
