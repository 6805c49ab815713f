//! Batches of 3-D points with an arbitrary leading shape.
//!
//! A batch is stored flat (N points) next to its original shape (rank ≥ 1,
//! trailing axis 3). Queries run over the flat view and results are rebuilt by
//! row-major stride arithmetic: point batches keep the full shape, boolean
//! masks drop the trailing axis.

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::cfg::PARALLEL_THRESHOLD;
use crate::error::{GeometryError, Result};

/// A point (or direction) in a 3-D colour space.
pub type Point3 = Vector3<f64>;

/// Points in their caller-visible shape.
///
/// Invariants:
/// - `shape` is non-empty and ends in 3.
/// - `points.len() * 3 == shape.iter().product()`.
#[derive(Clone, Debug, PartialEq)]
pub struct PointBatch {
    shape: Vec<usize>,
    points: Vec<Point3>,
}

impl PointBatch {
    /// Wrap flat row-major coordinates with the given shape.
    pub fn from_shape_vec(shape: &[usize], flat: Vec<f64>) -> Result<Self> {
        let len = flat.len();
        if shape.last() != Some(&3) || shape.iter().product::<usize>() != len {
            return Err(GeometryError::ShapeMismatch {
                shape: shape.to_vec(),
                len,
            });
        }
        let points = flat
            .chunks_exact(3)
            .map(|c| Vector3::new(c[0], c[1], c[2]))
            .collect();
        Ok(Self {
            shape: shape.to_vec(),
            points,
        })
    }

    /// An `N×3` batch.
    pub fn from_points(points: Vec<Point3>) -> Self {
        Self {
            shape: vec![points.len(), 3],
            points,
        }
    }

    /// A rank-1 batch holding one point.
    pub fn single(p: Point3) -> Self {
        Self {
            shape: vec![3],
            points: vec![p],
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Shape without the trailing coordinate axis (empty for a single point).
    #[inline]
    pub fn batch_shape(&self) -> &[usize] {
        &self.shape[..self.shape.len() - 1]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Flattened `N×3` view used by all geometry.
    #[inline]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Point at a multi-index over `batch_shape()`.
    pub fn get(&self, index: &[usize]) -> Option<Point3> {
        flat_index(self.batch_shape(), index).map(|i| self.points[i])
    }

    /// Row-major coordinates, the inverse of `from_shape_vec`.
    pub fn to_flat_vec(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }

    /// Fails on the first point with a NaN or infinite coordinate.
    pub fn ensure_finite(&self) -> Result<()> {
        match self.points.iter().position(|p| !p.iter().all(|c| c.is_finite())) {
            Some(index) => Err(GeometryError::NonFinite { index }),
            None => Ok(()),
        }
    }

    /// Same shape, new points (one per existing point).
    pub(crate) fn with_points(&self, points: Vec<Point3>) -> Self {
        debug_assert_eq!(points.len(), self.points.len());
        Self {
            shape: self.shape.clone(),
            points,
        }
    }
}

/// Boolean result of a batch predicate; shape is the input shape minus the
/// trailing coordinate axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    shape: Vec<usize>,
    values: Vec<bool>,
}

impl Mask {
    pub(crate) fn new(shape: &[usize], values: Vec<bool>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), values.len());
        Self {
            shape: shape.to_vec(),
            values,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Row-major flat view.
    #[inline]
    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn get(&self, index: &[usize]) -> Option<bool> {
        flat_index(&self.shape, index).map(|i| self.values[i])
    }

    pub fn all(&self) -> bool {
        self.values.iter().all(|&v| v)
    }

    pub fn none(&self) -> bool {
        !self.values.iter().any(|&v| v)
    }

    pub fn count(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }
}

/// Row-major offset of `index` in an array of `shape`.
pub(crate) fn flat_index(shape: &[usize], index: &[usize]) -> Option<usize> {
    if index.len() != shape.len() {
        return None;
    }
    let mut offset = 0;
    for (&i, &dim) in index.iter().zip(shape) {
        if i >= dim {
            return None;
        }
        offset = offset * dim + i;
    }
    Some(offset)
}

/// Evaluate `f` on every point, in parallel for large batches. Results keep
/// the flat order; the first error aborts the batch.
pub(crate) fn map_points<T, F>(points: &[Point3], f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize, &Point3) -> Result<T> + Sync,
{
    if points.len() >= PARALLEL_THRESHOLD {
        points.par_iter().enumerate().map(|(i, p)| f(i, p)).collect()
    } else {
        points.iter().enumerate().map(|(i, p)| f(i, p)).collect()
    }
}
