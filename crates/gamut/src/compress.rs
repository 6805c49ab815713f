//! Linear per-axis compression of a batch into the gamut's extent.

use tracing::debug;

use crate::batch::{Point3, PointBatch};
use crate::error::{GeometryError, Result};

/// `(min, max)` of coordinate `axis` over `points`; `None` when empty.
fn extent<'a>(points: impl Iterator<Item = &'a Point3>, axis: usize) -> Option<(f64, f64)> {
    points.map(|p| p[axis]).fold(None, |acc, x| match acc {
        None => Some((x, x)),
        Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
    })
}

/// Map coordinate `axis` of every point in `batch` affinely so that the
/// batch's range on that axis becomes the range of `vertices` on it.
///
/// `x' = b·x + a` with `b = (gMax − gMin)/(pMax − pMin)`, `a = gMin − b·pMin`;
/// the other two coordinates are untouched. An empty batch is returned as is.
pub fn compress_axis(vertices: &[Point3], batch: &PointBatch, axis: usize) -> Result<PointBatch> {
    if axis >= 3 {
        return Err(GeometryError::AxisOutOfRange { axis });
    }
    batch.ensure_finite()?;
    let Some((p_min, p_max)) = extent(batch.points().iter(), axis) else {
        return Ok(batch.clone());
    };
    if p_max == p_min {
        return Err(GeometryError::ZeroRange { axis });
    }
    let (g_min, g_max) = extent(vertices.iter(), axis).unwrap_or((0.0, 0.0));

    let b = (g_max - g_min) / (p_max - p_min);
    let a = g_min - b * p_min;
    debug!(axis, scale = b, shift = a, "axis compression");

    let out = batch
        .points()
        .iter()
        .map(|p| {
            let mut q = *p;
            q[axis] = b * p[axis] + a;
            q
        })
        .collect();
    Ok(batch.with_points(out))
}
