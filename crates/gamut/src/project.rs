//! Mapping points onto the gamut surface.
//!
//! Two strategies:
//! - along the line from an interior centre to the query (`nearest_on_line`),
//! - nearest hull vertex, then orthogonal projection onto the planes of its
//!   incident facets (`clip_nearest`).
//!
//! Crossing points lie on a facet plane by construction, so their triangle
//! membership uses barycentric weights with `PLANE_EPS` slack instead of an
//! exact coplanarity test.

use tracing::debug;

use crate::batch::{map_points, Point3, PointBatch};
use crate::cfg::PLANE_EPS;
use crate::error::{GeometryError, Result};
use crate::hull::Hull;
use crate::inclusion::winding_contains;
use crate::predicates::in_triangle_on_plane;

/// Unit normal `n = normalize((p2 − p0) × (p1 − p0))` and offset `d = p1·n`
/// of the plane through `tri`; `None` for a zero-area triangle.
pub fn facet_plane(tri: &[Point3; 3]) -> Option<(Point3, f64)> {
    let n = (tri[2] - tri[0]).cross(&(tri[1] - tri[0])).try_normalize(0.0)?;
    Some((n, tri[1].dot(&n)))
}

#[inline]
fn triangle(points: &[Point3], f: &[usize; 3]) -> [Point3; 3] {
    [points[f[0]], points[f[1]], points[f[2]]]
}

/// Last surface crossing on the segment from `centre` to `q`.
///
/// For every facet the ray parameter `α = (d − c·n)/(q·n − c·n)` is computed;
/// crossings with `0 ≤ α ≤ 1` inside the facet's triangle are candidates and
/// the one with the largest `α` wins. Facets parallel to the ray are skipped.
/// Without a candidate the segment never leaves the surface and `q` is
/// returned as is.
pub fn nearest_on_line(
    points: &[Point3],
    facets: &[[usize; 3]],
    q: &Point3,
    centre: &Point3,
) -> Point3 {
    let mut best: Option<(f64, Point3)> = None;
    for f in facets {
        let tri = triangle(points, f);
        let Some((n, d)) = facet_plane(&tri) else {
            continue;
        };
        let cn = centre.dot(&n);
        let denom = q.dot(&n) - cn;
        if denom == 0.0 {
            continue;
        }
        let alpha = (d - cn) / denom;
        if !(0.0..=1.0).contains(&alpha) {
            continue;
        }
        if best.is_some_and(|(a, _)| a >= alpha) {
            continue;
        }
        let x = q * alpha + centre * (1.0 - alpha);
        if in_triangle_on_plane(&tri, &x, PLANE_EPS) {
            best = Some((alpha, x));
        }
    }
    best.map_or(*q, |(_, x)| x)
}

/// Nearest hull vertex to `q`, refined by projecting `q` onto the planes of
/// the facets around that vertex.
///
/// A projection replaces the current answer when it lies in its facet's
/// triangle and is closer to `q` (smaller `|q·n − d|`) than every projection
/// accepted before it.
pub fn clip_nearest(points: &[Point3], hull: &Hull, q: &Point3) -> Point3 {
    let nearest = hull
        .vertices()
        .iter()
        .copied()
        .map(|v| (v, (points[v] - q).norm_squared()))
        .fold(None, |best: Option<(usize, f64)>, (v, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((v, d)),
        });
    let Some((v_star, _)) = nearest else {
        return *q;
    };

    let mut best = points[v_star];
    let mut best_offset = f64::INFINITY;
    for k in hull.incident_facets(v_star) {
        let tri = triangle(points, &hull.facets()[k]);
        let Some((n, d)) = facet_plane(&tri) else {
            continue;
        };
        let a = q.dot(&n) - d;
        let proj = q - n * a;
        if a.abs() < best_offset && in_triangle_on_plane(&tri, &proj, PLANE_EPS) {
            best = proj;
            best_offset = a.abs();
        }
    }
    best
}

/// `nearest_on_line` for every point of `batch`; `centre` defaults to the
/// hull centre.
pub fn nearest_on_line_batch(
    points: &[Point3],
    hull: &Hull,
    batch: &PointBatch,
    centre: Option<Point3>,
) -> Result<PointBatch> {
    batch.ensure_finite()?;
    let c = centre.unwrap_or_else(|| hull.centre());
    debug!(queries = batch.len(), centre = ?c, "line projection batch");
    let out = map_points(batch.points(), |i, q| {
        if *q == c {
            return Err(GeometryError::CoincidentCentre { index: i });
        }
        Ok(nearest_on_line(points, hull.facets(), q, &c))
    })?;
    Ok(batch.with_points(out))
}

pub fn clip_nearest_batch(points: &[Point3], hull: &Hull, batch: &PointBatch) -> Result<PointBatch> {
    batch.ensure_finite()?;
    debug!(queries = batch.len(), "nearest clip batch");
    let out = map_points(batch.points(), |_, q| Ok(clip_nearest(points, hull, q)))?;
    Ok(batch.with_points(out))
}

/// Points inside the surface (winding test) stay, the others are clipped to
/// the nearest surface point.
pub fn clip_out_of_gamut_batch(
    points: &[Point3],
    hull: &Hull,
    batch: &PointBatch,
) -> Result<PointBatch> {
    batch.ensure_finite()?;
    let out = map_points(batch.points(), |_, q| {
        Ok(if winding_contains(points, hull.facets(), q) {
            *q
        } else {
            clip_nearest(points, hull, q)
        })
    })?;
    let moved = out.iter().zip(batch.points()).filter(|(a, b)| a != b).count();
    debug!(queries = batch.len(), moved, "out-of-gamut clip batch");
    Ok(batch.with_points(out))
}
