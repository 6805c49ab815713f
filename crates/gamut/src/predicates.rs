//! Exact low-dimensional inclusion predicates.
//!
//! Conventions
//! - Every test decides on exact zeros and exact coordinate equality; there is
//!   no epsilon. Inputs with small integer (or dyadic) coordinates are decided
//!   exactly, general floating input inherits the usual fragility near
//!   degenerate configurations.
//! - Boundaries count as inside unless the `exclude_*` flag of a predicate is
//!   set.
//! - `interior` is the entry point for up to four points that may be
//!   degenerate (a flat “tetrahedron”, a collinear “triangle”): it first
//!   reduces them to their true shape.

use crate::batch::Point3;
use crate::error::{GeometryError, Result};

/// Signed volume of the tetrahedron `(p0,p1,p2,p3)` times six.
#[inline]
pub(crate) fn signed_volume(p0: &Point3, p1: &Point3, p2: &Point3, p3: &Point3) -> f64 {
    (p1 - p0).dot(&(p2 - p0).cross(&(p3 - p0)))
}

/// Orientation of the tetrahedron `(p0,p1,p2,p3)`: `1`, `0` or `-1`.
///
/// Equals `-sign(det M)` for `M` the 4×4 matrix whose columns are the points
/// with a trailing homogeneous `1`. Subtracting the first column and expanding
/// along the row of ones reduces `det M` to `-(p1−p0)·((p2−p0)×(p3−p0))`, which
/// is what we evaluate.
#[inline]
pub fn orientation(p0: &Point3, p1: &Point3, p2: &Point3, p3: &Point3) -> i8 {
    let v = signed_volume(p0, p1, p2, p3);
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Is `q` on the closed segment `[a, b]`?
///
/// With `exclude_endpoints`, `a` and `b` themselves are rejected.
pub fn on_segment(a: &Point3, b: &Point3, q: &Point3, exclude_endpoints: bool) -> bool {
    if exclude_endpoints && (q == a || q == b) {
        return false;
    }
    let ab = b - a;
    let aq = q - a;
    if ab.cross(&aq) != Point3::zeros() {
        return false;
    }
    if aq.dot(&ab) < 0.0 {
        return false;
    }
    aq.norm_squared() <= ab.norm_squared()
}

/// Is `q` in the closed triangle `tri`?
///
/// Degenerate triangles are treated as the segment they collapse to. The
/// general case is the barycentric cross-product test: `q` must be coplanar,
/// on the inner side of both edges through `tri[0]`, and the two area ratios
/// must sum to at most one. With `exclude_edges` points on any edge are
/// rejected.
pub fn in_triangle(tri: &[Point3; 3], q: &Point3, exclude_edges: bool) -> bool {
    let [a, b, c] = tri;
    if exclude_edges
        && (on_segment(a, b, q, false) || on_segment(b, c, q, false) || on_segment(a, c, q, false))
    {
        return false;
    }
    if a == b {
        return on_segment(a, c, q, false);
    }
    if a == c || b == c {
        return on_segment(a, b, q, false);
    }

    let ab = b - a;
    let ac = c - a;
    let aq = q - a;
    let n = ab.cross(&ac);
    if n == Point3::zeros() {
        // Distinct but collinear: the outermost pair spans the segment.
        let (p, r) = farthest_pair(tri);
        return on_segment(&p, &r, q, false);
    }
    if n.dot(&aq) != 0.0 {
        return false;
    }
    let c_x_q = ac.cross(&aq);
    if c_x_q.dot(&ac.cross(&ab)) < 0.0 {
        return false;
    }
    let b_x_q = ab.cross(&aq);
    if b_x_q.dot(&n) < 0.0 {
        return false;
    }
    let denom = n.norm();
    c_x_q.norm() / denom + b_x_q.norm() / denom <= 1.0
}

/// Triangle membership for a point already known to lie on the triangle's
/// plane (up to rounding). Barycentric weights with `eps` slack.
pub(crate) fn in_triangle_on_plane(tri: &[Point3; 3], q: &Point3, eps: f64) -> bool {
    let ab = tri[1] - tri[0];
    let ac = tri[2] - tri[0];
    let aq = q - tri[0];
    let n = ab.cross(&ac);
    let nn = n.norm_squared();
    if nn == 0.0 {
        return false;
    }
    let w_b = aq.cross(&ac).dot(&n) / nn;
    let w_c = ab.cross(&aq).dot(&n) / nn;
    w_b >= -eps && w_c >= -eps && w_b + w_c <= 1.0 + eps
}

/// Is `q` in the closed tetrahedron `tet`?
///
/// Accepts iff all four barycentric weights lie in `[0, 1]`. A flat
/// tetrahedron contains nothing here; use [`interior`] for possibly
/// degenerate input. With `exclude_surface` points on any face are rejected.
pub fn in_tetrahedron(tet: &[Point3; 4], q: &Point3, exclude_surface: bool) -> bool {
    if exclude_surface && (0..4).any(|i| in_triangle(&face_opposite(tet, i), q, false)) {
        return false;
    }
    let [p0, p1, p2, p3] = tet;
    let vol = signed_volume(p0, p1, p2, p3);
    if vol == 0.0 {
        return false;
    }
    let weights = [
        signed_volume(q, p1, p2, p3) / vol,
        signed_volume(p0, q, p2, p3) / vol,
        signed_volume(p0, p1, q, p3) / vol,
        signed_volume(p0, p1, p2, q) / vol,
    ];
    weights.iter().all(|w| (0.0..=1.0).contains(w))
}

/// Do the points lie in one plane? Trivially true for fewer than four points;
/// otherwise every point from the fourth on is tested against the plane of the
/// first three.
pub fn is_coplanar(points: &[Point3]) -> bool {
    if points.len() < 4 {
        return true;
    }
    let a = points[0];
    let n = (points[1] - a).cross(&(points[2] - a));
    points[3..].iter().all(|d| (d - a).dot(&n) == 0.0)
}

/// The convex shape actually spanned by up to four coplanar points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Point(Point3),
    Segment([Point3; 2]),
    Triangle([Point3; 3]),
    /// Convex quadrilateral, ordered so that `1–2` is a diagonal.
    Quad([Point3; 4]),
}

impl Shape {
    /// Number of points describing the shape.
    pub fn vertex_count(&self) -> usize {
        match self {
            Shape::Point(_) => 1,
            Shape::Segment(_) => 2,
            Shape::Triangle(_) => 3,
            Shape::Quad(_) => 4,
        }
    }
}

/// Drop duplicates and points that are not vertices of the convex hull of at
/// most four coplanar points.
///
/// Three points where one lies on the segment joining the others reduce to
/// that segment; four points where one lies in the triangle of the others
/// reduce to that triangle.
pub fn true_shape(points: &[Point3]) -> Result<Shape> {
    if points.len() > 4 {
        return Err(GeometryError::TooManyPoints {
            count: points.len(),
        });
    }
    let mut uniques: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points {
        if !uniques.contains(p) {
            uniques.push(*p);
        }
    }
    match uniques[..] {
        [] => Err(GeometryError::TooFewPoints),
        [a] => Ok(Shape::Point(a)),
        [a, b] => Ok(Shape::Segment([a, b])),
        [a, b, c] => {
            for (q, [p, r]) in [(a, [b, c]), (b, [a, c]), (c, [a, b])] {
                if on_segment(&p, &r, &q, false) {
                    return Ok(Shape::Segment([p, r]));
                }
            }
            Ok(Shape::Triangle([a, b, c]))
        }
        [a, b, c, d] => {
            let quad = [a, b, c, d];
            for i in 0..4 {
                let tri = face_opposite(&quad, i);
                if in_triangle(&tri, &quad[i], false) {
                    return Ok(Shape::Triangle(tri));
                }
            }
            Ok(Shape::Quad(diagonal_order(quad)))
        }
        ref more => Err(GeometryError::TooManyPoints { count: more.len() }),
    }
}

/// Is `q` in the convex quadrilateral `quad` (ordered with `1–2` a diagonal)?
///
/// The quad is split into triangles `(0,1,2)` and `(1,2,3)`. With
/// `exclude_edges` the open shared diagonal still counts as interior.
pub fn in_polygon(quad: &[Point3; 4], q: &Point3, exclude_edges: bool) -> bool {
    let first = [quad[0], quad[1], quad[2]];
    let second = [quad[1], quad[2], quad[3]];
    if exclude_edges {
        in_triangle(&first, q, true)
            || on_segment(&quad[1], &quad[2], q, true)
            || in_triangle(&second, q, true)
    } else {
        in_triangle(&first, q, false) || in_triangle(&second, q, false)
    }
}

/// Is `q` inside the convex hull of up to four points?
///
/// Coplanar input is reduced with [`true_shape`] and dispatched by shape;
/// anything else is a proper tetrahedron. `exclude_boundary` drops segment
/// endpoints, triangle/quad edges or the tetrahedron surface respectively.
pub fn interior(points: &[Point3], q: &Point3, exclude_boundary: bool) -> Result<bool> {
    if points.len() > 4 {
        return Err(GeometryError::TooManyPoints {
            count: points.len(),
        });
    }
    if !is_coplanar(points) {
        let tet = [points[0], points[1], points[2], points[3]];
        return Ok(in_tetrahedron(&tet, q, exclude_boundary));
    }
    let inside = match true_shape(points)? {
        Shape::Point(p) => p == *q,
        Shape::Segment([a, b]) => on_segment(&a, &b, q, exclude_boundary),
        Shape::Triangle(tri) => in_triangle(&tri, q, exclude_boundary),
        Shape::Quad(quad) => in_polygon(&quad, q, exclude_boundary),
    };
    Ok(inside)
}

/// The three points of `pts` other than `pts[skip]`, in order.
fn face_opposite(pts: &[Point3; 4], skip: usize) -> [Point3; 3] {
    let mut out = [Point3::zeros(); 3];
    let mut k = 0;
    for (i, p) in pts.iter().enumerate() {
        if i != skip {
            out[k] = *p;
            k += 1;
        }
    }
    out
}

fn farthest_pair(tri: &[Point3; 3]) -> (Point3, Point3) {
    let pairs = [(tri[0], tri[1]), (tri[0], tri[2]), (tri[1], tri[2])];
    let mut best = pairs[0];
    for pair in &pairs[1..] {
        if (pair.1 - pair.0).norm_squared() > (best.1 - best.0).norm_squared() {
            best = *pair;
        }
    }
    best
}

/// Reorder a convex planar quad so that the first and last points are
/// opposite corners, i.e. `1–2` is the other diagonal.
fn diagonal_order(quad: [Point3; 4]) -> [Point3; 4] {
    let p0 = quad[0];
    for j in 1..4 {
        let (k, l) = match j {
            1 => (2, 3),
            2 => (1, 3),
            _ => (1, 2),
        };
        let d = quad[j] - p0;
        let side_k = d.cross(&(quad[k] - p0));
        let side_l = d.cross(&(quad[l] - p0));
        if side_k.dot(&side_l) < 0.0 {
            return [p0, quad[k], quad[l], quad[j]];
        }
    }
    quad
}
