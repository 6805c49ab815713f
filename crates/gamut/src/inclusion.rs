//! Point-in-polyhedron tests.
//!
//! Purpose
//! - Decide gamut membership for arbitrary (possibly non-convex) closed
//!   triangulated surfaces, plus a cheap shortcut for convex hulls.
//!
//! Why this design (short)
//! - Generalized winding number after Feito & Torres: sum signed contributions
//!   of the tetrahedra spanned by a fixed reference point and each facet. Only
//!   orientation signs are used, so ties are decided by exact zeros.
//! - Contributions are counted in half units (`i32`), which keeps the grazing
//!   cases exact.
//! - A ray along an origin edge (through a facet edge) is shared by two
//!   facets and counts half each. A ray through a vertex counts a whole unit
//!   once per facet sign, remembered per query in two small ordered sets, so
//!   a ray grazing a vertex nets zero.
//! - Facets whose plane contains the origin span no volume and only decide
//!   points lying on them.
//!
//! Assumptions and conventions
//! - The reference point is the coordinate origin of the space, not the gamut
//!   centre.
//! - Points on the surface are inside.
//! - The convex shortcut needs outward facets of a convex hull (`gamma == 1`).
//!
//! References
//! - F. R. Feito, J. C. Torres, “Inclusion test for general polyhedra”,
//!   Computers & Graphics 21 (1997).

use std::collections::BTreeSet;

use tracing::debug;

use crate::batch::{map_points, Mask, Point3, PointBatch};
use crate::cfg::FEAS_EPS;
use crate::error::{GeometryError, Result};
use crate::hull::Hull;
use crate::predicates::{in_triangle, orientation};

/// Which membership test `Gamut::is_inside` runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InclusionMethod {
    /// Winding-number test; valid for any closed surface.
    #[default]
    Winding,
    /// Half-space test against every facet plane; convex hulls only.
    Convex,
}

/// Winding-number membership of `q` in the surface `facets` over `points`.
pub fn winding_contains(points: &[Point3], facets: &[[usize; 3]], q: &Point3) -> bool {
    let origin = Point3::zeros();
    if *q != origin {
        return winding_from(&origin, points, facets, q);
    }
    // The origin is the apex of every tetrahedron; count from a point of the
    // first facet instead.
    match facets.first() {
        Some(&[a, b, c]) => {
            let reference = (points[a] + points[b] + points[c]) / 3.0;
            winding_from(&reference, points, facets, q)
        }
        None => false,
    }
}

fn winding_from(
    origin: &Point3,
    points: &[Point3],
    facets: &[[usize; 3]],
    q: &Point3,
) -> bool {
    let mut inclusion: i32 = 0;
    let mut v_plus = BTreeSet::new();
    let mut v_minus = BTreeSet::new();

    for &[ia, ib, ic] in facets {
        let (a, b, c) = (&points[ia], &points[ib], &points[ic]);
        let s_t = orientation(origin, a, b, c);
        if s_t == 0 {
            // Flat tetrahedron: no volume to count, only the facet itself.
            if in_triangle(&[*a, *b, *c], q, false) {
                return true;
            }
            continue;
        }
        let s_nt = -s_t;

        // q must see every face of the origin tetrahedron from the same side
        // as the origin does; bail out on the first disagreement.
        let s0 = orientation(q, a, b, c);
        if s0 == s_nt {
            continue;
        }
        let s1 = orientation(q, a, c, origin);
        if s1 == s_nt {
            continue;
        }
        let s2 = orientation(q, a, origin, b);
        if s2 == s_nt {
            continue;
        }
        let s3 = orientation(q, b, origin, c);
        if s3 == s_nt {
            continue;
        }

        if s0 == 0 {
            return true;
        }
        let st = i32::from(s_t);
        let zeros = [s1, s2, s3].iter().filter(|&&s| s == 0).count();
        match zeros {
            0 => inclusion += 2 * st,
            1 => inclusion += st,
            2 => {
                // The ray runs along the edge from the origin to one vertex;
                // each vertex counts once per facet sign.
                let v = match (s1, s2, s3) {
                    (0, 0, _) => ia,
                    (_, 0, 0) => ib,
                    _ => ic,
                };
                let seen = if st > 0 { &mut v_plus } else { &mut v_minus };
                if seen.insert(v) {
                    inclusion += 2 * st;
                }
            }
            _ => {}
        }
    }
    inclusion > 0
}

/// Half-space membership: `q` is on the inner side (with slack) of every
/// outward facet plane.
pub fn convex_contains(points: &[Point3], facets: &[[usize; 3]], q: &Point3) -> bool {
    facets.iter().all(|&[a, b, c]| {
        let n = (points[b] - points[a]).cross(&(points[c] - points[a]));
        n.dot(&(q - points[a])) <= FEAS_EPS * n.norm()
    })
}

/// Membership of every point of `batch`; the mask drops the trailing axis.
pub fn contains_all(
    points: &[Point3],
    hull: &Hull,
    batch: &PointBatch,
    method: InclusionMethod,
) -> Result<Mask> {
    if method == InclusionMethod::Convex && hull.is_modified() {
        return Err(GeometryError::NotConvex { gamma: hull.gamma() });
    }
    batch.ensure_finite()?;
    debug!(queries = batch.len(), ?method, "inclusion batch");
    let facets = hull.facets();
    let values = map_points(batch.points(), |_, q| {
        Ok(match method {
            InclusionMethod::Winding => winding_contains(points, facets, q),
            InclusionMethod::Convex => convex_contains(points, facets, q),
        })
    })?;
    Ok(Mask::new(batch.batch_shape(), values))
}
