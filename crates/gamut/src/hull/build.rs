//! Quickhull, radial warp and facet normalization.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, trace};

use super::types::{Hull, HullCfg};
use crate::batch::Point3;
use crate::cfg::HULL_EPS;
use crate::error::{GeometryError, Result};

/// Build the hull of `points` under `cfg`.
///
/// Steps: optional radial warp, Quickhull on the (warped) coordinates, then
/// outward orientation and adjacency computed on the *unwarped* coordinates.
pub fn build_hull(points: &[Point3], cfg: &HullCfg) -> Result<Hull> {
    if points.len() < 4 {
        return Err(GeometryError::degenerate(format!(
            "need at least 4 points, got {}",
            points.len()
        )));
    }
    if let Some(i) = points.iter().position(|p| !p.iter().all(|c| c.is_finite())) {
        return Err(GeometryError::degenerate(format!(
            "point {i} has a non-finite coordinate"
        )));
    }

    let warped;
    let (topology, expansion_centre) = if cfg.is_modified() {
        if !(cfg.gamma.is_finite() && cfg.gamma > 0.0) {
            return Err(GeometryError::degenerate(format!(
                "gamma must be finite and positive, got {}",
                cfg.gamma
            )));
        }
        let centre = cfg.centre.unwrap_or_else(|| centroid(points.iter()));
        warped = warp(points, &centre, cfg.gamma);
        (warped.as_slice(), Some(centre))
    } else {
        (points, cfg.centre)
    };

    let raw = quickhull(topology)?;
    let vertices: Vec<usize> = raw
        .iter()
        .flatten()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mid = centroid(vertices.iter().map(|&i| &points[i]));
    let facets = orient_outward(points, &raw, &mid);
    let neighbors = facet_neighbors(&facets)?;

    debug!(
        points = points.len(),
        vertices = vertices.len(),
        facets = facets.len(),
        gamma = cfg.gamma,
        "hull built"
    );
    Ok(Hull {
        vertices,
        facets,
        neighbors,
        centre: expansion_centre.unwrap_or(mid),
        gamma: cfg.gamma,
    })
}

/// Arithmetic mean; the origin for an empty iterator.
pub(crate) fn centroid<'a>(points: impl Iterator<Item = &'a Point3>) -> Point3 {
    let (sum, n) = points.fold((Point3::zeros(), 0usize), |(s, n), p| (s + p, n + 1));
    if n == 0 {
        sum
    } else {
        sum / n as f64
    }
}

/// `centre + r^gamma · û` in coordinates relative to `centre`, i.e. the point
/// is moved along its ray from the centre. Points at the centre stay there.
fn warp(points: &[Point3], centre: &Point3, gamma: f64) -> Vec<Point3> {
    points
        .iter()
        .map(|p| {
            let d = p - centre;
            let r = d.norm();
            if r == 0.0 {
                d
            } else {
                d * (r.powf(gamma) / r)
            }
        })
        .collect()
}

/// Swap the outer indices of every facet whose normal points towards `mid`.
fn orient_outward(points: &[Point3], facets: &[[usize; 3]], mid: &Point3) -> Vec<[usize; 3]> {
    facets
        .iter()
        .map(|&[a, b, c]| {
            let (pa, pb, pc) = (&points[a], &points[b], &points[c]);
            let n = (pb - pa).cross(&(pc - pa));
            if (pa - mid).dot(&n) < 0.0 {
                [c, b, a]
            } else {
                [a, b, c]
            }
        })
        .collect()
}

/// `neighbors[k][i]`: the other facet on the edge of `k` opposite slot `i`.
fn facet_neighbors(facets: &[[usize; 3]]) -> Result<Vec<[usize; 3]>> {
    let key = |u: usize, v: usize| if u < v { (u, v) } else { (v, u) };
    let mut edges: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (k, &[a, b, c]) in facets.iter().enumerate() {
        for e in [key(b, c), key(c, a), key(a, b)] {
            edges.entry(e).or_default().push(k);
        }
    }
    facets
        .iter()
        .enumerate()
        .map(|(k, &[a, b, c])| {
            let mut out = [0usize; 3];
            for (slot, e) in [key(b, c), key(c, a), key(a, b)].into_iter().enumerate() {
                out[slot] = edges
                    .get(&e)
                    .and_then(|fs| fs.iter().copied().find(|&f| f != k))
                    .ok_or_else(|| {
                        GeometryError::degenerate(format!("edge {e:?} of facet {k} is unshared"))
                    })?;
            }
            Ok(out)
        })
        .collect()
}

/// Visibility tolerance scaled to the magnitude of the input.
pub(crate) fn relative_eps(points: &[Point3]) -> f64 {
    let scale = points.iter().map(|p| p.amax()).fold(1.0_f64, f64::max);
    HULL_EPS * scale
}

/// Working facet of the incremental hull.
struct Face {
    v: [usize; 3],
    normal: Point3,
    offset: f64,
    outside: Vec<usize>,
    alive: bool,
}

impl Face {
    /// Outward relative to `inner`, a point strictly inside the hull.
    fn new(v: [usize; 3], pts: &[Point3], inner: &Point3) -> Self {
        let [a, b, c] = v;
        let n = (pts[b] - pts[a]).cross(&(pts[c] - pts[a]));
        let n = n.try_normalize(0.0).unwrap_or(n);
        let (v, normal) = if n.dot(&(inner - pts[a])) > 0.0 {
            ([a, c, b], -n)
        } else {
            (v, n)
        };
        Self {
            v,
            normal,
            offset: normal.dot(&pts[v[0]]),
            outside: Vec::new(),
            alive: true,
        }
    }

    #[inline]
    fn distance(&self, p: &Point3) -> f64 {
        self.normal.dot(p) - self.offset
    }

    /// Outside point farthest from the plane.
    fn furthest(&self, pts: &[Point3]) -> Option<usize> {
        self.outside
            .iter()
            .copied()
            .map(|i| (i, self.distance(&pts[i])))
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((i, d)),
            })
            .map(|(i, _)| i)
    }
}

/// Start tetrahedron: extreme-x point, the point farthest from it, the point
/// farthest from their line, the point farthest from their plane.
fn initial_simplex(pts: &[Point3], eps: f64) -> Result<[usize; 4]> {
    let argmax = |f: &dyn Fn(&Point3) -> f64| -> (usize, f64) {
        pts.iter()
            .enumerate()
            .map(|(i, p)| (i, f(p)))
            .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best })
    };

    let (i0, _) = argmax(&|p| -p.x);
    let p0 = pts[i0];
    let (i1, d1) = argmax(&|p| (p - p0).norm());
    if d1 <= eps {
        return Err(GeometryError::degenerate("all points coincide"));
    }
    let dir = (pts[i1] - p0) / d1;
    let (i2, d2) = argmax(&|p| (p - p0).cross(&dir).norm());
    if d2 <= eps {
        return Err(GeometryError::degenerate("all points are collinear"));
    }
    let n = (pts[i1] - p0).cross(&(pts[i2] - p0)).normalize();
    let (i3, d3) = argmax(&|p| n.dot(&(p - p0)).abs());
    if d3 <= eps {
        return Err(GeometryError::degenerate("all points are coplanar"));
    }
    Ok([i0, i1, i2, i3])
}

/// Give `candidates` to the first live face (from `faces`) that sees them;
/// points no face sees are inside and dropped.
fn assign(faces: &mut [Face], order: &[usize], candidates: &[usize], pts: &[Point3], eps: f64) {
    for &i in candidates {
        if let Some(&k) = order
            .iter()
            .find(|&&k| faces[k].alive && faces[k].distance(&pts[i]) > eps)
        {
            faces[k].outside.push(i);
        }
    }
}

/// Incremental 3-D Quickhull returning triangles in input indices.
///
/// A point joins the hull only if it lies more than the relative epsilon
/// outside some face, so points on hull faces or edges are never vertices.
pub(crate) fn quickhull(pts: &[Point3]) -> Result<Vec<[usize; 3]>> {
    let eps = relative_eps(pts);
    let simplex = initial_simplex(pts, eps)?;
    let inner = centroid(simplex.iter().map(|&i| &pts[i]));
    let [a, b, c, d] = simplex;

    let mut faces: Vec<Face> = [[a, b, c], [a, b, d], [a, c, d], [b, c, d]]
        .into_iter()
        .map(|v| Face::new(v, pts, &inner))
        .collect();
    let rest: Vec<usize> = (0..pts.len()).filter(|i| !simplex.contains(i)).collect();
    assign(&mut faces, &[0, 1, 2, 3], &rest, pts, eps);

    while let Some(k) = faces.iter().position(|f| f.alive && !f.outside.is_empty()) {
        let Some(apex) = faces[k].furthest(pts) else {
            break;
        };
        let ap = pts[apex];

        let visible: Vec<usize> = (0..faces.len())
            .filter(|&j| faces[j].alive && faces[j].distance(&ap) > eps)
            .collect();
        let directed: HashSet<(usize, usize)> = visible
            .iter()
            .flat_map(|&j| {
                let [u, v, w] = faces[j].v;
                [(u, v), (v, w), (w, u)]
            })
            .collect();
        let horizon: Vec<(usize, usize)> = visible
            .iter()
            .flat_map(|&j| {
                let [u, v, w] = faces[j].v;
                [(u, v), (v, w), (w, u)]
            })
            .filter(|&(u, v)| !directed.contains(&(v, u)))
            .collect();

        let mut orphans = Vec::new();
        for &j in &visible {
            faces[j].alive = false;
            orphans.extend(faces[j].outside.drain(..).filter(|&i| i != apex));
        }

        let first_new = faces.len();
        for &(u, v) in &horizon {
            faces.push(Face::new([u, v, apex], pts, &inner));
        }
        trace!(
            apex,
            visible = visible.len(),
            horizon = horizon.len(),
            orphans = orphans.len(),
            "quickhull step"
        );

        // New faces first, then the rest of the live hull.
        let order: Vec<usize> = (first_new..faces.len())
            .chain((0..first_new).filter(|&j| faces[j].alive))
            .collect();
        assign(&mut faces, &order, &orphans, pts, eps);
    }

    Ok(faces.into_iter().filter(|f| f.alive).map(|f| f.v).collect())
}
