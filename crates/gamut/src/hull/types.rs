//! Hull data and construction parameters.

use crate::batch::Point3;

/// Construction parameters of a hull.
///
/// - `gamma == 1`: plain convex hull; `centre` (if any) only overrides the
///   reported centre.
/// - `gamma != 1`: “modified” hull. Points are shifted so `centre` is the
///   origin and each radius `r` is replaced by `r^gamma` before the hull is
///   taken; `centre` defaults to the centroid of all points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HullCfg {
    pub gamma: f64,
    pub centre: Option<Point3>,
}

impl Default for HullCfg {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            centre: None,
        }
    }
}

impl HullCfg {
    /// Radially warped hull about `centre`.
    pub fn modified(gamma: f64, centre: Point3) -> Self {
        Self {
            gamma,
            centre: Some(centre),
        }
    }

    #[inline]
    pub fn is_modified(&self) -> bool {
        self.gamma != 1.0
    }
}

/// Triangulated hull topology over an indexed point set.
///
/// Invariants:
/// - `vertices` is sorted and holds exactly the indices used by `facets`.
/// - Every facet `[a, b, c]` satisfies `(p_a − m)·((p_b − p_a)×(p_c − p_a)) ≥ 0`
///   for `m` the centroid of the vertex coordinates.
/// - `neighbors[k][i]` is the facet sharing the edge of facet `k` opposite its
///   slot `i`.
/// - Indices refer to the unwarped points the hull was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct Hull {
    pub(crate) vertices: Vec<usize>,
    pub(crate) facets: Vec<[usize; 3]>,
    pub(crate) neighbors: Vec<[usize; 3]>,
    pub(crate) centre: Point3,
    pub(crate) gamma: f64,
}

impl Hull {
    #[inline]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    #[inline]
    pub fn facets(&self) -> &[[usize; 3]] {
        &self.facets
    }

    #[inline]
    pub fn neighbors(&self) -> &[[usize; 3]] {
        &self.neighbors
    }

    /// Expansion centre (modified hulls, or when supplied) or vertex centroid.
    #[inline]
    pub fn centre(&self) -> Point3 {
        self.centre
    }

    #[inline]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Built from radially warped points (`gamma != 1`); such hulls need not
    /// be convex in the original coordinates.
    #[inline]
    pub fn is_modified(&self) -> bool {
        self.gamma != 1.0
    }

    /// Indices of the facets that use vertex `v`.
    pub fn incident_facets(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.facets
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.contains(&v))
            .map(|(k, _)| k)
    }
}
