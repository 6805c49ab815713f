//! The gamut: a colour point set, the space it lives in, and its hull.
//!
//! A `Gamut` is immutable once constructed and is shared freely between
//! threads; every query takes `&self` and a batch of points in the same space.

use std::fmt;

use tracing::info;

use crate::batch::{Mask, Point3, PointBatch};
use crate::compress;
use crate::error::Result;
use crate::hull::{build_hull, Hull, HullCfg};
use crate::inclusion::{self, InclusionMethod};
use crate::project;

/// Name of the colour space the coordinates are expressed in (e.g. `srgb`,
/// `cielab`). Only used as a label; no conversions happen here.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Space(String);

impl Space {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::new("srgb")
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Colour gamut represented by the hull of a point set.
#[derive(Clone, Debug)]
pub struct Gamut {
    space: Space,
    points: PointBatch,
    hull: Hull,
}

impl Gamut {
    /// Build the hull of `points` (any batch shape; flattened) under `cfg`.
    pub fn construct(space: Space, points: PointBatch, cfg: HullCfg) -> Result<Self> {
        let hull = build_hull(points.points(), &cfg)?;
        info!(
            space = %space,
            points = points.len(),
            vertices = hull.vertices().len(),
            gamma = cfg.gamma,
            "gamut constructed"
        );
        Ok(Self {
            space,
            points,
            hull,
        })
    }

    #[inline]
    pub fn space(&self) -> &Space {
        &self.space
    }

    #[inline]
    pub fn points(&self) -> &PointBatch {
        &self.points
    }

    #[inline]
    pub fn hull(&self) -> &Hull {
        &self.hull
    }

    /// Sorted indices (into the flattened points) of the hull vertices.
    #[inline]
    pub fn vertices(&self) -> &[usize] {
        self.hull.vertices()
    }

    /// Coordinates of the hull vertices, in `vertices()` order.
    pub fn vertex_points(&self) -> Vec<Point3> {
        let pts = self.points.points();
        self.hull.vertices().iter().map(|&i| pts[i]).collect()
    }

    #[inline]
    pub fn facets(&self) -> &[[usize; 3]] {
        self.hull.facets()
    }

    #[inline]
    pub fn neighbors(&self) -> &[[usize; 3]] {
        self.hull.neighbors()
    }

    #[inline]
    pub fn centre(&self) -> Point3 {
        self.hull.centre()
    }

    /// Membership mask over the batch shape of `batch`.
    pub fn is_inside(&self, batch: &PointBatch, method: InclusionMethod) -> Result<Mask> {
        inclusion::contains_all(self.points.points(), &self.hull, batch, method)
    }

    /// Surface crossing on the line from `centre` (default: the hull centre)
    /// to each point; inside points are unchanged.
    pub fn nearest_on_line(&self, batch: &PointBatch, centre: Option<Point3>) -> Result<PointBatch> {
        project::nearest_on_line_batch(self.points.points(), &self.hull, batch, centre)
    }

    /// Nearest-vertex-then-plane projection of every point.
    pub fn clip_nearest(&self, batch: &PointBatch) -> Result<PointBatch> {
        project::clip_nearest_batch(self.points.points(), &self.hull, batch)
    }

    /// Clip only the points the winding test finds outside.
    pub fn clip_out_of_gamut(&self, batch: &PointBatch) -> Result<PointBatch> {
        project::clip_out_of_gamut_batch(self.points.points(), &self.hull, batch)
    }

    /// Rescale coordinate `axis` of the batch onto the hull's extent.
    pub fn compress_axis(&self, batch: &PointBatch, axis: usize) -> Result<PointBatch> {
        compress::compress_axis(&self.vertex_points(), batch, axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use crate::sample::{cube_points, sphere_points, ReplayToken};
    use nalgebra::vector;
    use proptest::prelude::*;

    const CUBE: [[f64; 3]; 11] = [
        [0.0, 0.0, 0.0],
        [10.0, 0.0, 0.0],
        [10.0, 10.0, 0.0],
        [0.0, 10.0, 0.0],
        [5.0, 5.0, 5.0],
        [4.0, 6.0, 2.0],
        [10.0, 10.0, 10.0],
        [1.0, 2.0, 3.0],
        [10.0, 0.0, 10.0],
        [0.0, 0.0, 10.0],
        [0.0, 10.0, 10.0],
    ];

    fn batch(rows: &[[f64; 3]], shape: &[usize]) -> PointBatch {
        PointBatch::from_shape_vec(shape, rows.iter().flatten().copied().collect()).unwrap()
    }

    fn cube_gamut() -> Gamut {
        Gamut::construct(Space::default(), batch(&CUBE, &[11, 3]), HullCfg::default()).unwrap()
    }

    fn close(a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn cube_vertices_and_vertex_points() {
        let g = cube_gamut();
        assert_eq!(g.vertices(), &[0, 1, 2, 3, 6, 8, 9, 10]);
        let vp = g.vertex_points();
        assert_eq!(vp[4], vector![10.0, 10.0, 10.0]);
        assert_eq!(vp.len(), 8);
        assert_eq!(g.space().name(), "srgb");
        assert_eq!(g.neighbors().len(), g.facets().len());
        assert!(close(&g.centre(), &vector![5.0, 5.0, 5.0]));
    }

    #[test]
    fn is_inside_keeps_batch_shapes() {
        let g = cube_gamut();
        let d2 = batch(
            &[[5.0, 11.0, 3.0], [3.0, 2.0, 1.0], [11.0, 3.0, 4.0], [9.0, 2.0, 1.0]],
            &[4, 3],
        );
        let d3 = batch(
            &[[3.0, 1.0, 2.0], [3.0, 2.0, 4.0], [10.0, 3.0, 11.0], [14.0, 3.0, 2.0]],
            &[1, 4, 3],
        );
        let d1 = batch(&[[5.0, 11.0, 3.0]], &[3]);
        for method in [InclusionMethod::Winding, InclusionMethod::Convex] {
            let m = g.is_inside(&d2, method).unwrap();
            assert_eq!(m.shape(), &[4]);
            assert_eq!(m.values(), &[false, true, false, true]);

            let m = g.is_inside(&d3, method).unwrap();
            assert_eq!(m.shape(), &[1, 4]);
            assert_eq!(m.values(), &[true, true, false, false]);

            let m = g.is_inside(&d1, method).unwrap();
            assert!(m.shape().is_empty());
            assert_eq!(m.values(), &[false]);
        }
    }

    #[test]
    fn sphere_gamut_separates_inner_and_outer_shells() {
        let hull_pts = sphere_points(15.0, 400, ReplayToken::new(11, 0));
        let g = Gamut::construct(
            Space::new("cielab"),
            PointBatch::from_points(hull_pts),
            HullCfg::default(),
        )
        .unwrap();
        let inner = PointBatch::from_points(sphere_points(10.0, 300, ReplayToken::new(11, 1)));
        let outer = PointBatch::from_points(sphere_points(20.0, 300, ReplayToken::new(11, 2)));
        for method in [InclusionMethod::Winding, InclusionMethod::Convex] {
            assert!(g.is_inside(&inner, method).unwrap().all());
            assert!(g.is_inside(&outer, method).unwrap().none());
        }
    }

    #[test]
    fn projections_on_the_cube() {
        let g = cube_gamut();
        let q = batch(&[[5.0, 5.0, 15.0], [5.0, 5.0, 15.0], [5.0, 5.0, 15.0]], &[3, 3]);
        let out = g.clip_nearest(&q).unwrap();
        assert!(out.points().iter().all(|p| close(p, &vector![5.0, 5.0, 10.0])));

        let q = batch(&[[15.0, 5.0, 5.0], [5.0, 15.0, 5.0], [5.0, 5.0, 15.0]], &[3, 3]);
        let out = g.nearest_on_line(&q, None).unwrap();
        let want = [
            vector![10.0, 5.0, 5.0],
            vector![5.0, 10.0, 5.0],
            vector![5.0, 5.0, 10.0],
        ];
        for (p, w) in out.points().iter().zip(&want) {
            assert!(close(p, w), "{p:?} != {w:?}");
        }
        assert_eq!(out.shape(), &[3, 3]);
    }

    #[test]
    fn clip_out_of_gamut_on_shifted_cube() {
        let shifted: Vec<[f64; 3]> = CUBE.iter().map(|p| [p[0], p[1] - 5.0, p[2] - 5.0]).collect();
        let g = Gamut::construct(
            Space::new("cielab"),
            batch(&shifted, &[11, 3]),
            HullCfg::default(),
        )
        .unwrap();
        let q = batch(&[[4.0, 4.0, 3.0], [15.0, 1.0, 0.0], [0.0, 8.0, 8.0]], &[3, 3]);
        let out = g.clip_out_of_gamut(&q).unwrap();
        assert_eq!(out.points()[0], vector![4.0, 4.0, 3.0]);
        assert!(close(&out.points()[1], &vector![10.0, 1.0, 0.0]));
        assert!(close(&out.points()[2], &vector![0.0, 5.0, 5.0]));
    }

    #[test]
    fn compress_axis_through_the_gamut() {
        let g = cube_gamut();
        let q = batch(
            &[
                [15.0, 15.0, 15.0],
                [8.0, 8.0, 8.0],
                [5.0, 5.0, 5.0],
                [1.0, 1.0, 1.0],
                [-5.0, -5.0, -5.0],
            ],
            &[5, 3],
        );
        let out = g.compress_axis(&q, 2).unwrap();
        let z: Vec<f64> = out.points().iter().map(|p| p.z).collect();
        assert_eq!(z, vec![10.0, 6.5, 5.0, 3.0, 0.0]);
        assert_eq!(out.points()[1].x, 8.0);
    }

    #[test]
    fn modified_gamut_keeps_the_dent_vertex() {
        let mut rows: Vec<[f64; 3]> = CUBE
            .iter()
            .enumerate()
            .filter(|(i, _)| ![4, 5, 7].contains(i))
            .map(|(_, p)| *p)
            .collect();
        rows.push([4.999, 4.999, 0.0]);
        let pts = batch(&rows, &[9, 3]);
        let g = Gamut::construct(
            Space::default(),
            pts.clone(),
            HullCfg::modified(0.2, vector![5.0, 5.0, 5.0]),
        )
        .unwrap();
        assert_eq!(g.vertices().len(), 9);

        let q = PointBatch::single(vector![5.0, 5.0, 5.0]);
        assert!(g.is_inside(&q, InclusionMethod::Winding).unwrap().all());
        assert_eq!(
            g.is_inside(&q, InclusionMethod::Convex),
            Err(GeometryError::NotConvex { gamma: 0.2 })
        );
        assert!(Gamut::construct(Space::default(), pts, HullCfg::default()).is_ok());
    }

    #[test]
    fn construction_errors_surface() {
        let flat = batch(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            &[4, 3],
        );
        let err = Gamut::construct(Space::default(), flat, HullCfg::default()).unwrap_err();
        assert!(matches!(err, GeometryError::DegenerateHull { .. }));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn facets_face_outward_for_random_clouds(seed in any::<u64>(), modified in any::<bool>()) {
            let pts = cube_points(-5.0, 7.0, 60, ReplayToken::new(seed, 0));
            let cfg = if modified {
                HullCfg::modified(0.5, vector![1.0, 1.0, 1.0])
            } else {
                HullCfg::default()
            };
            let g = Gamut::construct(Space::default(), PointBatch::from_points(pts.clone()), cfg).unwrap();
            let vp = g.vertex_points();
            let mid = vp.iter().sum::<Point3>() / vp.len() as f64;
            for &[a, b, c] in g.facets() {
                let n = (pts[b] - pts[a]).cross(&(pts[c] - pts[a]));
                prop_assert!((pts[a] - mid).dot(&n) >= 0.0);
            }
        }

        #[test]
        fn own_points_are_inside(seed in any::<u64>()) {
            let pts = cube_points(-5.0, 7.0, 40, ReplayToken::new(seed, 1));
            let own = PointBatch::from_points(pts.clone());
            let g = Gamut::construct(Space::default(), own.clone(), HullCfg::default()).unwrap();
            prop_assert!(g.is_inside(&own, InclusionMethod::Winding).unwrap().all());
            prop_assert!(g.is_inside(&own, InclusionMethod::Convex).unwrap().all());
        }

        #[test]
        fn winding_and_convex_agree(seed in any::<u64>()) {
            let pts = cube_points(-5.0, 7.0, 40, ReplayToken::new(seed, 2));
            let g = Gamut::construct(Space::default(), PointBatch::from_points(pts), HullCfg::default()).unwrap();
            let q = PointBatch::from_points(cube_points(-9.0, 11.0, 64, ReplayToken::new(seed, 3)));
            let w = g.is_inside(&q, InclusionMethod::Winding).unwrap();
            let c = g.is_inside(&q, InclusionMethod::Convex).unwrap();
            prop_assert_eq!(w, c);
        }

        #[test]
        fn clipped_points_land_on_the_gamut(seed in any::<u64>()) {
            let pts = cube_points(-5.0, 7.0, 40, ReplayToken::new(seed, 4));
            let g = Gamut::construct(Space::default(), PointBatch::from_points(pts), HullCfg::default()).unwrap();
            let q = PointBatch::from_points(cube_points(-20.0, 20.0, 32, ReplayToken::new(seed, 5)));
            let clipped = g.clip_out_of_gamut(&q).unwrap();
            prop_assert!(g.is_inside(&clipped, InclusionMethod::Convex).unwrap().all());
            let again = g.clip_nearest(&clipped).unwrap();
            let moved = q.points().iter().zip(clipped.points()).filter(|(a, b)| a != b).count();
            prop_assert!(moved > 0 || g.is_inside(&q, InclusionMethod::Convex).unwrap().all());
            for (a, b) in again.points().iter().zip(clipped.points()) {
                prop_assert!(a.iter().all(|x| x.is_finite()) && b.iter().all(|x| x.is_finite()));
            }
        }
    }
}
