use super::*;
use crate::batch::Point3;
use crate::error::GeometryError;
use nalgebra::vector;

fn cube() -> Vec<Point3> {
    vec![
        vector![0.0, 0.0, 0.0],    // 0
        vector![10.0, 0.0, 0.0],   // 1
        vector![10.0, 10.0, 0.0],  // 2
        vector![0.0, 10.0, 0.0],   // 3
        vector![5.0, 5.0, 5.0],    // 4 interior
        vector![4.0, 6.0, 2.0],    // 5 interior
        vector![10.0, 10.0, 10.0], // 6
        vector![1.0, 2.0, 3.0],    // 7 interior
        vector![10.0, 0.0, 10.0],  // 8
        vector![0.0, 0.0, 10.0],   // 9
        vector![0.0, 10.0, 10.0],  // 10
    ]
}

fn assert_oriented(points: &[Point3], hull: &Hull) {
    let mid = centroid(hull.vertices().iter().map(|&i| &points[i]));
    for &[a, b, c] in hull.facets() {
        let n = (points[b] - points[a]).cross(&(points[c] - points[a]));
        assert!(
            (points[a] - mid).dot(&n) >= 0.0,
            "facet {:?} faces inward",
            [a, b, c]
        );
    }
}

#[test]
fn cube_vertices_exclude_interior_points() {
    let pts = cube();
    let hull = build_hull(&pts, &HullCfg::default()).unwrap();
    assert_eq!(hull.vertices(), &[0, 1, 2, 3, 6, 8, 9, 10]);
    assert_eq!(hull.facets().len(), 12);
    assert_oriented(&pts, &hull);
    assert!((hull.centre() - vector![5.0, 5.0, 5.0]).norm() < 1e-12);
}

#[test]
fn convex_facets_are_supporting_planes() {
    let pts = cube();
    let hull = build_hull(&pts, &HullCfg::default()).unwrap();
    for &[a, b, c] in hull.facets() {
        let n = (pts[b] - pts[a]).cross(&(pts[c] - pts[a]));
        assert!(n.norm() > 0.0);
        for p in &pts {
            assert!(n.dot(&(p - pts[a])) <= 1e-9);
        }
    }
}

#[test]
fn neighbors_share_an_edge_and_are_symmetric() {
    let pts = cube();
    let hull = build_hull(&pts, &HullCfg::default()).unwrap();
    let facets = hull.facets();
    for (k, nb) in hull.neighbors().iter().enumerate() {
        for (slot, &j) in nb.iter().enumerate() {
            assert_ne!(j, k);
            let edge: Vec<usize> = (0..3)
                .filter(|&s| s != slot)
                .map(|s| facets[k][s])
                .collect();
            assert!(edge.iter().all(|v| facets[j].contains(v)));
            assert!(hull.neighbors()[j].contains(&k));
        }
    }
}

#[test]
fn points_on_faces_and_edges_are_not_vertices() {
    let mut pts = cube();
    pts.push(vector![5.0, 5.0, 10.0]); // 11, face centre
    pts.push(vector![5.0, 0.0, 0.0]); // 12, edge midpoint
    pts.push(vector![10.0, 10.0, 10.0]); // 13, duplicate corner
    let hull = build_hull(&pts, &HullCfg::default()).unwrap();
    assert!(!hull.vertices().contains(&11));
    assert!(!hull.vertices().contains(&12));
    assert_eq!(hull.vertices().len(), 8);
}

#[test]
fn degenerate_inputs_are_rejected() {
    let flat = vec![
        vector![0.0, 0.0, 0.0],
        vector![1.0, 0.0, 0.0],
        vector![0.0, 1.0, 0.0],
        vector![1.0, 1.0, 0.0],
        vector![0.5, 0.2, 0.0],
    ];
    let err = build_hull(&flat, &HullCfg::default()).unwrap_err();
    assert!(matches!(err, GeometryError::DegenerateHull { .. }));

    let line: Vec<Point3> = (0..6).map(|i| vector![i as f64, i as f64, 0.0]).collect();
    assert!(build_hull(&line, &HullCfg::default()).is_err());

    assert!(build_hull(&flat[..3], &HullCfg::default()).is_err());

    let mut bad = cube();
    bad[4].y = f64::NAN;
    assert!(build_hull(&bad, &HullCfg::default()).is_err());

    let cfg = HullCfg::modified(-1.0, vector![5.0, 5.0, 5.0]);
    assert!(build_hull(&cube(), &cfg).is_err());
}

#[test]
fn modified_hull_admits_nearly_interior_point() {
    let mut pts: Vec<Point3> = cube()
        .into_iter()
        .enumerate()
        .filter(|(i, _)| ![4, 5, 7].contains(i))
        .map(|(_, p)| p)
        .collect();
    pts.push(vector![4.999, 4.999, 0.0]);

    let plain = build_hull(&pts, &HullCfg::default()).unwrap();
    assert_eq!(plain.vertices().len(), 8);

    let cfg = HullCfg::modified(0.2, vector![5.0, 5.0, 5.0]);
    let hull = build_hull(&pts, &cfg).unwrap();
    assert_eq!(hull.vertices().len(), 9);
    assert!(hull.vertices().contains(&8));
    assert!(hull.is_modified());
    assert_eq!(hull.centre(), vector![5.0, 5.0, 5.0]);
    assert_oriented(&pts, &hull);
}

#[test]
fn modified_hull_defaults_centre_to_point_centroid() {
    let pts = cube();
    let cfg = HullCfg {
        gamma: 0.5,
        centre: None,
    };
    let hull = build_hull(&pts, &cfg).unwrap();
    let expected = centroid(pts.iter());
    assert!((hull.centre() - expected).norm() < 1e-12);
    assert_oriented(&pts, &hull);
}

#[test]
fn supplied_centre_is_reported_for_plain_hull() {
    let cfg = HullCfg {
        gamma: 1.0,
        centre: Some(vector![0.5, 0.5, 0.5]),
    };
    let hull = build_hull(&cube(), &cfg).unwrap();
    assert_eq!(hull.centre(), vector![0.5, 0.5, 0.5]);
    assert!(!hull.is_modified());
}

#[test]
fn incident_facets_cover_vertex_star() {
    let hull = build_hull(&cube(), &HullCfg::default()).unwrap();
    for &v in hull.vertices() {
        let star: Vec<usize> = hull.incident_facets(v).collect();
        // Each cube corner touches three square faces, i.e. 3 to 6 triangles.
        assert!((3..=6).contains(&star.len()), "vertex {v}: {star:?}");
    }
}

#[test]
fn relative_eps_scales_with_magnitude() {
    let small = [vector![0.1, 0.2, 0.3]];
    let large = [vector![0.0, -2000.0, 5.0]];
    assert!((relative_eps(&small) - crate::cfg::HULL_EPS).abs() < 1e-24);
    assert!((relative_eps(&large) - 2000.0 * crate::cfg::HULL_EPS).abs() < 1e-18);
}
