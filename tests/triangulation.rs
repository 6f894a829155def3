// Copyright 2025 The planar-dcel Authors
// Triangulation: every bounded face becomes triangles, area is conserved.

mod helpers;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use helpers::{assert_triangulated, bounded_area, comb, p, polygon, square};
use planar_dcel::geom::{int, rat, RatPoint};
use planar_dcel::{
    edges_to_triangulate, edges_to_ymonotonize, is_face_triangle, is_face_ymonotone,
    make_faces_ymonotone, triangulate, Dcel, FaceIdx, TriangulationError,
};

fn triangulate_and_check(d: &Dcel) -> Dcel {
    let t = triangulate(d).unwrap();
    assert_triangulated(&t);
    assert_eq!(bounded_area(&t), bounded_area(d));
    t
}

/// Euler count of triangles in a polygon with `n` vertices and `h` holes.
fn expected_triangles(n: usize, h: usize) -> usize {
    n + 2 * h - 2
}

#[test]
fn convex_polygons() {
    helpers::init_tracing();
    let hexagon = polygon(&[(0, 0), (4, 0), (6, 3), (4, 6), (0, 6), (-2, 3)]);
    let t = triangulate_and_check(&hexagon);
    assert_eq!(t.num_faces() - 1, expected_triangles(6, 0));
    assert_eq!(edges_to_triangulate(&hexagon, 1).unwrap().len(), 3);
}

#[test]
fn horizontal_edges_are_handled() {
    // (4, 1) is a split vertex only because of the tie-break on y.
    let d = polygon(&[(0, 0), (2, 0), (4, 1), (6, 1), (6, 4), (0, 4)]);
    assert_eq!(is_face_ymonotone(&d, 1), Ok(false));
    assert_eq!(edges_to_ymonotonize(&d, 1).unwrap().len(), 1);
    let t = triangulate_and_check(&d);
    assert_eq!(t.num_faces() - 1, expected_triangles(6, 0));
}

#[test]
fn comb_needs_monotone_decomposition() {
    for teeth in 1..6 {
        let points = comb(teeth);
        let d = Dcel::closed_path(&points).unwrap();
        assert_eq!(is_face_ymonotone(&d, 1), Ok(teeth == 1));
        assert_eq!(
            edges_to_ymonotonize(&d, 1).unwrap().len(),
            (teeth - 1) as usize
        );
        let m = make_faces_ymonotone(&d).unwrap();
        for f in 1..m.num_faces() as FaceIdx {
            assert_eq!(is_face_ymonotone(&m, f), Ok(true), "teeth {teeth} face {f}");
        }
        let t = triangulate_and_check(&d);
        assert_eq!(t.num_faces() - 1, expected_triangles(points.len(), 0));
    }
}

#[test]
fn upside_down_comb() {
    let flipped: Vec<RatPoint> = comb(4)
        .into_iter()
        .rev()
        .map(|q| RatPoint::new(q.x, -q.y))
        .collect();
    let d = Dcel::closed_path(&flipped).unwrap();
    assert_eq!(is_face_ymonotone(&d, 1), Ok(false));
    let t = triangulate_and_check(&d);
    assert_eq!(t.num_faces() - 1, expected_triangles(flipped.len(), 0));
}

#[test]
fn spiral_polygon() {
    let d = polygon(&[
        (0, 0),
        (10, 0),
        (10, 10),
        (2, 10),
        (2, 4),
        (6, 4),
        (6, 6),
        (4, 6),
        (4, 8),
        (8, 8),
        (8, 2),
        (0, 2),
    ]);
    let t = triangulate_and_check(&d);
    assert_eq!(t.num_faces() - 1, expected_triangles(12, 0));
}

#[test]
fn faces_with_holes() {
    let d = square(0, 0, 20)
        .merge(&square(2, 2, 4))
        .merge(&polygon(&[(10, 10), (16, 11), (12, 16)]));
    let ring = (1..d.num_faces() as FaceIdx)
        .find(|&f| d.faces()[f as usize].inner_components.len() == 2)
        .unwrap();
    assert_eq!(is_face_ymonotone(&d, ring), Ok(false));
    let diagonals = edges_to_triangulate(&d, ring).unwrap();
    // 3 * 13 triangle sides = 11 boundary edges + 2 * 14 diagonals.
    assert_eq!(diagonals.len(), 14);

    let t = triangulate_and_check(&d);
    // The hole interiors are faces too: 2 triangles and 1 triangle.
    assert_eq!(t.num_faces() - 1, expected_triangles(11, 2) + 2 + 1);
}

#[test]
fn rational_coordinates() {
    let d = Dcel::closed_path(&[
        RatPoint::new(rat(1, 3), rat(1, 7)),
        RatPoint::new(rat(22, 7), int(0)),
        RatPoint::new(int(3), rat(5, 2)),
        RatPoint::new(rat(3, 2), rat(3, 2)),
        RatPoint::new(int(0), int(3)),
    ])
    .unwrap();
    let t = triangulate_and_check(&d);
    assert_eq!(t.num_faces() - 1, 3);
}

#[test]
fn random_star_polygons() {
    let mut rng = StdRng::seed_from_u64(2024);
    for round in 0..25 {
        let n = rng.gen_range(5..14);
        // Star-shaped around the origin: increasing angles, random radii.
        let directions = [
            (10, 0), (10, 3), (10, 7), (7, 10), (3, 10), (0, 10), (-3, 10), (-7, 10),
            (-10, 7), (-10, 3), (-10, 0), (-10, -3), (-10, -7), (-7, -10), (-3, -10),
            (0, -10), (3, -10), (7, -10), (10, -10), (10, -7),
        ];
        let step = directions.len() as f64 / n as f64;
        let mut pts: Vec<RatPoint> = Vec::new();
        for i in 0..n {
            let (dx, dy) = directions[(i as f64 * step) as usize];
            let r = rng.gen_range(1..6);
            pts.push(p(dx * r, dy * r));
        }
        let d = match Dcel::closed_path(&pts) {
            Ok(d) => d,
            Err(_) => continue,
        };
        match triangulate(&d) {
            Ok(t) => {
                assert_triangulated(&t);
                assert_eq!(bounded_area(&t), bounded_area(&d), "round {round}");
            }
            Err(TriangulationError::DegenerateFace { .. }) => {}
            Err(e) => panic!("round {round}: {e}"),
        }
    }
}

#[test]
fn triangulating_twice_adds_nothing() {
    let t = triangulate_and_check(&polygon(&[(0, 0), (5, 0), (5, 5), (3, 2), (0, 5)]));
    for f in 1..t.num_faces() as FaceIdx {
        assert!(is_face_triangle(&t, f));
        assert_eq!(edges_to_triangulate(&t, f), Ok(Vec::new()));
    }
    assert!(triangulate(&t).unwrap().is_isomorphic(&t));
}

#[test]
fn degenerate_faces_are_errors() {
    // A wire dangling into the face.
    let d = square(0, 0, 4).merge(&Dcel::open_path(&[p(2, 2), p(4, 2)]));
    assert!(matches!(
        triangulate(&d),
        Err(TriangulationError::DegenerateFace { .. })
    ));
    // A vertex in the middle of a side.
    let d = polygon(&[(0, 0), (2, 0), (4, 0), (2, 3)]);
    assert!(matches!(
        edges_to_triangulate(&d, 1),
        Err(TriangulationError::DegenerateFace { face: 1, .. })
    ));
    assert_eq!(
        edges_to_triangulate(&d, 0),
        Err(TriangulationError::UnboundedFace)
    );
}
