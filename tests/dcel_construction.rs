// Copyright 2025 The planar-dcel Authors
// Constructors, table layout and transforms of planar subdivisions.

mod helpers;

use helpers::{assert_dcel_ok, bounded_area, p, polygon, pts, seg, square};
use planar_dcel::geom::{int, rat};
use planar_dcel::{area_of_face, Dcel, DcelError, Rat, RatPoint, OUTER_FACE};

#[test]
fn single_segment_layout() {
    let d = Dcel::from_segment(p(0, 0), p(3, 1));
    assert_eq!(d.num_vertices(), 2);
    assert_eq!(d.num_edges(), 2);
    assert_eq!(d.num_faces(), 1);
    let e = &d.edges()[0];
    assert_eq!((e.origin, e.twin, e.incface, e.next, e.prev), (0, 1, 0, 1, 1));
    let e = &d.edges()[1];
    assert_eq!((e.origin, e.twin, e.incface, e.next, e.prev), (1, 0, 0, 0, 0));
    assert_eq!(d.faces()[0].inner_components, vec![0]);
    assert_eq!(d.faces()[0].outer_component, None);
    assert!(Dcel::from_segment(p(2, 2), p(2, 2)).is_empty());
}

#[test]
fn closed_path_has_two_faces() {
    let d = polygon(&[(0, 0), (4, 0), (4, 3), (0, 3)]);
    assert_dcel_ok(&d);
    assert_eq!(d.num_vertices(), 4);
    assert_eq!(d.num_edges(), 8);
    assert_eq!(d.num_faces(), 2);
    assert_eq!(area_of_face(&d, 1), Ok(int(12)));
    assert_eq!(d.faces()[OUTER_FACE as usize].inner_components.len(), 1);

    // Clockwise input describes the same region.
    let cw = polygon(&[(0, 0), (0, 3), (4, 3), (4, 0)]);
    assert!(cw.is_isomorphic(&d));
}

#[test]
fn closed_path_rejects_bad_input() {
    assert_eq!(
        Dcel::closed_path(&pts(&[(0, 0), (1, 1)])),
        Err(DcelError::TooFewPoints(2))
    );
    // A bow tie crosses itself.
    assert!(matches!(
        Dcel::closed_path(&pts(&[(0, 0), (2, 2), (2, 0), (0, 2)])),
        Err(DcelError::SelfIntersectingPath(_, _))
    ));
}

#[test]
fn open_path_is_a_wire_on_face_zero() {
    let d = Dcel::open_path(&pts(&[(0, 0), (2, 0), (2, 2), (5, 2)]));
    assert_dcel_ok(&d);
    assert_eq!(d.num_faces(), 1);
    assert_eq!(d.num_edges(), 6);
    assert!(d.edges().iter().all(|e| e.incface == OUTER_FACE));
    assert!((0..d.num_edges() as u32).all(|e| d.is_edge_of_stick_figure(e)));

    assert!(Dcel::open_path(&pts(&[(1, 1)])).is_empty());
    assert_eq!(
        Dcel::open_path(&pts(&[(0, 0), (1, 0)])),
        Dcel::from_segment(p(0, 0), p(1, 0))
    );
}

#[test]
fn crossing_open_path_closes_a_face() {
    let d = Dcel::open_path(&pts(&[(0, 0), (4, 0), (4, 4), (2, 4), (2, -2)]));
    assert_dcel_ok(&d);
    assert_eq!(d.num_faces(), 2);
    assert!(d.lookup_vertex(&p(2, 0)).is_some());
    assert_eq!(area_of_face(&d, 1), Ok(int(8)));
}

#[test]
fn edge_list_splits_every_crossing() {
    // A tic-tac-toe grid.
    let d = Dcel::from_segments(&[
        seg(1, 0, 1, 3),
        seg(2, 0, 2, 3),
        seg(0, 1, 3, 1),
        seg(0, 2, 3, 2),
    ]);
    assert_dcel_ok(&d);
    assert_eq!(d.num_vertices(), 12);
    assert_eq!(d.num_edges(), 24);
    assert_eq!(d.num_faces(), 2);
    assert_eq!(bounded_area(&d), int(1));
    let center = d.lookup_vertex(&p(1, 1)).unwrap();
    assert_eq!(d.out_edges(center).len(), 4);
}

#[test]
fn vertex_numbering_is_row_major() {
    let d = polygon(&[(5, 5), (0, 5), (3, 0)]);
    let locations: Vec<&RatPoint> = d.vertices().iter().map(|v| &v.location).collect();
    assert_eq!(locations, vec![&p(3, 0), &p(0, 5), &p(5, 5)]);
    for (i, v) in d.vertices().iter().enumerate() {
        assert_eq!(d.origin(v.outedge) as usize, i);
    }
}

#[test]
fn out_edges_turn_counter_clockwise() {
    let d = Dcel::from_segments(&[seg(0, 0, 1, 0), seg(0, 0, 0, 1), seg(0, 0, -1, -1)]);
    let v = d.lookup_vertex(&p(0, 0)).unwrap();
    let dests: Vec<RatPoint> = d
        .out_edges(v)
        .into_iter()
        .map(|e| d.location(d.dest(e)).clone())
        .collect();
    let start = dests.iter().position(|q| *q == p(1, 0)).unwrap();
    let rotated: Vec<RatPoint> = dests[start..].iter().chain(&dests[..start]).cloned().collect();
    assert_eq!(rotated, vec![p(1, 0), p(0, 1), p(-1, -1)]);
}

#[test]
fn translate_moves_without_relinking() {
    let mut d = square(0, 0, 2);
    let before = d.clone();
    d.translate(&RatPoint::new(rat(1, 2), int(-3)));
    assert_dcel_ok(&d);
    assert_eq!(d.edges(), before.edges());
    assert!(d.lookup_vertex(&RatPoint::new(rat(1, 2), int(-3))).is_some());
    assert_eq!(area_of_face(&d, 1), Ok(int(4)));
}

fn matrix(m: [i64; 9]) -> [Rat; 9] {
    m.map(int)
}

#[test]
fn affine_transforms_scale_area_by_determinant() {
    let mut d = square(0, 0, 2);
    // Shear plus scale, determinant 6.
    d.transform(&matrix([2, 1, 5, 0, 3, -1, 0, 0, 1])).unwrap();
    assert_dcel_ok(&d);
    assert_eq!(bounded_area(&d), int(24));

    // A reflection reverses orientation; faces stay on the left.
    let mut m = square(0, 0, 2);
    m.transform(&matrix([-1, 0, 0, 0, 1, 0, 0, 0, 1])).unwrap();
    assert_dcel_ok(&m);
    assert_eq!(bounded_area(&m), int(4));
    assert!(m.is_isomorphic(&square(-2, 0, 2)));
}

#[test]
fn projective_transform_maps_exactly() {
    let mut d = Dcel::from_segment(p(1, 0), p(0, 1));
    // (x, y) -> (x, y) / (x + y + 1)
    d.transform(&matrix([1, 0, 0, 0, 1, 0, 1, 1, 1])).unwrap();
    assert!(d.lookup_vertex(&RatPoint::new(rat(1, 2), int(0))).is_some());
    assert!(d.lookup_vertex(&RatPoint::new(int(0), rat(1, 2))).is_some());
}

#[test]
fn bad_transforms_leave_the_subdivision_untouched() {
    let mut d = square(0, 0, 2);
    let before = d.clone();
    assert_eq!(
        d.transform(&matrix([1, 2, 0, 2, 4, 0, 0, 0, 1])),
        Err(DcelError::SingularTransform)
    );
    // w = x - 2 vanishes at x = 2 and changes sign across the square.
    assert!(d
        .transform(&matrix([1, 0, 0, 0, 1, 0, 1, 0, -2]))
        .is_err());
    assert!(matches!(
        d.transform(&matrix([1, 0, 0, 0, 1, 0, 1, 0, -1])),
        Err(DcelError::SplitByLineAtInfinity)
    ));
    assert_eq!(d, before);
}

#[test]
fn face_queries() {
    let d = square(0, 0, 4).merge(&square(1, 1, 1));
    assert_eq!(d.face(7), Err(DcelError::NoSuchFace(7)));
    let ring = (1..d.num_faces() as u32)
        .find(|&f| !d.faces()[f as usize].inner_components.is_empty())
        .unwrap();
    assert_eq!(d.face_edges(ring).unwrap().len(), 8);
    assert_eq!(area_of_face(&d, ring), Ok(int(15)));
    let (lo, hi) = d.bounding_box().unwrap();
    assert_eq!((lo, hi), (p(0, 0), p(4, 4)));
    assert!(Dcel::new().bounding_box().is_none());
}

#[test]
fn display_lists_every_table() {
    let text = polygon(&[(0, 0), (1, 0), (0, 1)]).to_string();
    assert!(text.contains("vertices"));
    assert!(text.contains("edges"));
    assert!(text.contains("faces"));
}
