// Copyright 2025 The planar-dcel Authors
// Shared test utilities for planar-dcel tests.

#![allow(dead_code)]

use std::sync::Once;

use num_traits::Zero;
use planar_dcel::{area_of_face, is_face_triangle, Dcel, FaceIdx, Rat, RatPoint, RatSegment};

static TRACING: Once = Once::new();

/// Route `tracing` events to the test harness writer when `TEST_LOG` is set.
pub fn init_tracing() {
    TRACING.call_once(|| {
        if std::env::var_os("TEST_LOG").is_some() {
            let _ = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_test_writer()
                .try_init();
        }
    });
}

pub fn p(x: i64, y: i64) -> RatPoint {
    RatPoint::from_ints(x, y)
}

pub fn pts(coords: &[(i64, i64)]) -> Vec<RatPoint> {
    coords.iter().map(|&(x, y)| p(x, y)).collect()
}

pub fn seg(ax: i64, ay: i64, bx: i64, by: i64) -> RatSegment {
    RatSegment::from_ints(ax, ay, bx, by)
}

pub fn polygon(coords: &[(i64, i64)]) -> Dcel {
    Dcel::closed_path(&pts(coords)).expect("simple polygon")
}

pub fn square(x: i64, y: i64, side: i64) -> Dcel {
    polygon(&[(x, y), (x + side, y), (x + side, y + side), (x, y + side)])
}

/// Sum of the areas of all bounded faces.
pub fn bounded_area(d: &Dcel) -> Rat {
    (1..d.num_faces() as FaceIdx)
        .map(|f| area_of_face(d, f).expect("bounded face"))
        .fold(Rat::zero(), |acc, a| acc + a)
}

/// Every structural invariant, with the failing check in the panic message.
pub fn assert_dcel_ok(d: &Dcel) {
    if let Err(e) = d.validate() {
        panic!("invalid subdivision: {e}\n{d}");
    }
    for (i, e) in d.edges().iter().enumerate() {
        assert_eq!(d.edges()[e.twin as usize].twin as usize, i, "twin of twin");
        assert_eq!(d.edges()[e.next as usize].prev as usize, i, "prev of next");
        assert_eq!(d.edges()[e.prev as usize].next as usize, i, "next of prev");
    }
}

pub fn assert_triangulated(d: &Dcel) {
    assert_dcel_ok(d);
    for f in 1..d.num_faces() as FaceIdx {
        assert!(is_face_triangle(d, f), "face {f} is not a triangle\n{d}");
    }
}

/// Counter-clockwise zig-zag with `teeth` spikes on top of a flat base.
pub fn comb(teeth: i64) -> Vec<RatPoint> {
    let mut out = vec![p(0, 0), p(2 * teeth, 0)];
    for i in (0..teeth).rev() {
        out.push(p(2 * i + 1, 5));
        out.push(p(2 * i, 2));
    }
    out
}
