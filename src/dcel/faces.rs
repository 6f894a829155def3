// Copyright 2025 The planar-dcel Authors
// License: MIT
//
// Boundary cycles and face reconstruction.
//
// A cycle with positive area is the outer boundary of its own bounded face.
// Every connected component has exactly one other cycle, its exterior walk
// (negative area, or zero for a stick figure). That walk becomes a hole of
// the innermost bounded face of another component that surrounds it, or of
// the unbounded face when nothing does.

use num_traits::Signed;

use super::{Dcel, EdgeIdx, EdgeRecord, FaceIdx, FaceRecord, OUTER_FACE};
use crate::geom::{signed_area, winding_number, Rat, RatPoint};

/// Cycles of the `next` permutation, each starting at its lowest edge.
pub(crate) fn cycles_of(edges: &[EdgeRecord]) -> Vec<Vec<EdgeIdx>> {
    let mut seen = vec![false; edges.len()];
    let mut cycles = Vec::new();
    for start in 0..edges.len() {
        if seen[start] {
            continue;
        }
        let mut cycle = Vec::new();
        let mut e = start;
        while !seen[e] {
            seen[e] = true;
            cycle.push(e as EdgeIdx);
            e = edges[e].next as usize;
        }
        cycles.push(cycle);
    }
    cycles
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Connected component id per vertex.
fn components(d: &Dcel) -> Vec<usize> {
    let mut parent: Vec<usize> = (0..d.vertices.len()).collect();
    for e in &d.edges {
        let a = find(&mut parent, e.origin as usize);
        let b = find(&mut parent, d.edges[e.twin as usize].origin as usize);
        if a != b {
            parent[a] = b;
        }
    }
    (0..parent.len()).map(|v| find(&mut parent, v)).collect()
}

struct Cycle<'a> {
    edges: Vec<EdgeIdx>,
    area: Rat,
    component: usize,
    polygon: Vec<&'a RatPoint>,
}

/// Recompute the face table and every edge's face label from `next`.
pub(crate) fn rebuild(d: &mut Dcel) {
    let comp = components(d);
    let raw = cycles_of(&d.edges);

    let (faces, labels) = {
        let cycles: Vec<Cycle<'_>> = raw
            .into_iter()
            .map(|edges| {
                let polygon: Vec<&RatPoint> = edges
                    .iter()
                    .map(|&e| &d.vertices[d.edges[e as usize].origin as usize].location)
                    .collect();
                Cycle {
                    area: signed_area(polygon.iter().copied()),
                    component: comp[d.edges[edges[0] as usize].origin as usize],
                    edges,
                    polygon,
                }
            })
            .collect();

        let mut faces = vec![FaceRecord::default()];
        let mut face_of: Vec<FaceIdx> = vec![OUTER_FACE; cycles.len()];
        for (ci, c) in cycles.iter().enumerate() {
            if c.area.is_positive() {
                face_of[ci] = faces.len() as FaceIdx;
                faces.push(FaceRecord {
                    outer_component: Some(c.edges[0]),
                    inner_components: Vec::new(),
                });
            }
        }

        for (ci, c) in cycles.iter().enumerate() {
            if c.area.is_positive() {
                continue;
            }
            let sample = c.polygon[0];
            let mut best: Option<usize> = None;
            for (cj, other) in cycles.iter().enumerate() {
                if !other.area.is_positive() || other.component == c.component {
                    continue;
                }
                if winding_number(other.polygon.iter().copied(), sample) == 0 {
                    continue;
                }
                if best.map_or(true, |b| other.area < cycles[b].area) {
                    best = Some(cj);
                }
            }
            let face = best.map_or(OUTER_FACE, |b| face_of[b]);
            face_of[ci] = face;
            faces[face as usize].inner_components.push(c.edges[0]);
        }

        let mut labels = vec![OUTER_FACE; d.edges.len()];
        for (c, &f) in cycles.iter().zip(&face_of) {
            for &e in &c.edges {
                labels[e as usize] = f;
            }
        }
        (faces, labels)
    };

    for (e, f) in d.edges.iter_mut().zip(labels) {
        e.incface = f;
    }
    d.faces = faces;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::int;

    fn p(x: i64, y: i64) -> RatPoint {
        RatPoint::from_ints(x, y)
    }

    fn square(x: i64, y: i64, side: i64) -> Vec<RatPoint> {
        vec![p(x, y), p(x + side, y), p(x + side, y + side), p(x, y + side)]
    }

    #[test]
    fn square_with_hole() {
        let outer = Dcel::closed_path(&square(0, 0, 10)).unwrap();
        let hole = Dcel::closed_path(&square(3, 3, 2)).unwrap();
        let d = outer.merge(&hole);
        assert_eq!(d.num_faces(), 3);
        // The ring face has one hole, the small square none.
        let ring = d
            .faces()
            .iter()
            .position(|f| f.inner_components.len() == 1 && f.outer_component.is_some())
            .unwrap();
        let outer_edge = d.faces()[ring].outer_component.unwrap();
        assert_eq!(d.cycle_area(outer_edge), int(100));
        let hole_edge = d.faces()[ring].inner_components[0];
        assert_eq!(d.cycle_area(hole_edge), int(-4));
        assert_eq!(d.faces()[0].inner_components.len(), 1);
        assert!(d.is_valid());
    }

    #[test]
    fn nested_components_pick_innermost_face() {
        let big = Dcel::closed_path(&square(0, 0, 20)).unwrap();
        let mid = Dcel::closed_path(&square(5, 5, 10)).unwrap();
        let wire = Dcel::open_path(&[p(9, 9), p(11, 11)]);
        let d = big.merge(&mid).merge(&wire);
        assert!(d.is_valid());
        let e = d.lookup_edge(&p(9, 9), &p(11, 11)).unwrap();
        let f = d.incface(e);
        let outer = d.faces()[f as usize].outer_component.unwrap();
        assert_eq!(d.cycle_area(outer), int(100));
        assert!(d.is_edge_of_stick_figure(e));
    }

    #[test]
    fn disjoint_squares_are_both_holes_of_face_zero() {
        let a = Dcel::closed_path(&square(0, 0, 1)).unwrap();
        let b = Dcel::closed_path(&square(5, 0, 1)).unwrap();
        let d = a.merge(&b);
        assert_eq!(d.num_faces(), 3);
        assert_eq!(d.faces()[0].inner_components.len(), 2);
        assert_eq!(d.cycles().len(), 4);
    }
}
