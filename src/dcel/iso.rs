// Copyright 2025 The planar-dcel Authors
// License: MIT
//
// Isomorphism between two subdivisions that may number their tables
// differently. Vertices are matched by location and half-edges by their
// endpoints; the match must then carry twin, next and face labels across.

use super::{Dcel, EdgeIdx, FaceIdx, OUTER_FACE};

impl Dcel {
    /// Edge map `self -> other` certifying isomorphism, if there is one.
    pub fn isomorphism(&self, other: &Dcel) -> Option<Vec<EdgeIdx>> {
        if self.num_vertices() != other.num_vertices()
            || self.num_edges() != other.num_edges()
            || self.num_faces() != other.num_faces()
        {
            return None;
        }

        let mut map = vec![EdgeIdx::MAX; self.num_edges()];
        let mut hit = vec![false; other.num_edges()];
        for v in 0..self.num_vertices() as u32 {
            let here = self.location(v);
            let there = other.lookup_vertex(here)?;
            let star = self.out_edges(v);
            if star.len() != other.out_edges(there).len() {
                return None;
            }
            for e in star {
                let f = other.lookup_edge(here, self.location(self.dest(e)))?;
                if std::mem::replace(&mut hit[f as usize], true) {
                    return None;
                }
                map[e as usize] = f;
            }
        }
        if map.iter().any(|&f| f == EdgeIdx::MAX) {
            return None;
        }

        let mut face_map: Vec<Option<FaceIdx>> = vec![None; self.num_faces()];
        face_map[OUTER_FACE as usize] = Some(OUTER_FACE);
        let mut face_hit = vec![false; other.num_faces()];
        face_hit[OUTER_FACE as usize] = true;
        for e in 0..self.num_edges() as EdgeIdx {
            let f = map[e as usize];
            if map[self.twin(e) as usize] != other.twin(f)
                || map[self.next(e) as usize] != other.next(f)
            {
                return None;
            }
            let (mine, theirs) = (self.incface(e), other.incface(f));
            match face_map[mine as usize] {
                Some(expected) if expected != theirs => return None,
                Some(_) => {}
                None => {
                    if std::mem::replace(&mut face_hit[theirs as usize], true) {
                        return None;
                    }
                    face_map[mine as usize] = Some(theirs);
                }
            }
        }
        Some(map)
    }

    pub fn is_isomorphic(&self, other: &Dcel) -> bool {
        self.isomorphism(other).is_some()
    }
}

#[cfg(test)]
mod tests {
    use crate::dcel::Dcel;
    use crate::geom::{RatPoint, RatSegment};

    fn p(x: i64, y: i64) -> RatPoint {
        RatPoint::from_ints(x, y)
    }

    #[test]
    fn relabelled_triangle_is_isomorphic() {
        let a = Dcel::closed_path(&[p(0, 0), p(4, 0), p(0, 4)]).unwrap();
        let b = Dcel::closed_path(&[p(0, 4), p(0, 0), p(4, 0)]).unwrap();
        assert!(a.is_isomorphic(&b));

        let single = Dcel::from_segment(p(1, 1), p(0, 0));
        let rebuilt = Dcel::from_segments(&[RatSegment::from_ints(0, 0, 1, 1)]);
        assert_ne!(single, rebuilt);
        let map = single.isomorphism(&rebuilt).unwrap();
        assert_eq!(map, vec![1, 0]);
    }

    #[test]
    fn different_shapes_are_not_isomorphic() {
        let tri = Dcel::closed_path(&[p(0, 0), p(4, 0), p(0, 4)]).unwrap();
        let moved = Dcel::closed_path(&[p(0, 0), p(4, 0), p(1, 4)]).unwrap();
        let wire = Dcel::open_path(&[p(0, 0), p(4, 0), p(0, 4)]);
        assert!(!tri.is_isomorphic(&moved));
        assert!(!tri.is_isomorphic(&wire));
        assert!(tri.is_isomorphic(&tri.clone()));
    }
}
