// Copyright 2025 The planar-dcel Authors
// License: MIT
//
// Doubly-connected edge list over exact rational coordinates.
//
// Vertices, half-edges and faces are plain Vec tables addressed by u32
// indices. A face lies to the left of each of its half-edges, so outer
// boundaries run counter-clockwise and hole boundaries clockwise.
//
// Design:
//   - faces[0] is the unbounded face; it never has an outer component.
//   - Every subdivision built here numbers half-edges in pairs,
//     twin(2k) = 2k + 1. Tables read from XML may pair them differently,
//     so nothing outside `arrangement` relies on the pairing.
//   - Vertices of a built subdivision are numbered in row-major point order.
//   - A subdivision is only changed wholesale: `merge` returns a new value
//     and `transform` either moves every vertex or rebuilds.

mod arrangement;
mod faces;
mod iso;
mod svg;
mod xml;

pub use svg::SvgOptions;

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::error::DcelError;
use crate::geom::{
    segment_intersection, signed_area, AngleOrder, CrossProductOrder, Rat, RatPoint, RatSegment,
    SegmentIntersection,
};

/// Index into Dcel::vertices
pub type VertIdx = u32;
/// Index into Dcel::edges
pub type EdgeIdx = u32;
/// Index into Dcel::faces
pub type FaceIdx = u32;

/// The unbounded face.
pub const OUTER_FACE: FaceIdx = 0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexRecord {
    pub location: RatPoint,
    /// One half-edge whose origin is this vertex.
    pub outedge: EdgeIdx,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeRecord {
    pub origin: VertIdx,
    pub twin: EdgeIdx,
    pub incface: FaceIdx,
    pub next: EdgeIdx,
    pub prev: EdgeIdx,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaceRecord {
    pub outer_component: Option<EdgeIdx>,
    pub inner_components: Vec<EdgeIdx>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dcel {
    pub(crate) vertices: Vec<VertexRecord>,
    pub(crate) edges: Vec<EdgeRecord>,
    pub(crate) faces: Vec<FaceRecord>,
    lookup: BTreeMap<RatPoint, VertIdx>,
}

impl Default for Dcel {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────── Construction ───────────────────────────

impl Dcel {
    /// Empty subdivision: just the unbounded face.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: vec![FaceRecord::default()],
            lookup: BTreeMap::new(),
        }
    }

    /// Assemble from raw tables, checking every structural invariant.
    pub fn from_tables(
        vertices: Vec<VertexRecord>,
        edges: Vec<EdgeRecord>,
        faces: Vec<FaceRecord>,
    ) -> Result<Self, DcelError> {
        let mut d = Self {
            vertices,
            edges,
            faces,
            lookup: BTreeMap::new(),
        };
        d.rebuild_lookup();
        if d.lookup.len() != d.vertices.len() {
            return Err(DcelError::Inconsistent(
                "two vertices share a location".into(),
            ));
        }
        d.validate()?;
        Ok(d)
    }

    /// A single segment a -> b. A degenerate segment gives the empty subdivision.
    pub fn from_segment(a: RatPoint, b: RatPoint) -> Self {
        if a == b {
            return Self::new();
        }
        let mut d = Self {
            vertices: vec![
                VertexRecord {
                    location: a,
                    outedge: 0,
                },
                VertexRecord {
                    location: b,
                    outedge: 1,
                },
            ],
            edges: vec![
                EdgeRecord {
                    origin: 0,
                    twin: 1,
                    incface: OUTER_FACE,
                    next: 1,
                    prev: 1,
                },
                EdgeRecord {
                    origin: 1,
                    twin: 0,
                    incface: OUTER_FACE,
                    next: 0,
                    prev: 0,
                },
            ],
            faces: vec![FaceRecord {
                outer_component: None,
                inner_components: vec![0],
            }],
            lookup: BTreeMap::new(),
        };
        d.rebuild_lookup();
        d
    }

    /// Planar graph of an unordered segment list, split at every
    /// intersection. Zero-length segments are ignored.
    pub fn from_segments(segments: &[RatSegment]) -> Self {
        Self::from_segments_with_order(segments, &CrossProductOrder)
    }

    pub fn from_segments_with_order<O: AngleOrder>(segments: &[RatSegment], order: &O) -> Self {
        arrangement::build(segments, order)
    }

    /// Polyline through `points`. Fewer than two points give the empty
    /// subdivision. The path may cross itself.
    pub fn open_path(points: &[RatPoint]) -> Self {
        match points {
            [] | [_] => Self::new(),
            [a, b] => Self::from_segment(a.clone(), b.clone()),
            _ => Self::from_segments(&path_segments(points, false)),
        }
    }

    /// Simple closed polygon through `points`, closing back to the first.
    pub fn closed_path(points: &[RatPoint]) -> Result<Self, DcelError> {
        if points.len() < 3 {
            return Err(DcelError::TooFewPoints(points.len()));
        }
        let segments = path_segments(points, true);
        check_simple_cycle(&segments)?;
        Ok(Self::from_segments(&segments))
    }

    /// Rectangle with opposite corners `c11` and `c22`.
    pub fn axis_aligned_rectangle(c11: &RatPoint, c22: &RatPoint) -> Result<Self, DcelError> {
        Self::closed_path(&[
            c11.clone(),
            RatPoint::new(c22.x.clone(), c11.y.clone()),
            c22.clone(),
            RatPoint::new(c11.x.clone(), c22.y.clone()),
        ])
    }

    /// Planar overlay of `self` and `other`.
    pub fn merge(&self, other: &Dcel) -> Dcel {
        self.merge_with_order(other, &CrossProductOrder)
    }

    pub fn merge_with_order<O: AngleOrder>(&self, other: &Dcel, order: &O) -> Dcel {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut segments = self.segments();
        segments.extend(other.segments());
        tracing::debug!(
            left_edges = self.num_edges(),
            right_edges = other.num_edges(),
            "merging subdivisions"
        );
        Self::from_segments_with_order(&segments, order)
    }

    /// Merge a batch of extra segments into this subdivision.
    pub fn merge_segments(&self, extra: &[RatSegment]) -> Dcel {
        if extra.is_empty() {
            return self.clone();
        }
        let mut segments = self.segments();
        segments.extend(extra.iter().cloned());
        Self::from_segments(&segments)
    }

    fn rebuild_lookup(&mut self) {
        self.lookup = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (v.location.clone(), i as VertIdx))
            .collect();
    }
}

fn path_segments(points: &[RatPoint], closed: bool) -> Vec<RatSegment> {
    let mut segments: Vec<RatSegment> = points
        .windows(2)
        .map(|w| RatSegment::new(w[0].clone(), w[1].clone()))
        .collect();
    if closed {
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            segments.push(RatSegment::new(last.clone(), first.clone()));
        }
    }
    segments
}

/// Consecutive edges may only share their common endpoint; all other pairs
/// must be disjoint.
fn check_simple_cycle(segments: &[RatSegment]) -> Result<(), DcelError> {
    let n = segments.len();
    for (i, s) in segments.iter().enumerate() {
        if s.is_degenerate() {
            return Err(DcelError::SelfIntersectingPath(i, i));
        }
    }
    for i in 0..n {
        for j in i + 1..n {
            let hit = segment_intersection(&segments[i], &segments[j]);
            let shared = if j == i + 1 {
                Some(&segments[i].b)
            } else if i == 0 && j == n - 1 {
                Some(&segments[i].a)
            } else {
                None
            };
            let ok = match (&hit, shared) {
                (SegmentIntersection::None, None) => true,
                (SegmentIntersection::Point(p), Some(s)) => p == s,
                _ => false,
            };
            if !ok {
                return Err(DcelError::SelfIntersectingPath(i, j));
            }
        }
    }
    Ok(())
}

// ─────────────────────────── Queries ───────────────────────────

impl Dcel {
    pub fn vertices(&self) -> &[VertexRecord] {
        &self.vertices
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    pub fn faces(&self) -> &[FaceRecord] {
        &self.faces
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn face(&self, f: FaceIdx) -> Result<&FaceRecord, DcelError> {
        self.faces.get(f as usize).ok_or(DcelError::NoSuchFace(f))
    }

    #[inline]
    pub fn location(&self, v: VertIdx) -> &RatPoint {
        &self.vertices[v as usize].location
    }

    #[inline]
    pub fn origin(&self, e: EdgeIdx) -> VertIdx {
        self.edges[e as usize].origin
    }

    #[inline]
    pub fn dest(&self, e: EdgeIdx) -> VertIdx {
        self.origin(self.twin(e))
    }

    #[inline]
    pub fn twin(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].twin
    }

    #[inline]
    pub fn next(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].next
    }

    #[inline]
    pub fn prev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].prev
    }

    #[inline]
    pub fn incface(&self, e: EdgeIdx) -> FaceIdx {
        self.edges[e as usize].incface
    }

    /// Directed segment origin -> destination of a half-edge.
    pub fn edge_segment(&self, e: EdgeIdx) -> RatSegment {
        RatSegment::new(
            self.location(self.origin(e)).clone(),
            self.location(self.dest(e)).clone(),
        )
    }

    /// One segment per undirected edge.
    pub fn segments(&self) -> Vec<RatSegment> {
        (0..self.edges.len() as EdgeIdx)
            .filter(|&e| e < self.twin(e))
            .map(|e| self.edge_segment(e))
            .collect()
    }

    pub fn lookup_vertex(&self, p: &RatPoint) -> Option<VertIdx> {
        self.lookup.get(p).copied()
    }

    /// Half-edge running from `a` to `b`.
    pub fn lookup_edge(&self, a: &RatPoint, b: &RatPoint) -> Option<EdgeIdx> {
        let va = self.lookup_vertex(a)?;
        let vb = self.lookup_vertex(b)?;
        self.out_edges(va).into_iter().find(|&e| self.dest(e) == vb)
    }

    /// Half-edges leaving `v`, counter-clockwise.
    pub fn out_edges(&self, v: VertIdx) -> Vec<EdgeIdx> {
        let start = self.vertices[v as usize].outedge;
        let mut star = vec![start];
        let mut e = self.twin(self.prev(start));
        while e != start && star.len() <= self.edges.len() {
            star.push(e);
            e = self.twin(self.prev(e));
        }
        star
    }

    /// Boundary cycle through `e`, in `next` order starting at `e`.
    pub fn cycle_of_edge(&self, e: EdgeIdx) -> Vec<EdgeIdx> {
        let mut cycle = vec![e];
        let mut cur = self.next(e);
        while cur != e && cycle.len() <= self.edges.len() {
            cycle.push(cur);
            cur = self.next(cur);
        }
        cycle
    }

    /// Every boundary cycle, each starting at its lowest edge index.
    pub fn cycles(&self) -> Vec<Vec<EdgeIdx>> {
        faces::cycles_of(&self.edges)
    }

    /// Shoelace area of the cycle through `e`.
    pub fn cycle_area(&self, e: EdgeIdx) -> Rat {
        signed_area(
            self.cycle_of_edge(e)
                .into_iter()
                .map(|c| self.location(self.origin(c))),
        )
    }

    /// Outer boundary edges followed by every hole's edges.
    pub fn face_edges(&self, f: FaceIdx) -> Result<Vec<EdgeIdx>, DcelError> {
        let face = self.face(f)?;
        let mut out = Vec::new();
        if let Some(e) = face.outer_component {
            out.extend(self.cycle_of_edge(e));
        }
        for &e in &face.inner_components {
            out.extend(self.cycle_of_edge(e));
        }
        Ok(out)
    }

    /// Standalone subdivision holding only the boundary of bounded face `f`,
    /// its outer cycle and holes, renumbered from zero. Hole interiors
    /// become bounded faces of their own.
    pub fn face_export(&self, f: FaceIdx) -> Result<Dcel, DcelError> {
        if f == OUTER_FACE {
            return Err(DcelError::UnboundedFace);
        }
        let edges = self.face_edges(f)?;
        let segments: Vec<RatSegment> = edges
            .iter()
            .filter(|&&e| e < self.twin(e) || self.incface(self.twin(e)) != f)
            .map(|&e| self.edge_segment(e))
            .collect();
        let out = Self::from_segments(&segments);
        tracing::debug!(face = f, edges = out.num_edges(), faces = out.num_faces(), "exported face");
        Ok(out)
    }

    /// Least common multiple of every coordinate's denominator. Scaling by
    /// it puts all vertices on the integer lattice.
    pub fn common_denominator(&self) -> BigInt {
        self.vertices.iter().fold(BigInt::one(), |acc, v| {
            acc.lcm(v.location.x.denom()).lcm(v.location.y.denom())
        })
    }

    /// Both sides of the edge lie on the same face.
    pub fn is_edge_of_stick_figure(&self, e: EdgeIdx) -> bool {
        self.incface(e) == self.incface(self.twin(e))
    }

    /// Axis-aligned (min, max) corners.
    pub fn bounding_box(&self) -> Option<(RatPoint, RatPoint)> {
        let first = self.vertices.first()?;
        let mut lo = first.location.clone();
        let mut hi = first.location.clone();
        for v in &self.vertices[1..] {
            let p = &v.location;
            if p.x < lo.x {
                lo.x = p.x.clone();
            }
            if p.y < lo.y {
                lo.y = p.y.clone();
            }
            if p.x > hi.x {
                hi.x = p.x.clone();
            }
            if p.y > hi.y {
                hi.y = p.y.clone();
            }
        }
        Some((lo, hi))
    }
}

// ─────────────────────────── Coordinate changes ───────────────────────────

impl Dcel {
    pub fn translate(&mut self, offset: &RatPoint) {
        for v in &mut self.vertices {
            v.location = &v.location + offset;
        }
        self.rebuild_lookup();
    }

    /// Apply the row-major homogeneous matrix `m` to every vertex.
    ///
    /// Orientation-preserving maps move vertices in place. Reflections
    /// rebuild the subdivision so that outer boundaries stay
    /// counter-clockwise; the result is isomorphic to the input.
    pub fn transform(&mut self, m: &[Rat; 9]) -> Result<(), DcelError> {
        let det = &m[0] * (&m[4] * &m[8] - &m[5] * &m[7]) - &m[1] * (&m[3] * &m[8] - &m[5] * &m[6])
            + &m[2] * (&m[3] * &m[7] - &m[4] * &m[6]);
        if det.is_zero() {
            return Err(DcelError::SingularTransform);
        }

        let mut moved = Vec::with_capacity(self.vertices.len());
        let mut w_negative = None;
        for (i, v) in self.vertices.iter().enumerate() {
            let (x, y) = (&v.location.x, &v.location.y);
            let w = x * &m[6] + y * &m[7] + &m[8];
            if w.is_zero() {
                return Err(DcelError::PointAtInfinity(i));
            }
            match w_negative {
                None => w_negative = Some(w.is_negative()),
                Some(neg) if neg != w.is_negative() => {
                    return Err(DcelError::SplitByLineAtInfinity)
                }
                _ => {}
            }
            moved.push(RatPoint::new(
                (x * &m[0] + y * &m[1] + &m[2]) / &w,
                (x * &m[3] + y * &m[4] + &m[5]) / &w,
            ));
        }

        let preserves_orientation = det.is_positive() != w_negative.unwrap_or(false);
        if preserves_orientation {
            for (v, p) in self.vertices.iter_mut().zip(moved) {
                v.location = p;
            }
            self.rebuild_lookup();
        } else {
            let segments: Vec<RatSegment> = (0..self.edges.len() as EdgeIdx)
                .filter(|&e| e < self.twin(e))
                .map(|e| {
                    RatSegment::new(
                        moved[self.origin(e) as usize].clone(),
                        moved[self.dest(e) as usize].clone(),
                    )
                })
                .collect();
            *self = Self::from_segments(&segments);
        }
        Ok(())
    }
}

// ─────────────────────────── Validation ───────────────────────────

impl Dcel {
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check twin/next/prev closure, face labels and cycle orientation.
    pub fn validate(&self) -> Result<(), DcelError> {
        let bad = |msg: String| Err(DcelError::Inconsistent(msg));
        let nv = self.vertices.len();
        let ne = self.edges.len();
        let nf = self.faces.len();

        match self.faces.first() {
            None => return bad("no unbounded face".into()),
            Some(f) if f.outer_component.is_some() => {
                return bad("face 0 has an outer component".into())
            }
            _ => {}
        }
        for (e, rec) in self.edges.iter().enumerate() {
            let e = e as EdgeIdx;
            if rec.origin as usize >= nv
                || rec.twin as usize >= ne
                || rec.next as usize >= ne
                || rec.prev as usize >= ne
                || rec.incface as usize >= nf
            {
                return bad(format!("edge {e} references out of range"));
            }
            if rec.twin == e || self.twin(rec.twin) != e {
                return bad(format!("edge {e} twin mismatch"));
            }
            if self.prev(rec.next) != e || self.next(rec.prev) != e {
                return bad(format!("edge {e} next/prev mismatch"));
            }
            if self.origin(rec.next) != self.dest(e) {
                return bad(format!("edge {e} next does not start at its destination"));
            }
            if self.incface(rec.next) != rec.incface {
                return bad(format!("edge {e} face label differs from its successor"));
            }
        }
        for (v, rec) in self.vertices.iter().enumerate() {
            if rec.outedge as usize >= ne || self.origin(rec.outedge) as usize != v {
                return bad(format!("vertex {v} outedge does not leave it"));
            }
        }

        let mut components = 0usize;
        for (f, face) in self.faces.iter().enumerate() {
            if f > 0 {
                let Some(outer) = face.outer_component else {
                    return bad(format!("bounded face {f} lacks an outer component"));
                };
                if outer as usize >= ne || self.incface(outer) as usize != f {
                    return bad(format!("face {f} outer component mislabelled"));
                }
                if !self.cycle_area(outer).is_positive() {
                    return bad(format!("face {f} outer boundary is not counter-clockwise"));
                }
                components += 1;
            }
            for &e in &face.inner_components {
                if e as usize >= ne || self.incface(e) as usize != f {
                    return bad(format!("face {f} inner component mislabelled"));
                }
                if self.cycle_area(e).is_positive() {
                    return bad(format!("face {f} hole boundary is counter-clockwise"));
                }
                components += 1;
            }
        }
        let cycles = self.cycles().len();
        if cycles != components {
            return bad(format!(
                "{cycles} boundary cycles but {components} face components"
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Dcel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vertices:")?;
        for (i, v) in self.vertices.iter().enumerate() {
            writeln!(f, "  {i:>3}  {}  out {}", v.location, v.outedge)?;
        }
        writeln!(f, "edges:")?;
        for (i, e) in self.edges.iter().enumerate() {
            writeln!(
                f,
                "  {i:>3}  origin {:>3}  twin {:>3}  face {:>3}  next {:>3}  prev {:>3}",
                e.origin, e.twin, e.incface, e.next, e.prev
            )?;
        }
        writeln!(f, "faces:")?;
        for (i, face) in self.faces.iter().enumerate() {
            let outer = face
                .outer_component
                .map_or_else(|| "-".to_string(), |e| e.to_string());
            writeln!(f, "  {i:>3}  outer {outer}  inner {:?}", face.inner_components)?;
        }
        Ok(())
    }
}
