// Copyright 2025 The planar-dcel Authors
// License: MIT
//
// Planar arrangement of a segment set: the engine behind merge and every
// path constructor.
//
//   1. Sweep the segments bottom to top, finding every crossing between
//      neighbours on the sweep line.
//   2. Cut each segment at every event point found on it.
//   3. Deduplicate the pieces; collinear overlaps collapse into one edge.
//   4. Sort each vertex's out-edges by angle and link next/prev.
//   5. Walk the cycles and rebuild the face table.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use super::{faces, Dcel, EdgeIdx, EdgeRecord, VertIdx, VertexRecord, OUTER_FACE};
use crate::geom::{
    segment_intersection, AngleOrder, Rat, RatPoint, RatSegment, SegmentIntersection,
};
use crate::rbtree::{Locator, NoAggregate, RedBlackTree};

/// Where `s` crosses the sweep line through `p`. A horizontal segment is
/// only on the sweep line while it contains `p`.
fn sweep_x(s: &RatSegment, p: &RatPoint) -> Rat {
    s.x_at(&p.y).unwrap_or_else(|| p.x.clone())
}

/// dx/dy of the segment; None for horizontal, which leans furthest right.
fn lean(s: &RatSegment) -> Option<Rat> {
    if s.is_horizontal() {
        None
    } else {
        Some((&s.b.x - &s.a.x) / (&s.b.y - &s.a.y))
    }
}

/// Left-to-right order on the sweep line through `p`. Segments meeting on
/// the line are ordered as they leave it upward.
fn status_cmp(s: &RatSegment, t: &RatSegment, p: &RatPoint) -> Ordering {
    sweep_x(s, p)
        .cmp(&sweep_x(t, p))
        .then_with(|| match (lean(s), lean(t)) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Bentley-Ottmann sweep in row-major point order. Segments are canonical,
/// so each one enters the sweep line at `a` and leaves it at `b`.
struct Sweep<'s> {
    segs: &'s [RatSegment],
    /// Event point -> segments starting there.
    queue: BTreeMap<RatPoint, Vec<usize>>,
    status: RedBlackTree<usize, (), NoAggregate>,
    loc_of: Vec<Option<Locator>>,
    cuts: Vec<Vec<RatPoint>>,
}

impl<'s> Sweep<'s> {
    fn new(segs: &'s [RatSegment]) -> Self {
        let mut queue: BTreeMap<RatPoint, Vec<usize>> = BTreeMap::new();
        for (i, s) in segs.iter().enumerate() {
            queue.entry(s.a.clone()).or_default().push(i);
            queue.entry(s.b.clone()).or_default();
        }
        Self {
            segs,
            queue,
            status: RedBlackTree::new(),
            loc_of: vec![None; segs.len()],
            cuts: segs.iter().map(|s| vec![s.a.clone(), s.b.clone()]).collect(),
        }
    }

    fn id(&self, loc: Locator) -> Option<usize> {
        self.status.access_loc(loc).map(|(&i, _)| i)
    }

    /// First status entry not strictly left of `p`.
    fn first_at_or_right(&self, p: &RatPoint) -> Option<Locator> {
        let segs = self.segs;
        self.status
            .partition_point_by(|&i, _| sweep_x(&segs[i], p) < p.x)
    }

    /// Queue the crossing of two neighbours if the sweep has not passed it.
    fn check(&mut self, left: Option<Locator>, right: Option<Locator>, p: &RatPoint) {
        let (Some(i), Some(j)) = (left.and_then(|l| self.id(l)), right.and_then(|r| self.id(r)))
        else {
            return;
        };
        if let SegmentIntersection::Point(q) = segment_intersection(&self.segs[i], &self.segs[j]) {
            if q > *p {
                self.queue.entry(q).or_default();
            }
        }
    }

    fn handle(&mut self, p: RatPoint, starting: Vec<usize>) {
        let segs = self.segs;

        // Entries through p sit next to each other on the sweep line.
        let mut through = Vec::new();
        let mut cur = self.first_at_or_right(&p);
        while let Some(loc) = cur {
            match self.id(loc) {
                Some(i) if segs[i].contains(&p) => through.push(i),
                _ => break,
            }
            cur = self.status.successor(loc);
        }
        for &i in &through {
            if let Some(loc) = self.loc_of[i].take() {
                self.status.erase_loc(loc);
            }
        }
        if through.len() + starting.len() > 1 {
            for &i in through.iter().chain(&starting) {
                self.cuts[i].push(p.clone());
            }
        }

        let mut rising: Vec<usize> = starting
            .into_iter()
            .chain(through.into_iter().filter(|&i| segs[i].b != p))
            .collect();
        rising.sort_by(|&i, &j| status_cmp(&segs[i], &segs[j], &p));
        for &i in &rising {
            let loc = self
                .status
                .insert_by(i, (), |&j, _| status_cmp(&segs[i], &segs[j], &p));
            self.loc_of[i] = Some(loc);
        }

        match (rising.first(), rising.last()) {
            (Some(&lo), Some(&hi)) => {
                let lo = self.loc_of[lo];
                let hi = self.loc_of[hi];
                let left = lo.and_then(|l| self.status.predecessor(l));
                let right = hi.and_then(|h| self.status.successor(h));
                self.check(left, lo, &p);
                self.check(hi, right, &p);
            }
            _ => {
                let right = self.first_at_or_right(&p);
                let left = match right {
                    Some(r) => self.status.predecessor(r),
                    None => self.status.loc_max(),
                };
                self.check(left, right, &p);
            }
        }
    }

    fn run(mut self) -> Vec<Vec<RatPoint>> {
        let mut events = 0usize;
        while let Some((p, starting)) = self.queue.pop_first() {
            self.handle(p, starting);
            events += 1;
        }
        tracing::trace!(segments = self.segs.len(), events, "arrangement sweep");
        self.cuts
    }
}

/// Split every segment at all intersection points. Pieces come back with
/// endpoints in row-major order, deduplicated and sorted.
pub(crate) fn split_segments(segments: &[RatSegment]) -> BTreeSet<(RatPoint, RatPoint)> {
    let segs: Vec<RatSegment> = segments
        .iter()
        .filter(|s| !s.is_degenerate())
        .map(RatSegment::canonical)
        .collect();

    let mut pieces = BTreeSet::new();
    for mut pts in Sweep::new(&segs).run() {
        // Row-major order is monotone along any line.
        pts.sort();
        pts.dedup();
        for w in pts.windows(2) {
            pieces.insert((w[0].clone(), w[1].clone()));
        }
    }
    pieces
}

pub(crate) fn build<O: AngleOrder>(segments: &[RatSegment], order: &O) -> Dcel {
    let pieces = split_segments(segments);
    if pieces.is_empty() {
        return Dcel::new();
    }

    let mut index: BTreeMap<RatPoint, VertIdx> = BTreeMap::new();
    for (a, b) in &pieces {
        index.insert(a.clone(), 0);
        index.insert(b.clone(), 0);
    }
    for (i, slot) in index.values_mut().enumerate() {
        *slot = i as VertIdx;
    }

    let mut vertices: Vec<VertexRecord> = index
        .keys()
        .map(|p| VertexRecord {
            location: p.clone(),
            outedge: EdgeIdx::MAX,
        })
        .collect();
    let mut edges: Vec<EdgeRecord> = Vec::with_capacity(pieces.len() * 2);
    let mut star: Vec<Vec<EdgeIdx>> = vec![Vec::new(); vertices.len()];

    for (a, b) in &pieces {
        let e = edges.len() as EdgeIdx;
        let va = index[a];
        let vb = index[b];
        for (origin, twin) in [(va, e + 1), (vb, e)] {
            edges.push(EdgeRecord {
                origin,
                twin,
                incface: OUTER_FACE,
                next: EdgeIdx::MAX,
                prev: EdgeIdx::MAX,
            });
        }
        star[va as usize].push(e);
        star[vb as usize].push(e + 1);
    }

    for (v, out) in star.iter_mut().enumerate() {
        let center = &vertices[v].location;
        out.sort_by(|&e1, &e2| {
            let d1 = &vertices[edges[edges[e1 as usize].twin as usize].origin as usize].location;
            let d2 = &vertices[edges[edges[e2 as usize].twin as usize].origin as usize].location;
            order.compare(center, d1, d2)
        });
        let k = out.len();
        for i in 0..k {
            // The edge arriving along out[i] turns onto the clockwise neighbour.
            let incoming = edges[out[i] as usize].twin;
            let turn = out[(i + k - 1) % k];
            edges[incoming as usize].next = turn;
            edges[turn as usize].prev = incoming;
        }
        if let Some(&first) = out.iter().min() {
            vertices[v].outedge = first;
        }
    }

    let mut d = Dcel {
        vertices,
        edges,
        faces: Vec::new(),
        lookup: index,
    };
    faces::rebuild(&mut d);
    tracing::debug!(
        segments = segments.len(),
        vertices = d.num_vertices(),
        edges = d.num_edges(),
        faces = d.num_faces(),
        "built arrangement"
    );
    d
}
