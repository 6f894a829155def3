// Copyright 2025 The planar-dcel Authors
// License: MIT
//
// Sweep line for monotone decomposition. The line moves downward; a point
// is "above" another when its y is larger, or equal with a smaller x.
//
// The status structure holds the edges crossed by the sweep line that have
// the face interior on their right, ordered by where they cross it. Every
// entry carries its helper vertex.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::dcel::{Dcel, EdgeIdx, VertIdx};
use crate::geom::{orient, Rat, RatPoint};
use crate::rbtree::{Locator, NoAggregate, RedBlackTree};

/// Event order: `Less` when `p` is reached by the sweep before `q`.
#[inline]
pub fn sweep_cmp(p: &RatPoint, q: &RatPoint) -> Ordering {
    q.y.cmp(&p.y).then_with(|| p.x.cmp(&q.x))
}

#[inline]
pub fn is_above(p: &RatPoint, q: &RatPoint) -> bool {
    sweep_cmp(p, q) == Ordering::Less
}

/// Role of a boundary corner in the downward sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexStatus {
    /// Both neighbours below, interior angle under pi.
    Start,
    /// Both neighbours above, interior angle under pi.
    End,
    /// Both neighbours below, reflex.
    Split,
    /// Both neighbours above, reflex.
    Merge,
    /// On a left boundary chain: the face interior lies to the right.
    RegularLeft,
    /// On a right boundary chain: the face interior lies to the left.
    RegularRight,
}

/// Classify the corner at `origin(e)`, entered along `prev(e)` and left
/// along `e`. The face is on the left of both half-edges.
pub fn vertex_status(d: &Dcel, e: EdgeIdx) -> VertexStatus {
    let v = d.location(d.origin(e));
    let w = d.location(d.dest(e));
    let u = d.location(d.origin(d.prev(e)));
    let u_below = is_above(v, u);
    let w_below = is_above(v, w);
    let convex = orient(u, v, w) == Ordering::Greater;
    match (u_below, w_below) {
        (true, true) if convex => VertexStatus::Start,
        (true, true) => VertexStatus::Split,
        (false, false) if convex => VertexStatus::End,
        (false, false) => VertexStatus::Merge,
        // Arriving from above means the boundary runs downward here.
        (false, true) => VertexStatus::RegularLeft,
        (true, false) => VertexStatus::RegularRight,
    }
}

/// The vertex most recently seen next to an active edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Helper {
    pub vertex: VertIdx,
    pub is_merge: bool,
}

#[derive(Clone, Debug)]
pub struct ActiveEdge {
    pub edge: EdgeIdx,
    pub helper: Helper,
}

/// Where edge `e` meets the sweep line through `p`. A horizontal edge is
/// placed at its right end, the last point of it the sweep touches.
fn x_on(d: &Dcel, e: EdgeIdx, p: &RatPoint) -> Rat {
    let s = d.edge_segment(e);
    match s.x_at(&p.y) {
        Some(x) => x,
        None => s.a.x.max(s.b.x),
    }
}

/// Active edges left to right. Entries store only the edge and its helper;
/// every comparison is made against the current event point, so nothing is
/// rekeyed as the sweep moves. Active edges never cross inside the face,
/// so their order stays fixed while they are on the line.
pub struct SweepStatus<'a> {
    dcel: &'a Dcel,
    tree: RedBlackTree<EdgeIdx, Helper, NoAggregate>,
    loc_of: HashMap<EdgeIdx, Locator>,
}

impl<'a> SweepStatus<'a> {
    pub fn new(dcel: &'a Dcel) -> Self {
        Self {
            dcel,
            tree: RedBlackTree::new(),
            loc_of: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Add edge `e`, which leaves the event vertex at its origin.
    pub fn insert(&mut self, e: EdgeIdx, helper: Helper) {
        let d = self.dcel;
        let p = d.location(d.origin(e));
        let loc = self.tree.insert_by(e, helper, |&f, _| {
            if p.x < x_on(d, f, p) {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        });
        self.loc_of.insert(e, loc);
    }

    pub fn remove(&mut self, e: EdgeIdx) -> Option<ActiveEdge> {
        let loc = self.loc_of.remove(&e)?;
        self.tree
            .erase_loc(loc)
            .map(|(edge, helper)| ActiveEdge { edge, helper })
    }

    pub fn helper(&self, e: EdgeIdx) -> Option<Helper> {
        let loc = self.loc_of.get(&e)?;
        self.tree.access_loc(*loc).map(|(_, h)| *h)
    }

    pub fn set_helper(&mut self, e: EdgeIdx, helper: Helper) -> bool {
        match self.loc_of.get(&e) {
            Some(&loc) => match self.tree.satellite_mut(loc) {
                Some(h) => {
                    *h = helper;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Active edge directly left of `p` on the sweep line through it.
    pub fn left_of(&self, p: &RatPoint) -> Option<EdgeIdx> {
        let d = self.dcel;
        let right = self
            .tree
            .partition_point_by(|&f, _| x_on(d, f, p) < p.x);
        let left = match right {
            Some(r) => self.tree.predecessor(r),
            None => self.tree.loc_max(),
        }?;
        self.tree.access_loc(left).map(|(&e, _)| e)
    }

    /// Active edges left to right.
    pub fn edges(&self) -> Vec<EdgeIdx> {
        self.tree.iter().map(|(_, &e, _)| e).collect()
    }
}
