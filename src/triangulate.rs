// Copyright 2025 The planar-dcel Authors
// License: MIT
//
// Triangulation of bounded faces.
//
// A face is first cut into y-monotone pieces by the helper sweep (each split
// vertex is joined upward, each merge vertex downward). Each monotone piece
// is then triangulated by walking its vertices top to bottom with a stack of
// vertices still waiting for a diagonal.
//
// The pieces are traced from the face's own boundary plus the diagonals,
// without rebuilding the subdivision. Results are returned as segments;
// merging them into the subdivision produces the triangles.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use num_traits::{Signed, Zero};

use crate::dcel::{Dcel, EdgeIdx, FaceIdx, VertIdx, OUTER_FACE};
use crate::error::TriangulationError;
use crate::geom::{orient, AngleOrder, CrossProductOrder, Rat, RatSegment};
use crate::sweep::{sweep_cmp, Helper, SweepStatus};

pub use crate::sweep::{vertex_status, VertexStatus};

/// A diagonal as its two end vertices.
type Diagonal = (VertIdx, VertIdx);

fn segments(d: &Dcel, diagonals: &[Diagonal]) -> Vec<RatSegment> {
    diagonals
        .iter()
        .map(|&(a, b)| RatSegment::new(d.location(a).clone(), d.location(b).clone()))
        .collect()
}

/// Vertices of the boundary cycle starting at each corner, in `next` order.
fn ring_of(d: &Dcel, corners: &[EdgeIdx]) -> Vec<VertIdx> {
    corners.iter().map(|&e| d.origin(e)).collect()
}

fn bounded_face(d: &Dcel, f: FaceIdx) -> Result<(), TriangulationError> {
    if f == OUTER_FACE {
        return Err(TriangulationError::UnboundedFace);
    }
    d.face(f)?;
    Ok(())
}

/// Exact area of a bounded face: its outer cycle minus its holes.
pub fn area_of_face(d: &Dcel, f: FaceIdx) -> Result<Rat, TriangulationError> {
    bounded_face(d, f)?;
    let face = d.face(f)?;
    let mut area = Rat::zero();
    if let Some(e) = face.outer_component {
        area += d.cycle_area(e);
    }
    for &e in &face.inner_components {
        area += d.cycle_area(e);
    }
    Ok(area)
}

pub fn is_face_triangle(d: &Dcel, f: FaceIdx) -> bool {
    if f == OUTER_FACE || f as usize >= d.num_faces() {
        return false;
    }
    let face = &d.faces()[f as usize];
    match face.outer_component {
        Some(e) if face.inner_components.is_empty() => d.next(d.next(d.next(e))) == e,
        _ => false,
    }
}

/// A face without holes whose boundary has no split or merge vertex.
pub fn is_face_ymonotone(d: &Dcel, f: FaceIdx) -> Result<bool, TriangulationError> {
    bounded_face(d, f)?;
    if !d.face(f)?.inner_components.is_empty() {
        return Ok(false);
    }
    Ok(d.face_edges(f)?.into_iter().all(|e| {
        !matches!(
            vertex_status(d, e),
            VertexStatus::Split | VertexStatus::Merge
        )
    }))
}

fn reject_degenerate(d: &Dcel, f: FaceIdx, corners: &[EdgeIdx]) -> Result<(), TriangulationError> {
    let degenerate = |reason| TriangulationError::DegenerateFace { face: f, reason };
    let mut seen = HashSet::new();
    for &e in corners {
        if !seen.insert(d.origin(e)) {
            return Err(degenerate("boundary visits a vertex twice"));
        }
        let u = d.location(d.origin(d.prev(e)));
        if orient(u, d.location(d.origin(e)), d.location(d.dest(e))) == Ordering::Equal {
            return Err(degenerate("three consecutive boundary vertices are collinear"));
        }
    }
    if !area_of_face(d, f)?.is_positive() {
        return Err(degenerate("zero area"));
    }
    Ok(())
}

fn checked_corners(d: &Dcel, f: FaceIdx) -> Result<Vec<EdgeIdx>, TriangulationError> {
    bounded_face(d, f)?;
    let corners = d.face_edges(f)?;
    reject_degenerate(d, f, &corners)?;
    Ok(corners)
}

// ─────────────────────────── Monotone decomposition ───────────────────────────

fn left_neighbour(status: &SweepStatus<'_>, d: &Dcel, v: VertIdx) -> Result<EdgeIdx, TriangulationError> {
    let p = d.location(v);
    status
        .left_of(p)
        .ok_or_else(|| TriangulationError::MissingLeftEdge(p.clone()))
}

/// Diagonals from the helper sweep over the corners of one face.
fn sweep_diagonals(d: &Dcel, mut corners: Vec<EdgeIdx>) -> Result<Vec<Diagonal>, TriangulationError> {
    corners.sort_by(|&a, &b| sweep_cmp(d.location(d.origin(a)), d.location(d.origin(b))));
    let mut status = SweepStatus::new(d);
    let mut out = Vec::new();

    for e in corners {
        let v = d.origin(e);
        let kind = vertex_status(d, e);
        tracing::trace!(vertex = v, at = %d.location(v), ?kind, "sweep event");
        let here = Helper {
            vertex: v,
            is_merge: kind == VertexStatus::Merge,
        };

        // The edge arriving at a vertex from above leaves the status there;
        // a merge helper still waiting on it gets its diagonal now.
        let close = |status: &mut SweepStatus<'_>, out: &mut Vec<Diagonal>| {
            if let Some(active) = status.remove(d.prev(e)) {
                if active.helper.is_merge {
                    out.push((v, active.helper.vertex));
                }
            }
        };
        let fix_up = |status: &SweepStatus<'_>, left: EdgeIdx, out: &mut Vec<Diagonal>| {
            if let Some(h) = status.helper(left) {
                if h.is_merge {
                    out.push((v, h.vertex));
                }
            }
        };

        match kind {
            VertexStatus::Start => status.insert(e, here),
            VertexStatus::End => close(&mut status, &mut out),
            VertexStatus::Split => {
                let left = left_neighbour(&status, d, v)?;
                if let Some(h) = status.helper(left) {
                    out.push((v, h.vertex));
                }
                status.set_helper(left, here);
                status.insert(e, here);
            }
            VertexStatus::Merge => {
                close(&mut status, &mut out);
                let left = left_neighbour(&status, d, v)?;
                fix_up(&status, left, &mut out);
                status.set_helper(left, here);
            }
            VertexStatus::RegularLeft => {
                close(&mut status, &mut out);
                status.insert(e, here);
            }
            VertexStatus::RegularRight => {
                let left = left_neighbour(&status, d, v)?;
                fix_up(&status, left, &mut out);
                status.set_helper(left, here);
            }
        }
    }
    Ok(out)
}

/// Diagonals cutting face `f` into y-monotone pieces.
pub fn edges_to_ymonotonize(d: &Dcel, f: FaceIdx) -> Result<Vec<RatSegment>, TriangulationError> {
    let corners = checked_corners(d, f)?;
    let out = sweep_diagonals(d, corners)?;
    tracing::debug!(face = f, diagonals = out.len(), "monotone decomposition");
    Ok(segments(d, &out))
}

/// Every bounded face cut into y-monotone pieces.
pub fn make_faces_ymonotone(d: &Dcel) -> Result<Dcel, TriangulationError> {
    let mut all = Vec::new();
    for f in 1..d.num_faces() as FaceIdx {
        all.extend(edges_to_ymonotonize(d, f)?);
    }
    Ok(d.merge_segments(&all))
}

// ─────────────────────────── Monotone triangulation ───────────────────────────

/// Stack walk over a y-monotone boundary, vertices counter-clockwise.
fn monotone_diagonals(d: &Dcel, ring: &[VertIdx]) -> Vec<Diagonal> {
    let n = ring.len();
    if n <= 3 {
        return Vec::new();
    }
    let at = |i: usize| d.location(ring[i]);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| sweep_cmp(at(a), at(b)));
    let (top, bottom) = (order[0], order[n - 1]);

    // Walking forward from the top descends the left chain.
    let mut on_left = vec![false; n];
    let mut i = top;
    while i != bottom {
        on_left[i] = true;
        i = (i + 1) % n;
    }

    let mut out = Vec::new();
    let mut stack = vec![order[0], order[1]];
    for j in 2..n - 1 {
        let u = order[j];
        let same_chain = stack.last().map_or(false, |&s| on_left[s] == on_left[u]);
        if same_chain {
            let mut last = stack.pop();
            while let (Some(x), Some(&s)) = (last, stack.last()) {
                let turn = orient(at(u), at(s), at(x));
                let inside = if on_left[u] {
                    turn == Ordering::Greater
                } else {
                    turn == Ordering::Less
                };
                if !inside {
                    break;
                }
                out.push((ring[u], ring[s]));
                last = stack.pop();
            }
            if let Some(x) = last {
                stack.push(x);
            }
        } else {
            // The bottom of the stack is joined to u by a boundary edge.
            for &s in stack.iter().skip(1) {
                out.push((ring[u], ring[s]));
            }
            stack.clear();
            stack.push(order[j - 1]);
        }
        stack.push(u);
    }

    let u = order[n - 1];
    if stack.len() > 2 {
        for &s in &stack[1..stack.len() - 1] {
            out.push((ring[u], ring[s]));
        }
    }
    out
}

/// Boundary rings of the pieces that `diagonals` cut face `f` into. Only
/// the face's own corners and the diagonals are looked at: around each
/// vertex the walk turns onto the next segment clockwise, which keeps the
/// piece on its left.
fn pieces(d: &Dcel, corners: &[EdgeIdx], diagonals: &[Diagonal]) -> Vec<Vec<VertIdx>> {
    let mut darts: Vec<Diagonal> = corners.iter().map(|&e| (d.origin(e), d.dest(e))).collect();
    for &(a, b) in diagonals {
        darts.push((a, b));
        darts.push((b, a));
    }

    let mut around: HashMap<VertIdx, Vec<VertIdx>> = HashMap::new();
    for &(a, b) in &darts {
        around.entry(a).or_default().push(b);
        around.entry(b).or_default().push(a);
    }
    let mut slot: HashMap<Diagonal, usize> = HashMap::new();
    for (&v, ring) in around.iter_mut() {
        let center = d.location(v);
        ring.sort_by(|&a, &b| CrossProductOrder.compare(center, d.location(a), d.location(b)));
        ring.dedup();
        for (k, &w) in ring.iter().enumerate() {
            slot.insert((v, w), k);
        }
    }

    let mut seen: HashSet<Diagonal> = HashSet::new();
    let mut out = Vec::new();
    for &start in &darts {
        if seen.contains(&start) {
            continue;
        }
        let mut ring = Vec::new();
        let (mut u, mut v) = start;
        while seen.insert((u, v)) {
            ring.push(u);
            let (Some(nbrs), Some(&k)) = (around.get(&v), slot.get(&(v, u))) else {
                break;
            };
            let w = nbrs[(k + nbrs.len() - 1) % nbrs.len()];
            u = v;
            v = w;
        }
        out.push(ring);
    }
    out
}

/// Diagonals triangulating the y-monotone face `f`.
pub fn edges_to_tri_ymonotone(d: &Dcel, f: FaceIdx) -> Result<Vec<RatSegment>, TriangulationError> {
    if !is_face_ymonotone(d, f)? {
        return Err(TriangulationError::NotMonotone(f));
    }
    let out = monotone_diagonals(d, &ring_of(d, &d.face_edges(f)?));
    Ok(segments(d, &out))
}

// ─────────────────────────── Whole faces ───────────────────────────

/// Diagonals that, merged into `d`, split face `f` into triangles.
pub fn edges_to_triangulate(d: &Dcel, f: FaceIdx) -> Result<Vec<RatSegment>, TriangulationError> {
    let corners = checked_corners(d, f)?;
    if is_face_triangle(d, f) {
        return Ok(Vec::new());
    }
    if is_face_ymonotone(d, f)? {
        let out = monotone_diagonals(d, &ring_of(d, &corners));
        return Ok(segments(d, &out));
    }

    let mut out = sweep_diagonals(d, corners.clone())?;
    for ring in pieces(d, &corners, &out) {
        out.extend(monotone_diagonals(d, &ring));
    }
    tracing::debug!(face = f, diagonals = out.len(), "triangulated face");
    Ok(segments(d, &out))
}

/// The subdivision with every bounded face split into triangles.
pub fn triangulate(d: &Dcel) -> Result<Dcel, TriangulationError> {
    let mut all = Vec::new();
    for f in 1..d.num_faces() as FaceIdx {
        all.extend(edges_to_triangulate(d, f)?);
    }
    let out = d.merge_segments(&all);
    tracing::debug!(
        faces = d.num_faces() - 1,
        triangles = out.num_faces() - 1,
        "triangulated subdivision"
    );
    Ok(out)
}
