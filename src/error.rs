// Copyright 2025 The planar-dcel Authors
// License: MIT
//
// Error types for subdivision construction, serialization and triangulation.
// Absent keys, locators and vertices are not errors; those lookups return
// Option or bool.

use thiserror::Error;

use crate::dcel::FaceIdx;
use crate::geom::RatPoint;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DcelError {
    #[error("closed path needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("closed path is not simple: edges {0} and {1} intersect")]
    SelfIntersectingPath(usize, usize),

    #[error("transform matrix is singular")]
    SingularTransform,

    #[error("transform sends vertex {0} to infinity")]
    PointAtInfinity(usize),

    #[error("transform maps vertices to both sides of the line at infinity")]
    SplitByLineAtInfinity,

    #[error("face {0} does not exist")]
    NoSuchFace(FaceIdx),

    #[error("face 0 is unbounded and cannot be exported")]
    UnboundedFace,

    #[error("malformed xml: {0}")]
    Xml(String),

    #[error("xml {element} index {found} out of sequence, expected {expected}")]
    IndexOutOfSequence {
        element: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("xml rational has zero denominator")]
    ZeroDenominator,

    #[error("inconsistent tables: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriangulationError {
    #[error("face 0 is unbounded and cannot be triangulated")]
    UnboundedFace,

    #[error("face {face} is degenerate: {reason}")]
    DegenerateFace { face: FaceIdx, reason: &'static str },

    #[error("face {0} is not y-monotone")]
    NotMonotone(FaceIdx),

    #[error("no active edge to the left of {0}")]
    MissingLeftEdge(RatPoint),

    #[error(transparent)]
    Dcel(#[from] DcelError),
}

/// First red-black or aggregate invariant found broken by
/// `RedBlackTree::validate`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("root is red")]
    RedRoot,

    #[error("red node has a red child")]
    RedRedEdge,

    #[error("black heights differ between sibling subtrees")]
    BlackHeightMismatch,

    #[error("in-order keys are not sorted")]
    OrderViolation,

    #[error("stored subtree aggregate is stale")]
    StaleAggregate,

    #[error("child and parent links disagree")]
    BrokenParentLink,

    #[error("reachable node count differs from len")]
    CountMismatch,
}
