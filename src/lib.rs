// planar-dcel: exact planar subdivisions and an augmented red-black tree
// Copyright 2025 The planar-dcel Authors
// License: MIT

pub mod dcel;
pub mod error;
pub mod geom;
pub mod rbtree;
pub mod sweep;
pub mod triangulate;

pub use dcel::{Dcel, EdgeIdx, EdgeRecord, FaceIdx, FaceRecord, SvgOptions, VertIdx, VertexRecord, OUTER_FACE};
pub use error::{DcelError, InvariantViolation, TriangulationError};
pub use geom::{CrossProductOrder, AngleOrder, Rat, RatPoint, RatSegment};
pub use rbtree::{Aggregate, KeySum, Locator, NoAggregate, RedBlackTree};
pub use triangulate::{
    area_of_face, edges_to_tri_ymonotone, edges_to_triangulate, edges_to_ymonotonize,
    is_face_triangle, is_face_ymonotone, make_faces_ymonotone, triangulate, vertex_status,
    VertexStatus,
};
