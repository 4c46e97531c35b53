//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation the error
//! metrics traverse, along with type-safe element handles and a
//! face-vertex builder.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], a half-edge (doubly-connected
//! edge list) representation of a triangle mesh with O(1) adjacency
//! queries. Elements are addressed by opaque handles ([`VertexHandle`],
//! [`HalfEdgeHandle`], [`FaceHandle`]) that carry an invalid sentinel
//! value, so "no element" is representable without `Option`.
//!
//! # Construction
//!
//! ```
//! use whittle::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//! ```

mod builder;
mod halfedge;
mod handle;

pub use builder::{build_from_triangles, to_face_vertex};
pub use halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
pub use handle::{FaceHandle, HalfEdgeHandle, VertexHandle};
