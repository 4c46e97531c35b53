//! # Whittle
//!
//! Progressive mesh simplification by edge collapse, built around a
//! family of interchangeable error metrics over a half-edge mesh.
//!
//! For every candidate edge, a metric answers two questions: what does
//! collapsing this edge cost, and where should the merged vertex go? The
//! answers come from accumulating a per-face geometric primitive over the
//! edge's local neighborhood and minimizing (or safely falling back from)
//! the resulting error form.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe
//!   handles and an explicit invalid sentinel
//! - **Quadric error metric**: closed-form optimal positions with a
//!   conservative fallback ladder for singular systems, guarded by
//!   planarity detection
//! - **Point-set-surface metrics**: weighted algebraic-sphere fits over
//!   face one-rings, in both a lifted-quadric and a direct-projection
//!   flavor
//! - **Greedy driver**: priority-queue edge collapse with manifold
//!   link-condition checks
//!
//! ## Quick Start
//!
//! ```
//! use whittle::prelude::*;
//! use nalgebra::Point3;
//!
//! // Build a small mesh.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! // Score an edge collapse.
//! let mut metric = QuadricMetric::default();
//! let collapse = metric.edge_error(&mesh, HalfEdgeHandle::new(0)).unwrap();
//! println!("cost {} at {:?}", collapse.cost, collapse.position);
//! ```
//!
//! ## Choosing a metric
//!
//! [`QuadricMetric`](metric::QuadricMetric) is the robust default: purely
//! algebraic, no parameters that matter. The fit-based metrics
//! ([`ApssMetric`](metric::ApssMetric),
//! [`SimpleApssMetric`](metric::SimpleApssMetric)) track curved surfaces
//! more faithfully but require every evaluated face to have a well-posed
//! one-ring within the weighting `scale`, and fail (as [`Err`]) where it
//! does not.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod mesh;
pub mod metric;

/// Prelude module for convenient imports.
///
/// ```
/// use whittle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Result, SimplifyError};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, FaceHandle, HalfEdgeHandle, HalfEdgeMesh,
        VertexHandle,
    };
    pub use crate::metric::{
        ApssMetric, EdgeCollapse, ErrorMetric, QuadricMetric, SimpleApssMetric,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
