//! Edge-collapse error metrics.
//!
//! An error metric assigns every candidate edge collapse a scalar cost
//! and the position the merged vertex should take. Three interchangeable
//! strategies are provided:
//!
//! - [`QuadricMetric`]: the classic plane-quadric error (Garland &
//!   Heckbert style), with a closed-form minimizer and a conservative
//!   fallback ladder for singular systems.
//! - [`ApssMetric`]: an algebraic point-set-surface fit per face,
//!   projected into a quadric over the lifted coordinate `(x, y, z, ‖x‖²)`.
//! - [`SimpleApssMetric`]: the sphere fit used directly as the primitive,
//!   with basis re-centering on combination and nearest-point projection
//!   for the collapse position.
//!
//! All three share the same capability set — build a primitive per face,
//! combine primitives over a neighborhood, evaluate an edge — expressed
//! by the [`ErrorMetric`] trait with a metric-specific primitive type.
//!
//! # Example
//!
//! ```
//! use whittle::mesh::{build_from_triangles, HalfEdgeHandle};
//! use whittle::metric::{ErrorMetric, QuadricMetric};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! let mut metric = QuadricMetric::default();
//! let collapse = metric.edge_error(&mesh, HalfEdgeHandle::new(0)).unwrap();
//! assert!(collapse.cost.is_finite());
//! ```

mod apss;
mod planarity;
mod quadric;
mod simple_apss;

pub use apss::{ApssMetric, ApssQuadric};
pub use planarity::{is_planar_edge, is_planar_edge2};
pub use quadric::{Quadric, QuadricMetric};
pub use simple_apss::SimpleApssMetric;

use nalgebra::Point3;

use crate::error::{Result, SimplifyError};
use crate::fit::{AlgebraicSphere, DistWeightFunc, OrientedSphereFit};
use crate::mesh::{FaceHandle, HalfEdgeHandle, HalfEdgeMesh};

/// The outcome of evaluating an edge collapse: its scalar cost and the
/// position the merged vertex should take.
#[derive(Debug, Clone, Copy)]
pub struct EdgeCollapse {
    /// Scalar error cost of collapsing the edge.
    pub cost: f64,
    /// Optimal (or fallback) position for the merged vertex.
    pub position: Point3<f64>,
}

/// A family of interchangeable edge-collapse error metrics.
///
/// Implementations carry their own primitive representation and any
/// per-instance parameters (weighting scale, diagnostic fit log). The
/// mesh is read-only throughout; the only side effect permitted is
/// appending to the instance's own fit log during
/// [`generate_face_primitive`](ErrorMetric::generate_face_primitive).
pub trait ErrorMetric {
    /// The accumulated local approximation this metric works with.
    type Primitive: Clone;

    /// Build the primitive contributed by a single face.
    fn generate_face_primitive(
        &mut self,
        mesh: &HalfEdgeMesh,
        face: FaceHandle,
    ) -> Result<Self::Primitive>;

    /// Merge two primitives into one local approximation.
    fn combine(&self, a: &Self::Primitive, b: &Self::Primitive) -> Self::Primitive;

    /// Evaluate a combined primitive on an edge, producing the collapse
    /// cost and resulting vertex position.
    fn compute_error(
        &self,
        mesh: &HalfEdgeMesh,
        primitive: &Self::Primitive,
        halfedge: HalfEdgeHandle,
    ) -> Result<EdgeCollapse>;

    /// Evaluate an edge from scratch: primitives for every face around
    /// either endpoint, combined, then scored on the edge.
    ///
    /// Faces shared by both endpoint stars contribute once; the source
    /// star is visited first, so the traversal order is stable.
    fn edge_error(&mut self, mesh: &HalfEdgeMesh, halfedge: HalfEdgeHandle) -> Result<EdgeCollapse> {
        let vs = mesh.from_vertex(halfedge);
        let vt = mesh.to_vertex(halfedge);

        let mut faces = mesh.faces_around_vertex(vs);
        for f in mesh.faces_around_vertex(vt) {
            if !faces.contains(&f) {
                faces.push(f);
            }
        }

        let (first, rest) = faces.split_first().ok_or(SimplifyError::IsolatedEdge)?;
        let mut combined = self.generate_face_primitive(mesh, *first)?;
        for &f in rest {
            let q = self.generate_face_primitive(mesh, f)?;
            combined = self.combine(&combined, &q);
        }

        self.compute_error(mesh, &combined, halfedge)
    }
}

/// Fit an algebraic sphere to a face neighborhood: the face's centroid is
/// the fit center, the centroids and (area-weighted) normals of its
/// one-ring are the samples.
pub(crate) fn fit_face(mesh: &HalfEdgeMesh, face: FaceHandle, scale: f64) -> AlgebraicSphere {
    let center = mesh.face_centroid(face);
    let mut fit = OrientedSphereFit::new(center, DistWeightFunc::new(scale));

    for neighbor in mesh.faces_around_face(face) {
        fit.add_neighbor(
            &mesh.face_centroid(neighbor),
            &mesh.face_normal(neighbor),
        );
    }

    fit.finalize()
}
