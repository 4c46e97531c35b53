//! Algebraic point-set-surface error metric.

use std::ops::{Add, AddAssign};

use nalgebra::{Matrix4, Point3, Vector4};

use super::{fit_face, EdgeCollapse, ErrorMetric};
use crate::error::{Result, SimplifyError};
use crate::fit::AlgebraicSphere;
use crate::mesh::{FaceHandle, HalfEdgeHandle, HalfEdgeMesh};

/// A quadric error form over the lifted coordinate `(x, y, z, ‖x‖²)`.
///
/// Same algebraic shape as the 3×3 plane quadric, one dimension up: built
/// from a 4-component plane vector `n` and offset `d` as
/// `A = nnᵀ, b = d·n, c = d²`, and accumulated by addition. The lift lets
/// one linear form express both planes and spheres.
#[derive(Debug, Clone, Copy)]
pub struct ApssQuadric {
    a: Matrix4<f64>,
    b: Vector4<f64>,
    c: f64,
}

impl ApssQuadric {
    /// Create a zero quadric.
    pub fn zero() -> Self {
        Self {
            a: Matrix4::zeros(),
            b: Vector4::zeros(),
            c: 0.0,
        }
    }

    /// Create a quadric from a 4-component plane vector and offset.
    pub fn from_plane(n: &Vector4<f64>, d: f64) -> Self {
        Self {
            a: n * n.transpose(),
            b: d * n,
            c: d * d,
        }
    }

    /// Lift a 3D point into the 4-component evaluation space.
    pub fn lift(p: &Point3<f64>) -> Vector4<f64> {
        Vector4::new(p.x, p.y, p.z, p.coords.norm_squared())
    }

    /// Evaluate the quadric form on a lifted vector.
    pub fn evaluate(&self, v: &Vector4<f64>) -> f64 {
        v.dot(&(self.a * v)) + 2.0 * self.b.dot(v) + self.c
    }
}

impl AddAssign for ApssQuadric {
    fn add_assign(&mut self, other: Self) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
    }
}

impl Add for ApssQuadric {
    type Output = ApssQuadric;

    fn add(mut self, other: ApssQuadric) -> ApssQuadric {
        self += other;
        self
    }
}

/// Error metric backed by an algebraic point-set-surface fit per face.
///
/// Each face's primitive comes from fitting an algebraic sphere to its
/// one-ring (centroids and area-weighted normals, weighted by distance
/// within `scale`), then normalizing the fit's linear part and projecting
/// it into an [`ApssQuadric`].
///
/// Unlike [`QuadricMetric`](super::QuadricMetric), edge evaluation never
/// attempts a closed-form minimizer or endpoint fallback: the collapse
/// position is always the edge midpoint, and the cost is the form's raw
/// value at the lifted midpoint.
#[derive(Debug, Clone)]
pub struct ApssMetric {
    /// Support radius of the fit's distance weighting.
    pub scale: f64,
    fits: Vec<AlgebraicSphere>,
}

impl ApssMetric {
    /// Create an APSS metric with the given weighting scale.
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            fits: Vec::new(),
        }
    }

    /// The log of successful fits, in generation order.
    pub fn fits(&self) -> &[AlgebraicSphere] {
        &self.fits
    }
}

impl Default for ApssMetric {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ErrorMetric for ApssMetric {
    type Primitive = ApssQuadric;

    fn generate_face_primitive(
        &mut self,
        mesh: &HalfEdgeMesh,
        face: FaceHandle,
    ) -> Result<ApssQuadric> {
        let sphere = fit_face(mesh, face, self.scale);
        if !sphere.is_defined() {
            return Err(SimplifyError::UnstableFit { face });
        }

        let linear_norm = sphere.ul().norm();
        if linear_norm <= f64::EPSILON {
            return Err(SimplifyError::UnstableFit { face });
        }

        // Normalize the linear part and fold the sphere into a lifted
        // plane quadric; the quadratic coefficient is dropped here.
        let uc = sphere.uc() / linear_norm;
        let ul = sphere.ul() / linear_norm;
        let n = Vector4::new(ul.x, ul.y, ul.z, 0.0);
        let primitive = ApssQuadric::from_plane(&n, uc);

        self.fits.push(sphere);
        Ok(primitive)
    }

    fn combine(&self, a: &ApssQuadric, b: &ApssQuadric) -> ApssQuadric {
        *a + *b
    }

    fn compute_error(
        &self,
        mesh: &HalfEdgeMesh,
        primitive: &ApssQuadric,
        halfedge: HalfEdgeHandle,
    ) -> Result<EdgeCollapse> {
        let vs = mesh.point(mesh.from_vertex(halfedge)).coords;
        let vt = mesh.point(mesh.to_vertex(halfedge)).coords;

        // Midpoint-only by contract; the lifted component keeps the
        // unhalved endpoint sum.
        let sum = vs + vt;
        let p12 = Vector4::new(0.5 * sum.x, 0.5 * sum.y, 0.5 * sum.z, sum.norm_squared());

        Ok(EdgeCollapse {
            cost: primitive.evaluate(&p12),
            position: Point3::new(p12.x, p12.y, p12.z),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_triangles, VertexHandle};

    fn tetrahedron() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_lifted_plane_distance_identity() {
        // For a unit 4-plane, the form is the squared lifted-plane distance.
        let n = Vector4::new(0.0, 1.0, 0.0, 0.0);
        let d = 0.5;
        let q = ApssQuadric::from_plane(&n, d);

        for p in [
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(1.0, -0.5, 3.0),
            Point3::new(0.3, 0.0, -0.7),
        ] {
            let lifted = ApssQuadric::lift(&p);
            let expected = (n.dot(&lifted) + d).powi(2);
            assert!((q.evaluate(&lifted) - expected).abs() < 1e-12);

            // Adding the zero quadric changes nothing.
            let padded = q + ApssQuadric::zero();
            assert!((padded.evaluate(&lifted) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_generate_appends_to_fit_log() {
        let mesh = tetrahedron();
        let mut metric = ApssMetric::new(10.0);

        assert!(metric.fits().is_empty());
        metric
            .generate_face_primitive(&mesh, FaceHandle::new(0))
            .unwrap();
        assert_eq!(metric.fits().len(), 1);
        assert!(metric.fits()[0].is_defined());

        metric
            .generate_face_primitive(&mesh, FaceHandle::new(1))
            .unwrap();
        assert_eq!(metric.fits().len(), 2);
    }

    #[test]
    fn test_fit_fails_without_neighbors() {
        // A lone triangle has an empty one-ring: nothing to fit against.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();

        let mut metric = ApssMetric::new(10.0);
        let result = metric.generate_face_primitive(&mesh, FaceHandle::new(0));
        assert!(matches!(result, Err(SimplifyError::UnstableFit { .. })));
        assert!(metric.fits().is_empty());
    }

    #[test]
    fn test_midpoint_chosen_even_with_invertible_system() {
        // Four independent lifted planes make A invertible; the result
        // must still be the plain midpoint of the endpoints.
        let q = ApssQuadric::from_plane(&Vector4::new(1.0, 0.0, 0.0, 0.0), 0.3)
            + ApssQuadric::from_plane(&Vector4::new(0.0, 1.0, 0.0, 0.0), -0.7)
            + ApssQuadric::from_plane(&Vector4::new(0.0, 0.0, 1.0, 0.0), 0.1)
            + ApssQuadric::from_plane(&Vector4::new(0.0, 0.0, 0.0, 1.0), 1.0);
        assert!(q.a.determinant().abs() > 1e-4);

        let mesh = tetrahedron();
        let metric = ApssMetric::new(10.0);
        let he = mesh.find_halfedge(VertexHandle::new(0), VertexHandle::new(1));
        let collapse = metric.compute_error(&mesh, &q, he).unwrap();

        let expected = mesh.edge_midpoint(he);
        assert!((collapse.position - expected).norm() < 1e-12);
    }

    #[test]
    fn test_lifted_component_uses_endpoint_sum() {
        // Isolate the lifted component with a plane vector (0,0,0,1).
        let q = ApssQuadric::from_plane(&Vector4::new(0.0, 0.0, 0.0, 1.0), 0.0);

        let vertices = vec![
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        let he = mesh.find_halfedge(VertexHandle::new(0), VertexHandle::new(1));

        let metric = ApssMetric::default();
        let collapse = metric.compute_error(&mesh, &q, he).unwrap();

        // sum = (2, 2, 0), ‖sum‖² = 8, and the form is w² = 64.
        assert!((collapse.cost - 64.0).abs() < 1e-10);
        assert!((collapse.position - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_edge_error_on_closed_mesh() {
        let mesh = tetrahedron();
        let mut metric = ApssMetric::new(10.0);

        let collapse = metric
            .edge_error(&mesh, HalfEdgeHandle::new(0))
            .unwrap();
        assert!(collapse.cost.is_finite());
        // One fit per face around the edge's endpoints.
        assert!(!metric.fits().is_empty());
    }
}
