//! Simplified algebraic-sphere error metric.

use super::{fit_face, EdgeCollapse, ErrorMetric};
use crate::error::{Result, SimplifyError};
use crate::fit::AlgebraicSphere;
use crate::mesh::{FaceHandle, HalfEdgeHandle, HalfEdgeMesh};

/// Error metric that keeps the fitted sphere itself as the primitive.
///
/// Where [`ApssMetric`](super::ApssMetric) projects each fit into a
/// lifted quadric, this metric carries the [`AlgebraicSphere`] around
/// unchanged: combination re-centers coefficients across basis centers,
/// and edge evaluation projects the midpoint onto the fitted surface.
#[derive(Debug, Clone)]
pub struct SimpleApssMetric {
    /// Support radius of the fit's distance weighting.
    pub scale: f64,
    fits: Vec<AlgebraicSphere>,
}

impl SimpleApssMetric {
    /// Create a simplified APSS metric with the given weighting scale.
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

impl Default for SimpleApssMetric {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ErrorMetric for SimpleApssMetric {
    type Primitive = AlgebraicSphere;

    fn generate_face_primitive(
        &mut self,
        mesh: &HalfEdgeMesh,
        face: FaceHandle,
    ) -> Result<AlgebraicSphere> {
        let sphere = fit_face(mesh, face, self.scale);
        if !sphere.is_defined() {
            return Err(SimplifyError::UndefinedFit { face });
        }
        self.fits.push(sphere.clone());
        Ok(sphere)
    }

    /// Combine two fits computed around different basis centers.
    ///
    /// The coefficients of `a` are re-expressed in `b`'s basis,
    /// renormalized, then re-expressed back in `a`'s original basis and
    /// renormalized again. Each fit's coefficients are only numerically
    /// meaningful relative to its own center, so the round trip through
    /// `b`'s frame is what keeps the combination stable.
    fn combine(&self, a: &AlgebraicSphere, b: &AlgebraicSphere) -> AlgebraicSphere {
        let mut combined = a.clone();
        combined.change_basis(b.basis_center());
        combined.apply_pratt_norm();
        combined.change_basis(a.basis_center());
        combined.apply_pratt_norm();
        combined
    }

    fn compute_error(
        &self,
        mesh: &HalfEdgeMesh,
        primitive: &AlgebraicSphere,
        halfedge: HalfEdgeHandle,
    ) -> Result<EdgeCollapse> {
        let p12 = mesh.edge_midpoint(halfedge);

        // The collapse position is the midpoint's nearest point on the
        // fitted surface; the cost is how far off the surface the
        // midpoint already sits.
        Ok(EdgeCollapse {
            cost: primitive.potential(&p12).abs(),
            position: primitive.project(&p12),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::SphereState;
    use crate::mesh::{build_from_triangles, VertexHandle};
    use nalgebra::{Point3, Vector3};

    fn octahedron() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let faces = vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_generate_keeps_sphere_as_primitive() {
        let mesh = octahedron();
        let mut metric = SimpleApssMetric::new(10.0);

        let sphere = metric
            .generate_face_primitive(&mesh, FaceHandle::new(0))
            .unwrap();
        assert!(sphere.is_defined());
        assert_eq!(metric.fits().len(), 1);

        // The basis center is the face centroid.
        let centroid = mesh.face_centroid(FaceHandle::new(0));
        assert!((sphere.basis_center() - centroid).norm() < 1e-12);
    }

    #[test]
    fn test_fit_fails_without_neighbors() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();

        let mut metric = SimpleApssMetric::new(10.0);
        let result = metric.generate_face_primitive(&mesh, FaceHandle::new(0));
        assert!(matches!(result, Err(SimplifyError::UndefinedFit { .. })));
    }

    #[test]
    fn test_combine_center_roundtrip() {
        let mesh = octahedron();
        let mut metric = SimpleApssMetric::new(10.0);

        let a = metric
            .generate_face_primitive(&mesh, FaceHandle::new(0))
            .unwrap();
        let b = metric
            .generate_face_primitive(&mesh, FaceHandle::new(1))
            .unwrap();
        assert_ne!(a.basis_center(), b.basis_center());

        // The double change-of-basis must land exactly back on a's center.
        let combined = metric.combine(&a, &b);
        assert_eq!(combined.basis_center(), a.basis_center());
    }

    #[test]
    fn test_combine_preserves_surface() {
        let mesh = octahedron();
        let mut metric = SimpleApssMetric::new(10.0);

        let a = metric
            .generate_face_primitive(&mesh, FaceHandle::new(0))
            .unwrap();
        let b = metric
            .generate_face_primitive(&mesh, FaceHandle::new(1))
            .unwrap();
        let combined = metric.combine(&a, &b);

        // Re-centering and renormalizing rescales the potential but must
        // not move the zero set: points where a vanished still vanish.
        let probe = a.project(&mesh.face_centroid(FaceHandle::new(0)));
        assert!(combined.potential(&probe).abs() < 1e-8);
    }

    #[test]
    fn test_compute_error_projects_onto_surface() {
        // Hand-built unit sphere as the primitive.
        let sphere = AlgebraicSphere::new(Point3::origin(), -1.0, Vector3::zeros(), 1.0);
        assert_eq!(sphere.state(), SphereState::Sphere);

        let vertices = vec![
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        let he = mesh.find_halfedge(VertexHandle::new(0), VertexHandle::new(1));

        let metric = SimpleApssMetric::default();
        let collapse = metric.compute_error(&mesh, &sphere, he).unwrap();

        // Midpoint (1, 1, 0): potential ‖p‖² − 1 = 1, projection on the
        // unit sphere along the radial direction.
        assert!((collapse.cost - 1.0).abs() < 1e-12);
        assert!((collapse.position.coords.norm() - 1.0).abs() < 1e-12);
        let radial = Point3::new(1.0, 1.0, 0.0).coords.normalize();
        assert!((collapse.position.coords - radial).norm() < 1e-12);
    }
}
