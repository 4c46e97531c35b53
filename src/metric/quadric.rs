//! Plane-quadric error metric.

use std::ops::{Add, AddAssign};

use nalgebra::{Matrix3, Point3, Vector3};

use super::planarity::is_planar_edge;
use super::{EdgeCollapse, ErrorMetric};
use crate::error::Result;
use crate::geometry::triangle_normal;
use crate::mesh::{FaceHandle, HalfEdgeHandle, HalfEdgeMesh};

/// Determinant threshold below which the quadric system counts as
/// ill-conditioned and the closed-form minimizer is not trusted. This is
/// an explicit conditioning guard, far coarser than machine epsilon.
const DET_THRESHOLD: f64 = 1e-4;

/// A quadric error form `f(v) = vᵀAv + 2bᵀv + c`.
///
/// Built from a plane `(n, d)` as `A = nnᵀ, b = d·n, c = d²`, so `f`
/// measures the squared (area-weighted, when `n` is a raw cross product)
/// distance to the plane. `A` is positive-semidefinite by construction
/// and quadrics accumulate over a surface patch by plain addition.
#[derive(Debug, Clone, Copy)]
pub struct Quadric {
    a: Matrix3<f64>,
    b: Vector3<f64>,
    c: f64,
}

impl Quadric {
    /// Create a zero quadric.
    pub fn zero() -> Self {
        Self {
            a: Matrix3::zeros(),
            b: Vector3::zeros(),
            c: 0.0,
        }
    }

    /// Create a quadric from a plane with normal `n` and offset `d`
    /// (plane equation `n · v + d = 0`).
    ///
    /// `n` need not be unit length; a raw triangle cross product doubles
    /// as an area weight.
    pub fn from_plane(n: &Vector3<f64>, d: f64) -> Self {
        Self {
            a: n * n.transpose(),
            b: d * n,
            c: d * d,
        }
    }

    /// Evaluate the quadric form at a point.
    pub fn evaluate(&self, p: &Point3<f64>) -> f64 {
        let v = &p.coords;
        v.dot(&(self.a * v)) + 2.0 * self.b.dot(v) + self.c
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, other: Self) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
    }
}

impl Add for Quadric {
    type Output = Quadric;

    fn add(mut self, other: Quadric) -> Quadric {
        self += other;
        self
    }
}

/// Which of the three fallback candidates an ill-conditioned collapse
/// settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FallbackChoice {
    Source,
    Target,
    Midpoint,
}

/// Select among source, target and midpoint given their absolute errors.
///
/// The selection is deliberately asymmetric and is NOT a three-way
/// minimum: starting from the source error as baseline, the target wins
/// only if it beats the baseline while the midpoint is strictly worse
/// than it; otherwise the midpoint wins only if it beats the baseline
/// while the target is strictly worse than it; otherwise the source is
/// kept. Downstream mesh quality depends on this conservative rule, so
/// it must not be "corrected" into an argmin.
fn select_fallback(e1: f64, e2: f64, e12: f64) -> FallbackChoice {
    if e2 < e1 && e12 > e2 {
        FallbackChoice::Target
    } else if e12 < e1 && e2 > e12 {
        FallbackChoice::Midpoint
    } else {
        FallbackChoice::Source
    }
}

/// The classic plane-quadric edge-collapse metric.
///
/// Each face contributes the quadric of its supporting plane; quadrics
/// sum over the neighborhood, and the collapse cost is the quadratic form
/// evaluated at the best position the (possibly singular) system allows.
#[derive(Debug, Clone)]
pub struct QuadricMetric {
    /// Spatial scale parameter shared across the metric family. The
    /// quadric form itself is scale-free.
    pub scale: f64,
}

impl QuadricMetric {
    /// Create a quadric metric with the given scale parameter.
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }
}

impl Default for QuadricMetric {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ErrorMetric for QuadricMetric {
    type Primitive = Quadric;

    fn generate_face_primitive(
        &mut self,
        mesh: &HalfEdgeMesh,
        face: FaceHandle,
    ) -> Result<Quadric> {
        let he = mesh.halfedge_of(face);
        let v0 = mesh.from_vertex(he);
        let v1 = mesh.to_vertex(he);
        let v2 = mesh.to_vertex(mesh.next_halfedge(he));

        let p0 = mesh.point(v0);
        let n = triangle_normal(&p0, &mesh.point(v1), &mesh.point(v2));
        let d = -n.dot(&p0.coords);
        Ok(Quadric::from_plane(&n, d))
    }

    fn combine(&self, a: &Quadric, b: &Quadric) -> Quadric {
        *a + *b
    }

    fn compute_error(
        &self,
        mesh: &HalfEdgeMesh,
        primitive: &Quadric,
        halfedge: HalfEdgeHandle,
    ) -> Result<EdgeCollapse> {
        // Closed-form minimizer: A v = -b, trusted only when A is
        // comfortably invertible.
        if primitive.a.determinant() > DET_THRESHOLD {
            if let Some(inverse) = primitive.a.try_inverse() {
                let position = Point3::from(-(inverse * primitive.b));
                return Ok(EdgeCollapse {
                    cost: primitive.evaluate(&position).abs(),
                    position,
                });
            }
        }

        // Singular system: fall back to positions on the edge itself.
        let p1 = mesh.point(mesh.from_vertex(halfedge));
        let p2 = mesh.point(mesh.to_vertex(halfedge));
        let p12 = Point3::from((p1.coords + p2.coords) / 2.0);
        let e12 = primitive.evaluate(&p12).abs();

        if is_planar_edge(mesh, halfedge) {
            // On a flat patch the midpoint is the unique stable choice.
            return Ok(EdgeCollapse {
                cost: e12,
                position: p12,
            });
        }

        let e1 = primitive.evaluate(&p1).abs();
        let e2 = primitive.evaluate(&p2).abs();
        let (cost, position) = match select_fallback(e1, e2, e12) {
            FallbackChoice::Source => (e1, p1),
            FallbackChoice::Target => (e2, p2),
            FallbackChoice::Midpoint => (e12, p12),
        };
        Ok(EdgeCollapse { cost, position })
    }
}
