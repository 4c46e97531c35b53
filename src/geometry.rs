//! Low-level triangle geometry helpers.
//!
//! The normal returned by [`triangle_normal`] is deliberately NOT
//! normalized: its magnitude equals twice the triangle area. Error-metric
//! construction relies on this, using the raw cross product both as the
//! face normal and as an implicit area weight when planes are accumulated
//! into quadrics.

use nalgebra::{Point3, Vector3};

/// Compute the (non-unit) normal of a triangle.
///
/// Returns `(p1 - p0) × (p2 - p0)`, whose magnitude is twice the triangle
/// area. Degenerate triangles yield the zero vector.
#[inline]
pub fn triangle_normal(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
    let e1 = p1 - p0;
    let e2 = p2 - p0;
    e1.cross(&e2)
}

/// Compute the centroid of a triangle.
#[inline]
pub fn triangle_centroid(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Point3<f64> {
    Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
}
