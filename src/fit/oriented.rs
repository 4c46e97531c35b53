//! Weighted least-squares fitting of oriented points.

use nalgebra::{Point3, Vector3};

use super::sphere::AlgebraicSphere;
use super::weight::DistWeightFunc;

/// Accumulator for a weighted algebraic-sphere fit over oriented points.
///
/// Samples are added one at a time with [`add_neighbor`]; [`finalize`]
/// solves the normal equations and returns the fitted
/// [`AlgebraicSphere`], expressed around the fit's basis center.
///
/// The solve minimizes, over the sphere coefficients, the weighted
/// mismatch between the sphere's gradient field and the sample normals
/// together with the residual of the samples on the surface. All
/// accumulation happens in coordinates local to the basis center, which
/// keeps the sums small and the system well-scaled.
///
/// [`add_neighbor`]: OrientedSphereFit::add_neighbor
/// [`finalize`]: OrientedSphereFit::finalize
#[derive(Debug, Clone)]
pub struct OrientedSphereFit {
    basis: Point3<f64>,
    weight: DistWeightFunc,
    sum_w: f64,
    sum_p: Vector3<f64>,
    sum_n: Vector3<f64>,
    sum_dot_pn: f64,
    sum_dot_pp: f64,
}

impl OrientedSphereFit {
    /// Create a fresh fit centered at `basis` with the given weight.
    pub fn new(basis: Point3<f64>, weight: DistWeightFunc) -> Self {
        Self {
            basis,
            weight,
            sum_w: 0.0,
            sum_p: Vector3::zeros(),
            sum_n: Vector3::zeros(),
            sum_dot_pn: 0.0,
            sum_dot_pp: 0.0,
        }
    }

    /// The fit's basis center.
    #[inline]
    pub fn basis_center(&self) -> Point3<f64> {
        self.basis
    }

    /// Add an oriented sample.
    ///
    /// The normal need not be unit length; its magnitude acts as an
    /// additional confidence weight on the sample. Returns `false` if the
    /// sample lies outside the weight support and was ignored.
    pub fn add_neighbor(&mut self, position: &Point3<f64>, normal: &Vector3<f64>) -> bool {
        let local = position - self.basis;
        let w = self.weight.weight(&local);
        if w <= 0.0 {
            return false;
        }
        self.sum_w += w;
        self.sum_p += w * local;
        self.sum_n += w * normal;
        self.sum_dot_pn += w * local.dot(normal);
        self.sum_dot_pp += w * local.norm_squared();
        true
    }

    /// Solve the fit.
    ///
    /// Returns an undefined sphere when no weighted sample contributed.
    /// When the weighted samples carry no spread around their barycenter
    /// the quadratic coefficient is unresolvable and the solve falls back
    /// to a plane.
    pub fn finalize(&self) -> AlgebraicSphere {
        if self.sum_w <= 0.0 {
            return AlgebraicSphere::undefined(self.basis);
        }
        let inv = 1.0 / self.sum_w;

        let num = self.sum_dot_pn - inv * self.sum_p.dot(&self.sum_n);
        let den = self.sum_dot_pp - inv * self.sum_p.norm_squared();

        let uq = if den.abs() > 1e-12 * self.sum_dot_pp.abs() && den != 0.0 {
            0.5 * num / den
        } else {
            0.0
        };
        let ul = (self.sum_n - self.sum_p * (2.0 * uq)) * inv;
        let uc = -inv * (ul.dot(&self.sum_p) + uq * self.sum_dot_pp);

        AlgebraicSphere::new(self.basis, uc, ul, uq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::SphereState;

    #[test]
    fn test_no_neighbors_is_undefined() {
        let fit = OrientedSphereFit::new(Point3::origin(), DistWeightFunc::new(1.0));
        let sphere = fit.finalize();
        assert_eq!(sphere.state(), SphereState::Undefined);
    }

    #[test]
    fn test_neighbors_outside_support_are_ignored() {
        let mut fit = OrientedSphereFit::new(Point3::origin(), DistWeightFunc::new(0.5));
        assert!(!fit.add_neighbor(&Point3::new(5.0, 0.0, 0.0), &Vector3::x()));
        assert_eq!(fit.finalize().state(), SphereState::Undefined);
    }

    #[test]
    fn test_recovers_plane() {
        // Samples on z = 2 with upward normals.
        let mut fit = OrientedSphereFit::new(Point3::new(0.0, 0.0, 2.0), DistWeightFunc::new(10.0));
        for (x, y) in [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.5, -1.5)] {
            fit.add_neighbor(&Point3::new(x, y, 2.0), &Vector3::z());
        }
        let sphere = fit.finalize();
        assert_eq!(sphere.state(), SphereState::Plane);

        // Potential is the signed height above the plane.
        assert!(sphere.potential(&Point3::new(0.3, 0.7, 2.0)).abs() < 1e-10);
        assert!((sphere.potential(&Point3::new(0.0, 0.0, 3.5)) - 1.5).abs() < 1e-10);
        assert!(sphere.potential(&Point3::new(0.0, 0.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_recovers_sphere() {
        // Samples on the unit sphere around a slightly offset basis.
        let basis = Point3::new(0.1, 0.0, 0.0);
        let mut fit = OrientedSphereFit::new(basis, DistWeightFunc::new(10.0));
        let dirs = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.577, 0.577, 0.577),
        ];
        for d in dirs {
            let d = d.normalize();
            fit.add_neighbor(&Point3::from(d), &d);
        }
        let sphere = fit.finalize();
        assert_eq!(sphere.state(), SphereState::Sphere);

        // Every sample lies on the recovered surface.
        for d in dirs {
            let d = d.normalize();
            assert!(sphere.potential(&Point3::from(d)).abs() < 1e-10);
        }

        // Projection lands on the unit sphere.
        let proj = sphere.project(&Point3::new(0.0, 0.0, 3.0));
        assert!((proj.coords.norm() - 1.0).abs() < 1e-8);
    }
}
