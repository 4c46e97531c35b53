//! Fitted algebraic spheres.

use nalgebra::{Point3, Vector3};

/// Relative threshold below which the quadratic coefficient is treated as
/// zero and the surface degenerates to a plane.
const PLANE_EPS: f64 = 1e-9;

/// Validity state of a fitted algebraic sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SphereState {
    /// The fit produced no surface (no weighted samples, or a non-finite
    /// solution). An undefined sphere must not be evaluated.
    Undefined,
    /// The quadratic coefficient vanished: the surface is a plane.
    Plane,
    /// A genuine sphere.
    Sphere,
}

/// An algebraic sphere `s(x) = uc + ul · (x − basis) + uq ‖x − basis‖²`.
///
/// The coefficients are only numerically meaningful relative to the basis
/// center the fit was computed around. [`change_basis`] re-expresses them
/// around a different center, and [`apply_pratt_norm`] rescales them so
/// the gradient has unit norm on the surface; both are required before
/// combining fits computed around different centers.
///
/// [`change_basis`]: AlgebraicSphere::change_basis
/// [`apply_pratt_norm`]: AlgebraicSphere::apply_pratt_norm
#[derive(Debug, Clone)]
pub struct AlgebraicSphere {
    basis: Point3<f64>,
    uc: f64,
    ul: Vector3<f64>,
    uq: f64,
    state: SphereState,
}

impl AlgebraicSphere {
    /// Create an undefined sphere anchored at `basis`.
    pub fn undefined(basis: Point3<f64>) -> Self {
        Self {
            basis,
            uc: 0.0,
            ul: Vector3::zeros(),
            uq: 0.0,
            state: SphereState::Undefined,
        }
    }

    /// Create a sphere from raw coefficients, classifying its state.
    pub fn new(basis: Point3<f64>, uc: f64, ul: Vector3<f64>, uq: f64) -> Self {
        let state = classify(uc, &ul, uq);
        Self {
            basis,
            uc,
            ul,
            uq,
            state,
        }
    }

    /// The basis center the coefficients are expressed around.
    #[inline]
    pub fn basis_center(&self) -> Point3<f64> {
        self.basis
    }

    /// The uniform coefficient.
    #[inline]
    pub fn uc(&self) -> f64 {
        self.uc
    }

    /// The linear coefficient.
    #[inline]
    pub fn ul(&self) -> Vector3<f64> {
        self.ul
    }

    /// The quadratic coefficient.
    #[inline]
    pub fn uq(&self) -> f64 {
        self.uq
    }

    /// The validity state.
    #[inline]
    pub fn state(&self) -> SphereState {
        self.state
    }

    /// Whether the fit produced a usable surface.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.state != SphereState::Undefined
    }

    /// The squared Pratt norm `‖ul‖² − 4·uc·uq`.
    ///
    /// Equals the squared gradient magnitude on the surface; `1` for a
    /// Pratt-normalized sphere.
    #[inline]
    pub fn pratt_norm2(&self) -> f64 {
        self.ul.norm_squared() - 4.0 * self.uc * self.uq
    }

    /// Rescale the coefficients so the gradient has unit norm on the
    /// surface (Pratt normalization).
    ///
    /// Returns `false` (leaving the sphere untouched) when the squared
    /// Pratt norm is not positive, which only happens for degenerate
    /// coefficient sets.
    pub fn apply_pratt_norm(&mut self) -> bool {
        let n2 = self.pratt_norm2();
        if n2 <= f64::EPSILON {
            return false;
        }
        let inv = 1.0 / n2.sqrt();
        self.uc *= inv;
        self.ul *= inv;
        self.uq *= inv;
        true
    }

    /// Re-express the coefficients around a new basis center.
    ///
    /// The represented surface is unchanged; only the coordinate frame of
    /// the coefficients moves.
    pub fn change_basis(&mut self, new_basis: Point3<f64>) {
        let d = new_basis - self.basis;
        self.uc += self.ul.dot(&d) + self.uq * d.norm_squared();
        self.ul += 2.0 * self.uq * d;
        self.basis = new_basis;
    }

    /// Evaluate the scalar potential (implicit-function value) at `p`.
    ///
    /// Zero on the surface; for a Pratt-normalized sphere the magnitude
    /// approximates the distance to the surface near it.
    pub fn potential(&self, p: &Point3<f64>) -> f64 {
        let x = p - self.basis;
        self.uc + self.ul.dot(&x) + self.uq * x.norm_squared()
    }

    /// Project `p` onto the surface (nearest-point projection).
    ///
    /// Undefined spheres return `p` unchanged.
    pub fn project(&self, p: &Point3<f64>) -> Point3<f64> {
        let x = p - self.basis;
        match self.state {
            SphereState::Undefined => *p,
            SphereState::Plane => {
                let n2 = self.ul.norm_squared();
                if n2 <= f64::EPSILON {
                    return *p;
                }
                let s = self.uc + self.ul.dot(&x);
                self.basis + (x - self.ul * (s / n2))
            }
            SphereState::Sphere => {
                let center = -self.ul / (2.0 * self.uq);
                let r2 = center.norm_squared() - self.uc / self.uq;
                let radius = r2.max(0.0).sqrt();
                let dir = x - center;
                let len = dir.norm();
                if len <= f64::EPSILON {
                    // Query sits at the sphere center; any radial direction
                    // is a nearest point.
                    return self.basis + center + Vector3::x() * radius;
                }
                self.basis + center + dir * (radius / len)
            }
        }
    }
}

fn classify(uc: f64, ul: &Vector3<f64>, uq: f64) -> SphereState {
    if !uc.is_finite() || !uq.is_finite() || !ul.iter().all(|c| c.is_finite()) {
        return SphereState::Undefined;
    }
    let ln = ul.norm();
    if ln <= f64::EPSILON && uq.abs() <= f64::EPSILON {
        return SphereState::Undefined;
    }
    if uq.abs() <= PLANE_EPS * ln.max(1.0) {
        SphereState::Plane
    } else {
        SphereState::Sphere
    }
}
