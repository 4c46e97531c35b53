//! Weighted algebraic-sphere fitting.
//!
//! This module implements the surface fitter behind the point-set-surface
//! error metrics: a moving least-squares fit of the algebraic sphere
//!
//! ```text
//! s(x) = uc + ul · x + uq ‖x‖²
//! ```
//!
//! to a set of oriented points (positions with normals), weighted by
//! distance to a fit center. The algebraic sphere unifies the planar and
//! spherical local models: `uq = 0` degenerates to a plane, anything else
//! is a sphere of center `-ul / (2 uq)`.
//!
//! Fits are computed in coordinates local to their basis center; the
//! resulting [`AlgebraicSphere`] keeps that center and supports
//! re-centering (change of basis) and Pratt normalization so fits
//! computed around different centers can be combined.
//!
//! # Example
//!
//! ```
//! use whittle::fit::{DistWeightFunc, OrientedSphereFit, SphereState};
//! use nalgebra::{Point3, Vector3};
//!
//! // Fit to three points on the plane z = 0 with upward normals.
//! let mut fit = OrientedSphereFit::new(Point3::origin(), DistWeightFunc::new(10.0));
//! for p in [[1.0, 0.0], [0.0, 1.0], [-1.0, -1.0]] {
//!     fit.add_neighbor(&Point3::new(p[0], p[1], 0.0), &Vector3::z());
//! }
//! let sphere = fit.finalize();
//! assert_eq!(sphere.state(), SphereState::Plane);
//! assert!(sphere.potential(&Point3::new(0.0, 0.0, 2.0)) > 1.0);
//! ```

mod oriented;
mod sphere;
mod weight;

pub use oriented::OrientedSphereFit;
pub use sphere::{AlgebraicSphere, SphereState};
pub use weight::DistWeightFunc;
