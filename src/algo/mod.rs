//! Mesh simplification algorithms.
//!
//! The driver in [`simplify`] consumes the error metrics to reduce a
//! mesh by greedy edge collapse. The metrics themselves live in
//! [`crate::metric`] and are usable without the driver.

pub mod simplify;
