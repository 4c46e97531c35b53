//! Distance weighting for surface fits.

use nalgebra::Vector3;

/// A compactly-supported smooth distance weight.
///
/// Evaluates `(t² − 1)²` for `t = ‖x‖ / radius` inside the support radius
/// and `0` outside. The kernel is C¹ at the support boundary, so samples
/// entering or leaving the neighborhood do not jolt the fit.
#[derive(Debug, Clone, Copy)]
pub struct DistWeightFunc {
    radius: f64,
}

impl DistWeightFunc {
    /// Create a weight function with the given support radius.
    ///
    /// The radius must be positive.
    pub fn new(radius: f64) -> Self {
        debug_assert!(radius > 0.0, "weight radius must be positive");
        Self { radius }
    }

    /// The support radius.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Evaluate the weight of a sample at offset `local` from the fit center.
    #[inline]
    pub fn weight(&self, local: &Vector3<f64>) -> f64 {
        let t = local.norm() / self.radius;
        if t < 1.0 {
            let u = t * t - 1.0;
            u * u
        } else {
            0.0
        }
    }
}

impl Default for DistWeightFunc {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_at_center_is_one() {
        let w = DistWeightFunc::new(2.0);
        assert!((w.weight(&Vector3::zeros()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weight_vanishes_at_radius() {
        let w = DistWeightFunc::new(2.0);
        assert_eq!(w.weight(&Vector3::new(2.0, 0.0, 0.0)), 0.0);
        assert_eq!(w.weight(&Vector3::new(5.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_weight_decreases_with_distance() {
        let w = DistWeightFunc::new(1.0);
        let near = w.weight(&Vector3::new(0.1, 0.0, 0.0));
        let far = w.weight(&Vector3::new(0.9, 0.0, 0.0));
        assert!(near > far);
        assert!(far > 0.0);
    }
}
