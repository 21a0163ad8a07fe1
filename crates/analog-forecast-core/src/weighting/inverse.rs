//! Inverse-distance weighting.

use super::{horizon_stretch, min_finite, WeightingFunction};
use crate::types::Horizon;

/// `w_i = ((d_min + eps) / (d_i + eps))^p(h)` with `p(h) = power / (1 + alpha * hours / 24)`.
///
/// Equivalent to `1 / (d + eps)^p` up to a constant factor; normalizing by
/// the best analog keeps every weight in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseDistance {
    power: f32,
    epsilon: f32,
    horizon_alpha: f32,
}

impl InverseDistance {
    pub fn new(power: f32, epsilon: f32, horizon_alpha: f32) -> Self {
        Self {
            power,
            epsilon,
            horizon_alpha,
        }
    }

    /// Effective exponent for a horizon.
    pub fn power_for(&self, horizon: Horizon) -> f32 {
        self.power / horizon_stretch(self.horizon_alpha, horizon)
    }
}

impl WeightingFunction for InverseDistance {
    fn name(&self) -> &'static str {
        "inverse_distance"
    }

    fn weights(&self, distances: &[f32], horizon: Horizon) -> Vec<f32> {
        let Some(d_min) = min_finite(distances) else {
            return vec![0.0; distances.len()];
        };
        let p = self.power_for(horizon);
        let reference = d_min.max(0.0) + self.epsilon;
        distances
            .iter()
            .map(|&d| {
                if d.is_finite() {
                    (reference / (d.max(0.0) + self.epsilon)).powf(p)
                } else {
                    0.0
                }
            })
            .collect()
    }
}
