//! Exponential kernel weighting.

use super::{horizon_stretch, min_finite, WeightingFunction};
use crate::types::Horizon;

/// `w_i = exp(-(d_i - d_min) / tau(h))` with `tau(h) = tau * (1 + alpha * hours / 24)`.
///
/// Distances are shifted by the minimum before exponentiating, so the best
/// analog always weighs exactly 1 and nothing overflows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialKernel {
    tau: f32,
    horizon_alpha: f32,
}

impl ExponentialKernel {
    pub fn new(tau: f32, horizon_alpha: f32) -> Self {
        Self { tau, horizon_alpha }
    }

    /// Effective decay length for a horizon.
    pub fn tau_for(&self, horizon: Horizon) -> f32 {
        self.tau * horizon_stretch(self.horizon_alpha, horizon)
    }
}

impl WeightingFunction for ExponentialKernel {
    fn name(&self) -> &'static str {
        "exponential"
    }

    fn weights(&self, distances: &[f32], horizon: Horizon) -> Vec<f32> {
        let Some(d_min) = min_finite(distances) else {
            return vec![0.0; distances.len()];
        };
        let tau = self.tau_for(horizon);
        distances
            .iter()
            .map(|&d| {
                if d.is_finite() {
                    (-(d - d_min) / tau).exp()
                } else {
                    0.0
                }
            })
            .collect()
    }
}
