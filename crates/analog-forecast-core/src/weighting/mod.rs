//! Distance-to-weight policies.
//!
//! A policy turns the distances of k analogs into k non-negative weights.
//! Weights need not sum to one; the aggregator normalizes.
//!
//! Every policy must be:
//! - strictly decreasing in distance (closer analog, larger weight)
//! - finite at zero distance
//! - flat for nearly tied distances, so the effective ensemble size is kept
//!
//! The decay curve is pluggable and horizon-parameterised. Longer horizons
//! decay more slowly and tolerate coarser matches.

mod exponential;
mod inverse;

use std::fmt::Debug;
use std::sync::Arc;

use crate::config::{WeightingConfig, WeightingKind};
use crate::index::Analog;
use crate::types::Horizon;

pub use exponential::ExponentialKernel;
pub use inverse::InverseDistance;

/// Converts analog distances into ensemble weights.
pub trait WeightingFunction: Send + Sync + Debug {
    /// Short policy name for logs.
    fn name(&self) -> &'static str;

    /// One weight per distance, same order. Empty input yields empty output.
    fn weights(&self, distances: &[f32], horizon: Horizon) -> Vec<f32>;

    /// Write weights into `analogs` in place.
    fn apply(&self, analogs: &mut [Analog], horizon: Horizon) {
        let distances: Vec<f32> = analogs.iter().map(|a| a.distance).collect();
        for (analog, w) in analogs.iter_mut().zip(self.weights(&distances, horizon)) {
            analog.weight = w;
        }
    }
}

/// Horizon stretch factor `1 + alpha * hours / 24`.
#[inline]
pub(crate) fn horizon_stretch(alpha: f32, horizon: Horizon) -> f32 {
    1.0 + alpha * horizon.hours() as f32 / 24.0
}

/// Smallest finite distance, if any.
pub(crate) fn min_finite(distances: &[f32]) -> Option<f32> {
    distances
        .iter()
        .copied()
        .filter(|d| d.is_finite())
        .min_by(|a, b| a.total_cmp(b))
}

/// Build the configured policy.
pub fn from_config(config: &WeightingConfig) -> Arc<dyn WeightingFunction> {
    match config.kind {
        WeightingKind::Exponential => {
            Arc::new(ExponentialKernel::new(config.tau, config.horizon_alpha))
        }
        WeightingKind::InverseDistance => Arc::new(InverseDistance::new(
            config.power,
            config.epsilon,
            config.horizon_alpha,
        )),
    }
}
