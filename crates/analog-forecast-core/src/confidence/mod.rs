//! Forecast confidence heuristic.
//!
//! A bounded [0, 100] score mixing two signals:
//!
//! - similarity of the best analog, `exp(-d_best / distance_scale)`
//! - ensemble breadth, `ess / (ess + ess_half)` with the effective sample
//!   size `ess = (sum w)^2 / sum w^2`
//!
//! blended by `similarity_share` and discounted by lead time:
//!
//! ```text
//! base  = a * exp(-d_best / s_d) + (1 - a) * ess / (ess + ess_half)
//! score = 100 * base / (1 + hours / horizon_scale_hours)
//! ```
//!
//! The score never increases when the best distance grows, when the
//! effective sample size shrinks, or when the horizon gets longer. It is a
//! heuristic, not a calibrated probability.

use crate::config::ConfidenceConfig;
use crate::types::Horizon;

/// Upper bound of the score.
pub const MAX_CONFIDENCE: f32 = 100.0;

#[derive(Debug, Clone)]
pub struct ConfidenceEstimator {
    config: ConfidenceConfig,
}

impl ConfidenceEstimator {
    pub fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConfidenceConfig {
        &self.config
    }

    /// Score one variable's ensemble.
    ///
    /// `distances` and `weights` are aligned per contributing analog. Empty
    /// input, mismatched lengths and any non-finite value score 0.
    pub fn estimate(&self, distances: &[f32], weights: &[f32], horizon: Horizon) -> f32 {
        if distances.is_empty() || distances.len() != weights.len() {
            return 0.0;
        }
        if distances.iter().chain(weights).any(|x| !x.is_finite()) {
            return 0.0;
        }

        let d_best = distances
            .iter()
            .copied()
            .min_by(|a, b| a.total_cmp(b))
            .unwrap_or(f32::INFINITY)
            .max(0.0) as f64;
        let ess = effective_sample_size(weights);

        let share = self.config.similarity_share as f64;
        let similarity = (-d_best / self.config.distance_scale as f64).exp();
        let breadth = ess / (ess + self.config.ess_half as f64);
        let base = share * similarity + (1.0 - share) * breadth;

        let discount = 1.0 + horizon.hours() as f64 / self.config.horizon_scale_hours as f64;
        let score = (100.0 * base / discount) as f32;
        if score.is_finite() {
            score.clamp(0.0, MAX_CONFIDENCE)
        } else {
            0.0
        }
    }
}

/// Kish effective sample size `(sum w)^2 / sum w^2`.
///
/// Negative and non-finite weights are ignored. Returns 0 when no positive
/// weight remains.
pub fn effective_sample_size(weights: &[f32]) -> f64 {
    let (sum, sum_sq) = weights
        .iter()
        .filter(|w| w.is_finite() && **w > 0.0)
        .fold((0.0f64, 0.0f64), |(s, sq), &w| {
            let w = w as f64;
            (s + w, sq + w * w)
        });
    if sum_sq > 0.0 {
        sum * sum / sum_sq
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> ConfidenceEstimator {
        ConfidenceEstimator::new(ConfidenceConfig::default())
    }

    #[test]
    fn test_ess_uniform_equals_count() {
        assert!((effective_sample_size(&[0.3; 8]) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_ess_single_dominant() {
        let ess = effective_sample_size(&[1.0, 1e-6, 1e-6]);
        assert!(ess < 1.01, "ess {}", ess);
    }

    #[test]
    fn test_ess_ignores_bad_weights() {
        assert_eq!(effective_sample_size(&[]), 0.0);
        assert_eq!(effective_sample_size(&[0.0, -1.0, f32::NAN]), 0.0);
        assert!((effective_sample_size(&[2.0, f32::NAN, 2.0]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_increasing_in_best_distance() {
        let est = estimator();
        let weights = [1.0, 0.8, 0.6];
        let mut last = f32::INFINITY;
        for d in [0.0, 0.05, 0.1, 0.3, 0.8, 2.0, 4.0] {
            let score = est.estimate(&[d, d + 0.1, d + 0.2], &weights, Horizon::H24);
            assert!(score <= last, "distance {} gave {} after {}", d, score, last);
            last = score;
        }
    }

    #[test]
    fn test_non_increasing_when_ess_shrinks() {
        let est = estimator();
        let distances = [0.1, 0.1, 0.1, 0.1];
        let broad = est.estimate(&distances, &[1.0, 1.0, 1.0, 1.0], Horizon::H12);
        let narrow = est.estimate(&distances, &[1.0, 0.1, 0.1, 0.1], Horizon::H12);
        let single = est.estimate(&distances[..1], &[1.0], Horizon::H12);
        assert!(broad >= narrow);
        assert!(narrow >= single);
    }

    #[test]
    fn test_non_increasing_in_horizon() {
        let est = estimator();
        let scores: Vec<f32> = Horizon::ALL
            .iter()
            .map(|h| est.estimate(&[0.2, 0.3], &[1.0, 0.7], *h))
            .collect();
        assert!(scores.windows(2).all(|p| p[0] >= p[1]), "{:?}", scores);
    }

    #[test]
    fn test_bounded() {
        let est = estimator();
        let perfect = est.estimate(&[0.0; 64], &[1.0; 64], Horizon::H6);
        assert!(perfect > 0.0 && perfect <= MAX_CONFIDENCE);
        let poor = est.estimate(&[4.0], &[1e-30], Horizon::H48);
        assert!((0.0..=MAX_CONFIDENCE).contains(&poor));
    }

    #[test]
    fn test_degenerate_input_scores_zero() {
        let est = estimator();
        assert_eq!(est.estimate(&[], &[], Horizon::H6), 0.0);
        assert_eq!(est.estimate(&[0.1], &[], Horizon::H6), 0.0);
        assert_eq!(est.estimate(&[f32::NAN], &[1.0], Horizon::H6), 0.0);
        assert_eq!(est.estimate(&[0.1], &[f32::INFINITY], Horizon::H6), 0.0);
    }

    #[test]
    fn test_deterministic() {
        let est = estimator();
        let a = est.estimate(&[0.12, 0.2, 0.31], &[1.0, 0.6, 0.2], Horizon::H24);
        let b = est.estimate(&[0.12, 0.2, 0.31], &[1.0, 0.6, 0.2], Horizon::H24);
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
