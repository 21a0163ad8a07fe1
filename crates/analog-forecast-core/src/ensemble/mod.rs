//! Weighted ensemble statistics over analog outcomes.
//!
//! For each requested variable the aggregator reduces the analogs' outcome
//! values to a weighted mean and a weighted 5th..95th percentile band.
//!
//! # Guarantees
//!
//! - `p05 <= mean <= p95` for every summary. A skewed weighted sample can put
//!   the mean outside the quantile band; the band is then widened to the mean.
//! - A single contributing analog gives `p05 == mean == p95`.
//! - Uniform weights give the arithmetic mean.
//! - Sums are accumulated in f64 and the result is independent of thread
//!   scheduling.

mod quantile;

use tracing::warn;

use crate::error::{ForecastError, ForecastResult};
use crate::types::{Horizon, Variable};

pub use quantile::{sort_samples, weighted_mean, weighted_quantile, WeightedSample};

/// Lower band quantile.
pub const LOWER_QUANTILE: f64 = 0.05;
/// Upper band quantile.
pub const UPPER_QUANTILE: f64 = 0.95;

/// Aggregate of one variable across the ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSummary {
    pub mean: f32,
    pub p05: f32,
    pub p95: f32,
    /// Analogs with a finite value for this variable.
    pub analog_count: usize,
    /// Positions (into the analog list) of those analogs, in rank order.
    pub contributors: Vec<usize>,
}

/// Combines outcome rows into per-variable summaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsembleAggregator;

impl EnsembleAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Summarise `columns` over `rows` weighted by `weights`.
    ///
    /// `rows[i]` is the outcome row of the i-th analog and `weights[i]` its
    /// weight. Each entry of `columns` names a variable and its column in
    /// the outcome rows; only those columns are read. A variable whose
    /// column holds no finite value among the analogs maps to `None`.
    ///
    /// # Errors
    ///
    /// - `InsufficientAnalogs` when `rows` is empty
    /// - `Internal` when `weights` and `rows` differ in length
    pub fn aggregate(
        &self,
        horizon: Horizon,
        rows: &[&[f32]],
        weights: &[f32],
        columns: &[(Variable, usize)],
    ) -> ForecastResult<Vec<(Variable, Option<VariableSummary>)>> {
        if rows.is_empty() {
            return Err(ForecastError::InsufficientAnalogs { horizon, k: 0 });
        }
        if rows.len() != weights.len() {
            return Err(ForecastError::Internal(format!(
                "{} outcome rows but {} weights",
                rows.len(),
                weights.len()
            )));
        }

        let weights = sanitize_weights(horizon, weights);
        Ok(columns
            .iter()
            .map(|&(variable, col)| (variable, summarize(horizon, variable, rows, &weights, col)))
            .collect())
    }
}

/// Negative or non-finite weights count as zero. If nothing usable is left
/// the ensemble falls back to equal weights.
fn sanitize_weights(horizon: Horizon, weights: &[f32]) -> Vec<f64> {
    let cleaned: Vec<f64> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w as f64 } else { 0.0 })
        .collect();
    let total: f64 = cleaned.iter().sum();
    if total > 0.0 && total.is_finite() {
        cleaned
    } else {
        warn!(
            horizon = %horizon,
            analogs = weights.len(),
            "degenerate ensemble weights, falling back to uniform"
        );
        vec![1.0; weights.len()]
    }
}

fn summarize(
    horizon: Horizon,
    variable: Variable,
    rows: &[&[f32]],
    weights: &[f64],
    col: usize,
) -> Option<VariableSummary> {
    let mut contributors = Vec::with_capacity(rows.len());
    let mut samples = Vec::with_capacity(rows.len());
    for (i, (row, &w)) in rows.iter().zip(weights).enumerate() {
        match row.get(col) {
            Some(v) if v.is_finite() => {
                contributors.push(i);
                samples.push(WeightedSample::new(*v as f64, w, i));
            }
            _ => {}
        }
    }
    if samples.is_empty() {
        return None;
    }

    // Finite values may all sit on zero-weight analogs.
    if samples.iter().all(|s| s.weight <= 0.0) {
        warn!(
            horizon = %horizon,
            variable = %variable,
            "contributing analogs carry no weight, using uniform weights"
        );
        for s in samples.iter_mut() {
            s.weight = 1.0;
        }
    }

    let mean = weighted_mean(&samples)? as f32;

    samples.retain(|s| s.weight > 0.0);
    sort_samples(&mut samples);
    let p05 = weighted_quantile(&samples, LOWER_QUANTILE)? as f32;
    let p95 = weighted_quantile(&samples, UPPER_QUANTILE)? as f32;

    Some(VariableSummary {
        mean,
        p05: p05.min(mean),
        p95: p95.max(mean),
        analog_count: contributors.len(),
        contributors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const T2M: Variable = Variable::Temperature2m;

    fn run(rows: &[Vec<f32>], weights: &[f32]) -> VariableSummary {
        let refs: Vec<&[f32]> = rows.iter().map(|r| r.as_slice()).collect();
        let mut out = EnsembleAggregator::new()
            .aggregate(Horizon::H24, &refs, weights, &[(T2M, 0)])
            .unwrap();
        out.remove(0).1.unwrap()
    }

    #[test]
    fn test_uniform_weights_give_arithmetic_mean() {
        let rows = vec![vec![1.0], vec![2.0], vec![6.0]];
        let s = run(&rows, &[0.5, 0.5, 0.5]);
        assert!((s.mean - 3.0).abs() < 1e-6);
        assert_eq!(s.analog_count, 3);
    }

    #[test]
    fn test_single_analog_collapses_band() {
        let s = run(&[vec![12.5]], &[0.3]);
        assert_eq!(s.mean, 12.5);
        assert_eq!(s.p05, 12.5);
        assert_eq!(s.p95, 12.5);
    }

    #[test]
    fn test_closest_analog_dominates_mean() {
        let rows = vec![vec![10.0], vec![20.0], vec![30.0]];
        let s = run(&rows, &[1.0, 0.2, 0.1]);
        assert!(s.mean < 20.0, "mean {}", s.mean);
        assert!(s.p05 <= s.mean && s.mean <= s.p95);
    }

    #[test]
    fn test_band_contains_mean_for_skewed_sample() {
        // One heavy outlier drags the mean above the upper quantile position.
        let rows = vec![vec![0.0], vec![0.0], vec![0.0], vec![1000.0]];
        let s = run(&rows, &[1.0, 1.0, 1.0, 0.2]);
        assert!(s.p05 <= s.mean, "{:?}", s);
        assert!(s.mean <= s.p95, "{:?}", s);
    }

    #[test]
    fn test_only_requested_columns_are_read() {
        let rows = vec![vec![1.0, 100.0], vec![3.0, 300.0]];
        let refs: Vec<&[f32]> = rows.iter().map(|r| r.as_slice()).collect();
        let out = EnsembleAggregator::new()
            .aggregate(
                Horizon::H6,
                &refs,
                &[1.0, 1.0],
                &[(Variable::CloudCover, 1)],
            )
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, Variable::CloudCover);
        assert!((out[0].1.as_ref().unwrap().mean - 200.0).abs() < 1e-4);
    }

    #[test]
    fn test_non_finite_values_excluded() {
        let rows = vec![vec![f32::NAN], vec![4.0], vec![f32::INFINITY]];
        let s = run(&rows, &[1.0, 1.0, 1.0]);
        assert_eq!(s.mean, 4.0);
        assert_eq!(s.analog_count, 1);
        assert_eq!(s.contributors, vec![1]);
    }

    #[test]
    fn test_all_missing_values_is_none() {
        let rows = vec![vec![f32::NAN], vec![f32::NAN]];
        let refs: Vec<&[f32]> = rows.iter().map(|r| r.as_slice()).collect();
        let out = EnsembleAggregator::new()
            .aggregate(Horizon::H6, &refs, &[1.0, 1.0], &[(T2M, 0)])
            .unwrap();
        assert!(out[0].1.is_none());
    }

    #[test]
    fn test_degenerate_weights_fall_back_to_uniform() {
        let rows = vec![vec![2.0], vec![4.0]];
        for weights in [[0.0, 0.0], [f32::NAN, f32::NAN], [-1.0, -2.0]] {
            let s = run(&rows, &weights);
            assert!((s.mean - 3.0).abs() < 1e-6, "{:?} -> {}", weights, s.mean);
        }
    }

    #[test]
    fn test_empty_rows_is_insufficient() {
        let err = EnsembleAggregator::new()
            .aggregate(Horizon::H48, &[], &[], &[(T2M, 0)])
            .unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientAnalogs { .. }));
    }

    #[test]
    fn test_length_mismatch_is_internal() {
        let rows = vec![vec![1.0]];
        let refs: Vec<&[f32]> = rows.iter().map(|r| r.as_slice()).collect();
        let err = EnsembleAggregator::new()
            .aggregate(Horizon::H6, &refs, &[1.0, 2.0], &[(T2M, 0)])
            .unwrap_err();
        assert!(matches!(err, ForecastError::Internal(_)));
    }

    #[test]
    fn test_repeatable() {
        let rows: Vec<Vec<f32>> = (0..50).map(|i| vec![(i as f32 * 0.37).sin()]).collect();
        let weights: Vec<f32> = (0..50).map(|i| 1.0 / (1.0 + i as f32)).collect();
        assert_eq!(run(&rows, &weights), run(&rows, &weights));
    }
}
