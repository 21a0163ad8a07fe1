//! Per-request forecast output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Horizon, Variable};
use crate::error::FailureKind;

/// Probabilistic forecast for one variable.
///
/// When `available` is false the numeric fields carry no information and
/// are set to `NaN` (value, p05, p95) and `0.0` (confidence).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Weighted ensemble mean.
    #[serde(with = "nan_as_null")]
    pub value: f32,
    /// Weighted 5th percentile.
    #[serde(with = "nan_as_null")]
    pub p05: f32,
    /// Weighted 95th percentile.
    #[serde(with = "nan_as_null")]
    pub p95: f32,
    /// Heuristic trust score in [0, 100].
    pub confidence: f32,
    /// Number of analogs contributing to this variable.
    pub analog_count: usize,
    pub available: bool,
}

impl ForecastRecord {
    /// Record for a variable that could not be forecast.
    pub fn unavailable(analog_count: usize) -> Self {
        Self {
            value: f32::NAN,
            p05: f32::NAN,
            p95: f32::NAN,
            confidence: 0.0,
            analog_count,
            available: false,
        }
    }

    /// Width of the p05..p95 band, `None` when unavailable.
    pub fn spread(&self) -> Option<f32> {
        self.available.then(|| self.p95 - self.p05)
    }
}

/// `NaN` is written as `null` and `null` is read back as `NaN`.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        let value = (!value.is_nan()).then_some(*value);
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or(f32::NAN))
    }
}

/// Full response for one forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub horizon: Horizon,
    /// One record per distinct requested variable.
    pub records: BTreeMap<Variable, ForecastRecord>,
    /// Set when a request-scoped failure degraded every variable.
    pub degraded: Option<FailureKind>,
    /// Analogs returned by the index search.
    pub analogs_used: usize,
}

impl ForecastResponse {
    pub fn get(&self, variable: Variable) -> Option<&ForecastRecord> {
        self.records.get(&variable)
    }

    /// Number of variables with `available == true`.
    pub fn available_count(&self) -> usize {
        self.records.values().filter(|r| r.available).count()
    }
}
