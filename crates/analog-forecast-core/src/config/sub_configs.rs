//! Section types of [`ForecastConfig`](super::ForecastConfig).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{Horizon, Variable, DEFAULT_EMBEDDING_DIM};

/// Where catalogs live and what shape every horizon must agree on.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Root directory holding one sub-directory per horizon (`<root>/24h/`).
    pub root: PathBuf,
    /// Embedding dimension shared by every horizon.
    pub dimension: usize,
    /// Ordered outcome columns shared by every horizon.
    pub variables: Vec<Variable>,
    /// Horizons this process serves. Anything else is rejected at the boundary.
    pub horizons: Vec<Horizon>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data/catalogs"),
            dimension: DEFAULT_EMBEDDING_DIM,
            variables: Variable::ALL.to_vec(),
            horizons: Horizon::ALL.to_vec(),
        }
    }
}

/// Analog retrieval parameters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Analogs retrieved per request.
    pub k: usize,
    /// Upper bound on a single index search.
    pub timeout_ms: u64,
    /// Overrides the IVF lists probed per query. `None` keeps the artifact value.
    pub nprobe: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            k: 32,
            timeout_ms: 250,
            nprobe: None,
        }
    }
}

/// Distance-to-weight policy selection.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeightingKind {
    /// `exp(-(d - d_min) / tau(h))`
    #[default]
    Exponential,
    /// `1 / (d + epsilon)^p(h)`
    InverseDistance,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WeightingConfig {
    pub kind: WeightingKind,
    /// Base decay length of the exponential kernel, in squared-L2 units.
    pub tau: f32,
    /// Base exponent of inverse-distance weighting.
    pub power: f32,
    /// Distance floor of inverse-distance weighting.
    pub epsilon: f32,
    /// Horizon scaling per 24h of lead time (0 disables horizon scaling).
    pub horizon_alpha: f32,
}

impl Default for WeightingConfig {
    fn default() -> Self {
        Self {
            kind: WeightingKind::Exponential,
            tau: 0.05,
            power: 2.0,
            epsilon: 1e-6,
            horizon_alpha: 0.5,
        }
    }
}

/// Confidence heuristic parameters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Best-analog distance at which the similarity term drops to 1/e.
    pub distance_scale: f32,
    /// Effective sample size at which the diversity term reaches one half.
    pub ess_half: f32,
    /// Share of the similarity term in the base score, in [0, 1].
    pub similarity_share: f32,
    /// Lead time (hours) at which the score is halved.
    pub horizon_scale_hours: f32,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            distance_scale: 0.5,
            ess_half: 4.0,
            similarity_share: 0.6,
            horizon_scale_hours: 96.0,
        }
    }
}

/// Request cardinality limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_variables: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_variables: 9 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level when neither `-v` nor `RUST_LOG` is given.
    pub level: String,
    /// `compact` for one-line records; anything else uses the full format.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
