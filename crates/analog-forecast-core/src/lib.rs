//! Analog Ensemble Forecasting Engine
//!
//! Given an embedding of the current atmospheric state, this crate retrieves
//! the most similar historical states (analogs) from a per-horizon catalog
//! and combines their verified outcomes into a probabilistic forecast: a
//! weighted mean, a 5th..95th percentile band and a confidence score per
//! requested variable.
//!
//! # Architecture
//!
//! - **types**: horizons, the variable vocabulary, forecast records
//! - **config**: layered configuration with validation
//! - **error**: `ForecastError` taxonomy and `FailureKind`
//! - **index**: exact flat and approximate IVF-PQ nearest-neighbor search
//! - **catalog**: artifacts, structural validation, loading, registry
//! - **weighting**: distance-to-weight policies
//! - **ensemble**: weighted mean and quantiles
//! - **confidence**: bounded confidence heuristic
//! - **orchestrator**: request validation and the forecast pipeline
//!
//! # Example
//!
//! ```no_run
//! use analog_forecast_core::{ForecastConfig, ForecastOrchestrator, ForecastRequest};
//! use analog_forecast_core::types::{Horizon, Variable};
//!
//! # async fn run() -> analog_forecast_core::ForecastResult<()> {
//! let orchestrator = ForecastOrchestrator::new(ForecastConfig::load()?)?;
//! let query = vec![0.0625_f32; 256];
//! let request = ForecastRequest::new(Horizon::H24, query, &[Variable::Temperature2m]);
//! let response = orchestrator.forecast(&request).await?;
//! println!("{:?}", response.get(Variable::Temperature2m));
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod confidence;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod index;
pub mod orchestrator;
pub mod types;
pub mod weighting;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for convenience
pub use catalog::{
    verify_catalog_dir, Catalog, CatalogExpectations, CatalogLoader, CatalogManifest,
    CatalogParts, CatalogRegistry, DirectoryLoader, HorizonState, IntegrityReport, Matrix,
};
pub use confidence::{effective_sample_size, ConfidenceEstimator};
pub use config::ForecastConfig;
pub use ensemble::{EnsembleAggregator, VariableSummary};
pub use error::{FailureKind, ForecastError, ForecastResult};
pub use index::{Analog, FlatIndex, IndexKind, IvfPqIndex, IvfPqParams, SearchHit, VectorIndex};
pub use orchestrator::{ForecastOrchestrator, ForecastRequest, ValidatedRequest};
pub use types::{ForecastRecord, ForecastResponse, Horizon, Variable};
pub use weighting::{ExponentialKernel, InverseDistance, WeightingFunction};
