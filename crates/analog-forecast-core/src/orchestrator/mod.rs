//! Top-level forecasting entry point.
//!
//! # Pipeline
//!
//! ```text
//! ForecastRequest
//!   -> validate (horizon, variables, query; query renormalized)
//!   -> CatalogRegistry::acquire        (load once, fail fast when FAILED)
//!   -> Catalog::search                 (blocking pool, bounded by timeout)
//!   -> WeightingFunction::apply
//!   -> EnsembleAggregator::aggregate + ConfidenceEstimator::estimate
//!   -> ForecastResponse
//! ```
//!
//! # Failure policy
//!
//! - Invalid input fails the request (`InvalidRequest`, `InvalidQuery`).
//! - A broken horizon fails the request (`IndexUnavailable`,
//!   `StructuralMismatch`) and never touches other horizons.
//! - An empty search or a search timeout degrades the response: every
//!   variable is returned with `available: false` and `degraded` set.
//! - A variable the catalog does not carry, or whose analogs hold no finite
//!   value, is marked unavailable on its own.

mod deadline;
mod request;


use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::catalog::{
    Catalog, CatalogLoader, CatalogRegistry, DirectoryLoader, HorizonState, IntegrityReport,
};
use crate::confidence::ConfidenceEstimator;
use crate::config::ForecastConfig;
use crate::ensemble::EnsembleAggregator;
use crate::error::{ForecastError, ForecastResult};
use crate::index::{Analog, SearchHit};
use crate::types::{ForecastRecord, ForecastResponse, Horizon, Variable};
use crate::weighting::{self, WeightingFunction};

pub use deadline::run_with_deadline;
pub use request::{ForecastRequest, ValidatedRequest};

/// Owns the catalogs and runs forecasts against them.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct ForecastOrchestrator {
    config: ForecastConfig,
    registry: Arc<CatalogRegistry>,
    weighting: Arc<dyn WeightingFunction>,
    aggregator: EnsembleAggregator,
    confidence: ConfidenceEstimator,
}

impl ForecastOrchestrator {
    /// Orchestrator reading catalogs from `config.catalog.root`.
    ///
    /// No catalog is loaded here; each horizon loads on first use or on
    /// [`preload`](Self::preload).
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `config` does not validate.
    pub fn new(config: ForecastConfig) -> ForecastResult<Self> {
        let loader = Arc::new(DirectoryLoader::from_config(&config));
        Self::with_loader(config, loader)
    }

    /// Orchestrator with a custom catalog source.
    pub fn with_loader(
        config: ForecastConfig,
        loader: Arc<dyn CatalogLoader>,
    ) -> ForecastResult<Self> {
        config.validate()?;
        let registry = Arc::new(CatalogRegistry::new(loader, &config.catalog.horizons));
        let weighting = weighting::from_config(&config.weighting);
        let confidence = ConfidenceEstimator::new(config.confidence.clone());
        info!(
            horizons = ?config.catalog.horizons,
            dimension = config.catalog.dimension,
            k = config.search.k,
            weighting = weighting.name(),
            "forecast orchestrator created"
        );
        Ok(Self {
            config,
            registry,
            weighting,
            aggregator: EnsembleAggregator::new(),
            confidence,
        })
    }

    /// Replace the configured weighting policy.
    pub fn with_weighting(mut self, weighting: Arc<dyn WeightingFunction>) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CatalogRegistry> {
        &self.registry
    }

    /// Produce a forecast for `request`.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` / `InvalidQuery` for bad input
    /// - `IndexUnavailable` / `StructuralMismatch` when the horizon cannot serve
    /// - `Internal` for invariant violations
    ///
    /// Empty searches and timeouts are not errors; see the module docs.
    pub async fn forecast(&self, request: &ForecastRequest) -> ForecastResult<ForecastResponse> {
        let started = Instant::now();
        let validated = request.validate(&self.config)?;
        let horizon = validated.horizon;
        let catalog = self.catalog(horizon).await?;

        let k = self.config.search.k;
        let search_catalog = Arc::clone(&catalog);
        let query = validated.query.clone();
        let hits = run_with_deadline(horizon, self.config.search.timeout_ms, move || {
            search_catalog.search(&query, k)
        })
        .await;

        let response = self.assemble(&validated, &catalog, hits)?;
        debug!(
            horizon = %horizon,
            variables = validated.variables.len(),
            analogs = response.analogs_used,
            available = response.available_count(),
            degraded = ?response.degraded,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "forecast complete"
        );
        Ok(response)
    }

    /// Ready catalog for `horizon`, loading it on the blocking pool if needed.
    async fn catalog(&self, horizon: Horizon) -> ForecastResult<Arc<Catalog>> {
        if let Some(ready) = self.registry.try_ready(horizon) {
            return ready;
        }
        let registry = Arc::clone(&self.registry);
        tokio::task::spawn_blocking(move || registry.acquire(horizon))
            .await
            .map_err(|e| {
                ForecastError::Internal(format!("catalog load task for {} failed: {}", horizon, e))
            })?
    }

    /// Turn a search outcome into a response.
    ///
    /// Request-scoped failures (`Timeout`, no analogs) degrade every
    /// variable; anything else is returned as an error.
    pub(crate) fn assemble(
        &self,
        request: &ValidatedRequest,
        catalog: &Catalog,
        hits: ForecastResult<Vec<SearchHit>>,
    ) -> ForecastResult<ForecastResponse> {
        let horizon = request.horizon;
        let hits = match hits {
            Ok(hits) if hits.is_empty() => {
                let err = ForecastError::InsufficientAnalogs {
                    horizon,
                    k: self.config.search.k,
                };
                warn!(horizon = %horizon, error = %err, "no analogs, degrading response");
                return Ok(degraded(request, err));
            }
            Ok(hits) => hits,
            Err(err @ ForecastError::Timeout { .. }) => return Ok(degraded(request, err)),
            Err(err) => return Err(err),
        };

        let mut analogs: Vec<Analog> = hits.into_iter().map(Analog::from_hit).collect();
        self.weighting.apply(&mut analogs, horizon);

        let rows = analogs
            .iter()
            .map(|a| catalog.outcome_row(a.row))
            .collect::<ForecastResult<Vec<_>>>()?;
        let weights: Vec<f32> = analogs.iter().map(|a| a.weight).collect();

        let mut records = BTreeMap::new();
        let mut columns = Vec::with_capacity(request.variables.len());
        for &variable in &request.variables {
            match catalog.column_of(variable) {
                Some(col) => columns.push((variable, col)),
                None => {
                    debug!(horizon = %horizon, variable = %variable, "variable not in catalog");
                    records.insert(variable, ForecastRecord::unavailable(0));
                }
            }
        }

        for (variable, summary) in self.aggregator.aggregate(horizon, &rows, &weights, &columns)? {
            let record = match summary {
                Some(s) => {
                    let distances: Vec<f32> =
                        s.contributors.iter().map(|&i| analogs[i].distance).collect();
                    let contributing: Vec<f32> =
                        s.contributors.iter().map(|&i| analogs[i].weight).collect();
                    ForecastRecord {
                        value: s.mean,
                        p05: s.p05,
                        p95: s.p95,
                        confidence: self.confidence.estimate(&distances, &contributing, horizon),
                        analog_count: s.analog_count,
                        available: true,
                    }
                }
                None => ForecastRecord::unavailable(0),
            };
            records.insert(variable, record);
        }

        Ok(ForecastResponse {
            horizon,
            records,
            degraded: None,
            analogs_used: analogs.len(),
        })
    }

    // ========== Administration ==========

    /// Load state of `horizon`, `None` if it is not enabled.
    pub fn horizon_state(&self, horizon: Horizon) -> Option<HorizonState> {
        self.registry.state(horizon)
    }

    /// State of every enabled horizon, shortest first.
    pub fn status(&self) -> Vec<(Horizon, HorizonState)> {
        self.registry.status()
    }

    /// Load every enabled horizon that is not loaded yet.
    ///
    /// Failures are reported per horizon and do not stop the others.
    pub async fn preload(&self) -> Vec<(Horizon, ForecastResult<()>)> {
        let mut outcomes = Vec::with_capacity(self.config.catalog.horizons.len());
        for horizon in self.registry.horizons() {
            let outcome = self.catalog(horizon).await.map(|_| ());
            outcomes.push((horizon, outcome));
        }
        outcomes
    }

    /// Return `horizon` to `UNLOADED` so the next request retries the load.
    pub fn reset_horizon(&self, horizon: Horizon) -> ForecastResult<HorizonState> {
        self.registry.reset(horizon)
    }

    /// Load fresh artifacts for `horizon` and swap them in atomically.
    ///
    /// A `READY` horizon keeps serving its current catalog if the new one
    /// fails to load.
    pub async fn reload_horizon(&self, horizon: Horizon) -> ForecastResult<()> {
        let registry = Arc::clone(&self.registry);
        tokio::task::spawn_blocking(move || registry.reload(horizon).map(|_| ()))
            .await
            .map_err(|e| {
                ForecastError::Internal(format!("reload task for {} failed: {}", horizon, e))
            })?
    }

    /// Install an already validated catalog for its horizon.
    pub fn swap_catalog(&self, catalog: Catalog) -> ForecastResult<()> {
        self.registry.swap(catalog.horizon(), catalog).map(|_| ())
    }

    /// Read-only structural report of `horizon`'s artifacts.
    pub fn integrity_report(&self, horizon: Horizon) -> ForecastResult<IntegrityReport> {
        self.registry.loader().inspect(horizon)
    }
}

impl std::fmt::Debug for ForecastOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastOrchestrator")
            .field("registry", &self.registry)
            .field("weighting", &self.weighting.name())
            .finish()
    }
}

/// Every requested variable unavailable, tagged with the failure kind.
fn degraded(request: &ValidatedRequest, err: ForecastError) -> ForecastResponse {
    let records: BTreeMap<Variable, ForecastRecord> = request
        .variables
        .iter()
        .map(|v| (*v, ForecastRecord::unavailable(0)))
        .collect();
    ForecastResponse {
        horizon: request.horizon,
        records,
        degraded: Some(err.kind()),
        analogs_used: 0,
    }
}
