//! Catalog sources.

use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use super::persistence::{horizon_dir, read_parts};
use super::types::{Catalog, CatalogExpectations};
use super::validation::{verify_catalog_dir, IntegrityReport};
use crate::config::ForecastConfig;
use crate::error::{ForecastError, ForecastResult};
use crate::types::Horizon;

/// Produces validated catalogs for the registry.
///
/// `load` is called at most once per horizon per registry state cycle and
/// may be slow. Implementations must be safe to call from any thread.
pub trait CatalogLoader: Send + Sync {
    /// Load and validate `horizon`'s catalog.
    ///
    /// Unreadable artifacts are reported as `IndexUnavailable`, artifacts
    /// that disagree with each other as `StructuralMismatch`.
    fn load(&self, horizon: Horizon) -> ForecastResult<Catalog>;

    /// Structural report for `horizon`'s artifacts without loading them for serving.
    fn inspect(&self, horizon: Horizon) -> ForecastResult<IntegrityReport>;
}

/// Loads catalogs from `<root>/<horizon>/`.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
    expectations: CatalogExpectations,
    nprobe: Option<usize>,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>, expectations: CatalogExpectations) -> Self {
        Self {
            root: root.into(),
            expectations,
            nprobe: None,
        }
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        let expectations = CatalogExpectations {
            dimension: config.catalog.dimension,
            variables: config.catalog.variables.clone(),
        };
        Self::new(config.catalog.root.clone(), expectations).with_nprobe(config.search.nprobe)
    }

    /// Override the probe count of IVF-PQ indexes after loading.
    pub fn with_nprobe(mut self, nprobe: Option<usize>) -> Self {
        self.nprobe = nprobe;
        self
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl CatalogLoader for DirectoryLoader {
    fn load(&self, horizon: Horizon) -> ForecastResult<Catalog> {
        let started = Instant::now();
        let dir = horizon_dir(&self.root, horizon);
        let mut parts = read_parts(&dir).map_err(|e| ForecastError::IndexUnavailable {
            horizon,
            reason: e.to_string(),
        })?;
        if let Some(nprobe) = self.nprobe {
            parts.index.set_nprobe(nprobe);
        }
        let catalog = Catalog::new(horizon, parts, self.expectations.clone())?;
        info!(
            horizon = %horizon,
            dir = %dir.display(),
            rows = catalog.rows(),
            index = %catalog.index().kind(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded catalog"
        );
        Ok(catalog)
    }

    fn inspect(&self, horizon: Horizon) -> ForecastResult<IntegrityReport> {
        verify_catalog_dir(&horizon_dir(&self.root, horizon), horizon, &self.expectations)
    }
}
