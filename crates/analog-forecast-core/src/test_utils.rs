//! In-memory catalog fixtures shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::catalog::{
    inspect, Catalog, CatalogExpectations, CatalogLoader, CatalogParts, IntegrityReport, Matrix,
};
use crate::error::{ForecastError, ForecastResult};
use crate::index::{FlatIndex, VectorIndex};
use crate::types::{Horizon, Variable};

pub(crate) const T2M: Variable = Variable::Temperature2m;

pub(crate) fn expectations() -> CatalogExpectations {
    CatalogExpectations {
        dimension: 2,
        variables: vec![T2M],
    }
}

/// Three unit rows at 0, ~53 and 90 degrees with the given outcomes.
pub(crate) fn parts_with_outcomes(horizon: Horizon, outcomes: [f32; 3]) -> CatalogParts {
    let vectors = vec![1.0, 0.0, 0.6, 0.8, 0.0, 1.0];
    CatalogParts::from_matrices(
        horizon,
        Matrix::new(3, 2, vectors.clone()),
        Matrix::new(3, 1, outcomes.to_vec()),
        vec![T2M],
        VectorIndex::Flat(FlatIndex::from_vectors(2, vectors)),
    )
}

/// N=3, D=2, single variable with outcomes 10, 20, 30.
pub(crate) fn tiny_parts(horizon: Horizon) -> CatalogParts {
    parts_with_outcomes(horizon, [10.0, 20.0, 30.0])
}

/// Outcomes one row short of the index.
pub(crate) fn corrupted_parts(horizon: Horizon) -> CatalogParts {
    let mut parts = tiny_parts(horizon);
    parts.outcomes = Matrix::new(2, 1, vec![10.0, 20.0]);
    parts
}

/// Loader over in-memory parts that can be replaced between loads.
#[derive(Default)]
pub(crate) struct MemoryLoader {
    parts: Mutex<HashMap<Horizon, CatalogParts>>,
    loads: AtomicUsize,
}

impl MemoryLoader {
    pub(crate) fn with(entries: impl IntoIterator<Item = (Horizon, CatalogParts)>) -> Arc<Self> {
        let loader = Self::default();
        loader.parts.lock().extend(entries);
        Arc::new(loader)
    }

    pub(crate) fn put(&self, horizon: Horizon, parts: CatalogParts) {
        self.parts.lock().insert(horizon, parts);
    }

    /// Number of `load` calls so far.
    pub(crate) fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn get(&self, horizon: Horizon) -> ForecastResult<CatalogParts> {
        self.parts
            .lock()
            .get(&horizon)
            .cloned()
            .ok_or_else(|| ForecastError::IndexUnavailable {
                horizon,
                reason: "no artifacts".into(),
            })
    }
}

impl CatalogLoader for MemoryLoader {
    fn load(&self, horizon: Horizon) -> ForecastResult<Catalog> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Catalog::new(horizon, self.get(horizon)?, expectations())
    }

    fn inspect(&self, horizon: Horizon) -> ForecastResult<IntegrityReport> {
        Ok(inspect(&self.get(horizon)?, horizon, &expectations()))
    }
}
