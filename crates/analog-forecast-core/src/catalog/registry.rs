//! Per-horizon catalog cache with an explicit load state machine.
//!
//! ```text
//! UNLOADED --acquire--> LOADING --ok--> READY
//!                          |
//!                          +--err or panic--> FAILED   (cached, fails fast)
//!
//! reset: any state -> UNLOADED
//! swap:  any state -> READY (new catalog published atomically)
//! ```
//!
//! The state lives in an `AtomicU8`; `UNLOADED -> LOADING` is a
//! compare-and-swap taken under the slot's load guard, so exactly one caller
//! loads while others for the same horizon wait on the guard. Other horizons
//! are never blocked.
//!
//! The catalog itself is published through `ArcSwapOption`. Readers take an
//! `Arc<Catalog>` snapshot without locking and keep using it even if a swap
//! happens mid-request.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::loader::CatalogLoader;
use super::types::Catalog;
use crate::error::{ForecastError, ForecastResult};
use crate::types::Horizon;

/// Load state of one horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HorizonState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

impl HorizonState {
    const UNLOADED: u8 = 0;
    const LOADING: u8 = 1;
    const READY: u8 = 2;
    const FAILED: u8 = 3;

    fn from_u8(raw: u8) -> Self {
        match raw {
            Self::LOADING => HorizonState::Loading,
            Self::READY => HorizonState::Ready,
            Self::FAILED => HorizonState::Failed,
            _ => HorizonState::Unloaded,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            HorizonState::Unloaded => Self::UNLOADED,
            HorizonState::Loading => Self::LOADING,
            HorizonState::Ready => Self::READY,
            HorizonState::Failed => Self::FAILED,
        }
    }
}

impl fmt::Display for HorizonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HorizonState::Unloaded => "UNLOADED",
            HorizonState::Loading => "LOADING",
            HorizonState::Ready => "READY",
            HorizonState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

struct HorizonSlot {
    state: AtomicU8,
    catalog: ArcSwapOption<Catalog>,
    /// Reason of the last load failure, reported on fail-fast.
    failure: Mutex<Option<String>>,
    /// Serialises loads, resets and swaps for this horizon.
    load_guard: Mutex<()>,
}

impl HorizonSlot {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(HorizonState::UNLOADED),
            catalog: ArcSwapOption::empty(),
            failure: Mutex::new(None),
            load_guard: Mutex::new(()),
        }
    }

    #[inline]
    fn state(&self) -> HorizonState {
        HorizonState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    fn set_state(&self, state: HorizonState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    fn failed_error(&self, horizon: Horizon) -> ForecastError {
        let reason = self
            .failure
            .lock()
            .clone()
            .unwrap_or_else(|| "previous load failed".to_string());
        ForecastError::IndexUnavailable {
            horizon,
            reason: format!("horizon is FAILED: {}", reason),
        }
    }

    /// Ready catalog without blocking, or the cached failure.
    fn ready(&self, horizon: Horizon) -> Option<ForecastResult<Arc<Catalog>>> {
        match self.state() {
            HorizonState::Ready => self.catalog.load_full().map(Ok),
            HorizonState::Failed => Some(Err(self.failed_error(horizon))),
            HorizonState::Unloaded | HorizonState::Loading => None,
        }
    }
}

/// Owns every horizon's catalog for the lifetime of the orchestrator.
pub struct CatalogRegistry {
    loader: Arc<dyn CatalogLoader>,
    slots: HashMap<Horizon, HorizonSlot>,
}

impl CatalogRegistry {
    /// Create a registry serving `horizons`, all `UNLOADED`.
    pub fn new(loader: Arc<dyn CatalogLoader>, horizons: &[Horizon]) -> Self {
        let slots = horizons.iter().map(|h| (*h, HorizonSlot::new())).collect();
        Self { loader, slots }
    }

    pub fn loader(&self) -> &Arc<dyn CatalogLoader> {
        &self.loader
    }

    /// Horizons this registry serves, shortest first.
    pub fn horizons(&self) -> Vec<Horizon> {
        let mut horizons: Vec<_> = self.slots.keys().copied().collect();
        horizons.sort();
        horizons
    }

    fn slot(&self, horizon: Horizon) -> ForecastResult<&HorizonSlot> {
        self.slots
            .get(&horizon)
            .ok_or_else(|| ForecastError::IndexUnavailable {
                horizon,
                reason: "horizon is not served by this registry".to_string(),
            })
    }

    /// Current state, `None` for horizons not served.
    pub fn state(&self, horizon: Horizon) -> Option<HorizonState> {
        self.slots.get(&horizon).map(HorizonSlot::state)
    }

    /// `(horizon, state)` for every served horizon.
    pub fn status(&self) -> Vec<(Horizon, HorizonState)> {
        self.horizons()
            .into_iter()
            .filter_map(|h| self.state(h).map(|s| (h, s)))
            .collect()
    }

    /// Last load failure message of a `FAILED` horizon.
    pub fn failure_reason(&self, horizon: Horizon) -> Option<String> {
        self.slots.get(&horizon).and_then(|s| s.failure.lock().clone())
    }

    /// Non-blocking lookup: `Some` when the horizon is `READY` or `FAILED`.
    pub fn try_ready(&self, horizon: Horizon) -> Option<ForecastResult<Arc<Catalog>>> {
        match self.slot(horizon) {
            Ok(slot) => slot.ready(horizon),
            Err(e) => Some(Err(e)),
        }
    }

    /// Current catalog snapshot without triggering a load.
    pub fn snapshot(&self, horizon: Horizon) -> Option<Arc<Catalog>> {
        self.slots.get(&horizon).and_then(|s| s.catalog.load_full())
    }

    /// Catalog for `horizon`, loading it on first access.
    ///
    /// Blocks while another caller loads the same horizon.
    ///
    /// # Errors
    ///
    /// - The loader's error (for example `StructuralMismatch`) on the call
    ///   that performs a failing load
    /// - `IndexUnavailable` for unserved horizons and, without retrying,
    ///   for horizons already `FAILED`
    pub fn acquire(&self, horizon: Horizon) -> ForecastResult<Arc<Catalog>> {
        let slot = self.slot(horizon)?;
        if let Some(ready) = slot.ready(horizon) {
            return ready;
        }

        let _guard = slot.load_guard.lock();
        if let Some(ready) = slot.ready(horizon) {
            return ready;
        }

        slot.state
            .compare_exchange(
                HorizonState::UNLOADED,
                HorizonState::LOADING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|raw| {
                ForecastError::Internal(format!(
                    "horizon {} in state {} while holding its load guard",
                    horizon,
                    HorizonState::from_u8(raw)
                ))
            })?;

        let started = Instant::now();
        match self.load_catching_panics(horizon) {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                slot.catalog.store(Some(Arc::clone(&catalog)));
                *slot.failure.lock() = None;
                slot.set_state(HorizonState::Ready);
                info!(
                    horizon = %horizon,
                    rows = catalog.rows(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "horizon READY"
                );
                Ok(catalog)
            }
            Err(e) => {
                slot.catalog.store(None);
                *slot.failure.lock() = Some(e.to_string());
                slot.set_state(HorizonState::Failed);
                error!(
                    horizon = %horizon,
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "horizon FAILED"
                );
                Err(e)
            }
        }
    }

    /// Run the loader, turning a panic into `Internal` so the slot never
    /// stays `LOADING`.
    fn load_catching_panics(&self, horizon: Horizon) -> ForecastResult<Catalog> {
        panic::catch_unwind(AssertUnwindSafe(|| self.loader.load(horizon))).unwrap_or_else(
            |payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic payload".to_string());
                Err(ForecastError::Internal(format!(
                    "catalog loader panicked for horizon {}: {}",
                    horizon, message
                )))
            },
        )
    }

    /// Force the next `acquire` to load again. Returns the previous state.
    ///
    /// A `READY` catalog stops being served to new requests; requests holding
    /// a snapshot finish on it.
    pub fn reset(&self, horizon: Horizon) -> ForecastResult<HorizonState> {
        let slot = self.slot(horizon)?;
        let _guard = slot.load_guard.lock();
        let previous = slot.state();
        slot.catalog.store(None);
        *slot.failure.lock() = None;
        slot.set_state(HorizonState::Unloaded);
        info!(horizon = %horizon, previous = %previous, "horizon reset to UNLOADED");
        Ok(previous)
    }

    /// Publish `catalog` atomically, whatever the current state.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` if the catalog belongs to another horizon.
    pub fn swap(&self, horizon: Horizon, catalog: Catalog) -> ForecastResult<Option<Arc<Catalog>>> {
        if catalog.horizon() != horizon {
            return Err(ForecastError::InvalidRequest(format!(
                "cannot install a {} catalog into horizon {}",
                catalog.horizon(),
                horizon
            )));
        }
        let slot = self.slot(horizon)?;
        let _guard = slot.load_guard.lock();
        let rows = catalog.rows();
        let previous = slot.catalog.swap(Some(Arc::new(catalog)));
        *slot.failure.lock() = None;
        slot.set_state(HorizonState::Ready);
        info!(horizon = %horizon, rows, "catalog swapped in");
        Ok(previous)
    }

    /// Load fresh artifacts and swap them in.
    ///
    /// On failure a `READY` horizon keeps serving its current catalog; any
    /// other horizon becomes `FAILED`.
    pub fn reload(&self, horizon: Horizon) -> ForecastResult<Arc<Catalog>> {
        let slot = self.slot(horizon)?;
        match self.load_catching_panics(horizon) {
            Ok(catalog) => {
                self.swap(horizon, catalog)?;
                slot.catalog.load_full().ok_or_else(|| {
                    ForecastError::Internal(format!("horizon {} empty after swap", horizon))
                })
            }
            Err(e) => {
                let _guard = slot.load_guard.lock();
                if slot.state() == HorizonState::Ready {
                    warn!(
                        horizon = %horizon,
                        error = %e,
                        "reload failed, keeping current catalog"
                    );
                } else {
                    slot.catalog.store(None);
                    *slot.failure.lock() = Some(e.to_string());
                    slot.set_state(HorizonState::Failed);
                    error!(horizon = %horizon, error = %e, "reload failed, horizon FAILED");
                }
                Err(e)
            }
        }
    }
}

impl fmt::Debug for CatalogRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogRegistry")
            .field("status", &self.status())
            .finish()
    }
}
