//! Latency bound for blocking index searches.

use std::time::Duration;

use tracing::warn;

use crate::error::{ForecastError, ForecastResult};
use crate::types::Horizon;

/// Run blocking `work` on the blocking pool, bounded by `timeout_ms`.
///
/// On timeout the caller gets `Timeout` right away. The blocking task runs
/// to completion in the background and its result is dropped; the horizon
/// itself is unaffected.
///
/// # Errors
///
/// - `Timeout` when the bound is exceeded
/// - `Internal` when the task panicked or was cancelled
/// - whatever `work` returns
pub async fn run_with_deadline<T, F>(
    horizon: Horizon,
    timeout_ms: u64,
    work: F,
) -> ForecastResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ForecastResult<T> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(work);
    match tokio::time::timeout(Duration::from_millis(timeout_ms), handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(ForecastError::Internal(format!(
            "search task for horizon {} failed: {}",
            horizon, e
        ))),
        Err(_) => {
            warn!(horizon = %horizon, timeout_ms, "search exceeded its deadline");
            Err(ForecastError::Timeout {
                horizon,
                timeout_ms,
            })
        }
    }
}
