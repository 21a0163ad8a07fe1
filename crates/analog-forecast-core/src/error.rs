//! Error types for analog forecasting.
//!
//! Every failure carries enough context (horizon, expected vs found counts)
//! for an operator to locate the offending artifact or request. Sanitising
//! these messages for external callers happens outside this crate.
//!
//! # Scope of failures
//!
//! - Per horizon: [`ForecastError::IndexUnavailable`],
//!   [`ForecastError::StructuralMismatch`]. They never affect other horizons.
//! - Per request: [`ForecastError::InsufficientAnalogs`],
//!   [`ForecastError::Timeout`]. The orchestrator degrades the affected
//!   variables to `available: false` instead of failing the request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Horizon;

/// Result type alias for forecasting operations.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Closed, serialisable failure category.
///
/// This is what a caller branches on; the full [`ForecastError`] stays
/// with the operator logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    IndexUnavailable,
    InsufficientAnalogs,
    InvalidQuery,
    Timeout,
    StructuralMismatch,
    InvalidRequest,
    Internal,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::IndexUnavailable => "index_unavailable",
            FailureKind::InsufficientAnalogs => "insufficient_analogs",
            FailureKind::InvalidQuery => "invalid_query",
            FailureKind::Timeout => "timeout",
            FailureKind::StructuralMismatch => "structural_mismatch",
            FailureKind::InvalidRequest => "invalid_request",
            FailureKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Comprehensive error type for the forecasting engine.
#[derive(Error, Debug)]
pub enum ForecastError {
    // ========== Horizon-scoped Errors ==========
    /// Catalog missing, failed to load, or previously failed.
    #[error("Index unavailable for horizon {horizon}: {reason}")]
    IndexUnavailable { horizon: Horizon, reason: String },

    /// Catalog artifacts disagree with each other or with configuration.
    #[error(
        "Structural mismatch in {artifact} for horizon {horizon}: expected {expected}, found {found}"
    )]
    StructuralMismatch {
        horizon: Horizon,
        artifact: String,
        expected: String,
        found: String,
    },

    // ========== Request-scoped Errors ==========
    /// Search returned no analogs.
    #[error("Insufficient analogs for horizon {horizon}: search returned 0 of k={k}")]
    InsufficientAnalogs { horizon: Horizon, k: usize },

    /// Query vector has the wrong dimension, non-finite values, or zero norm.
    #[error("Invalid query: {reason} (expected {expected}, found {found})")]
    InvalidQuery {
        reason: String,
        expected: String,
        found: String,
    },

    /// Index search exceeded its latency bound.
    #[error("Search timed out for horizon {horizon} after {timeout_ms}ms")]
    Timeout { horizon: Horizon, timeout_ms: u64 },

    /// Request failed boundary validation (horizon or variable whitelist, cardinality).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ========== Configuration Errors ==========
    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========== Serialization Errors ==========
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ========== Internal Errors ==========
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForecastError {
    /// Build a [`ForecastError::StructuralMismatch`] from displayable counts.
    pub fn mismatch(
        horizon: Horizon,
        artifact: impl Into<String>,
        expected: impl std::fmt::Display,
        found: impl std::fmt::Display,
    ) -> Self {
        ForecastError::StructuralMismatch {
            horizon,
            artifact: artifact.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Build a [`ForecastError::InvalidQuery`].
    pub fn invalid_query(
        reason: impl Into<String>,
        expected: impl std::fmt::Display,
        found: impl std::fmt::Display,
    ) -> Self {
        ForecastError::InvalidQuery {
            reason: reason.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Failure category exposed to callers.
    pub fn kind(&self) -> FailureKind {
        match self {
            ForecastError::IndexUnavailable { .. } => FailureKind::IndexUnavailable,
            ForecastError::StructuralMismatch { .. } => FailureKind::StructuralMismatch,
            ForecastError::InsufficientAnalogs { .. } => FailureKind::InsufficientAnalogs,
            ForecastError::InvalidQuery { .. } => FailureKind::InvalidQuery,
            ForecastError::Timeout { .. } => FailureKind::Timeout,
            ForecastError::InvalidRequest(_) | ForecastError::InvalidConfig(_) => {
                FailureKind::InvalidRequest
            }
            ForecastError::Serialization(_)
            | ForecastError::Deserialization(_)
            | ForecastError::Internal(_)
            | ForecastError::Io(_) => FailureKind::Internal,
        }
    }

    /// True when the error is fatal for a horizon rather than a single request.
    pub fn is_horizon_scoped(&self) -> bool {
        matches!(
            self,
            ForecastError::IndexUnavailable { .. } | ForecastError::StructuralMismatch { .. }
        )
    }
}

// ========== Error Conversions ==========

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Deserialization(err.to_string())
    }
}

impl From<bincode::Error> for ForecastError {
    fn from(err: bincode::Error) -> Self {
        ForecastError::Deserialization(err.to_string())
    }
}

impl From<config::ConfigError> for ForecastError {
    fn from(err: config::ConfigError) -> Self {
        ForecastError::InvalidConfig(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::InvalidConfig(err.to_string())
    }
}

static_assertions::assert_impl_all!(ForecastError: Send, Sync, std::error::Error);
