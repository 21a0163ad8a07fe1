//! Catalog manifest (`manifest.json`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::index::IndexKind;
use crate::types::{Horizon, Variable};

/// Artifact layout version understood by this crate.
pub const CATALOG_FORMAT_VERSION: u32 = 1;

/// Declared shape of a horizon's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogManifest {
    pub format_version: u32,
    pub horizon: Horizon,
    pub dimension: usize,
    pub rows: usize,
    /// Outcome column order.
    pub variables: Vec<Variable>,
    pub index_kind: IndexKind,
    /// When the producing pipeline built the artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_at: Option<DateTime<Utc>>,
}

impl CatalogManifest {
    pub fn new(
        horizon: Horizon,
        dimension: usize,
        rows: usize,
        variables: Vec<Variable>,
        index_kind: IndexKind,
    ) -> Self {
        Self {
            format_version: CATALOG_FORMAT_VERSION,
            horizon,
            dimension,
            rows,
            variables,
            index_kind,
            built_at: None,
        }
    }

    pub fn with_built_at(mut self, built_at: DateTime<Utc>) -> Self {
        self.built_at = Some(built_at);
        self
    }
}
