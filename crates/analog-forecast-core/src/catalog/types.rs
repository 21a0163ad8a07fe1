//! Catalog data types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::manifest::CatalogManifest;
use super::validation::{inspect, CheckStatus, IntegrityReport};
use crate::error::{ForecastError, ForecastResult};
use crate::index::{SearchHit, VectorIndex};
use crate::types::{Horizon, Variable};

/// Dense row-major f32 matrix as persisted in `embeddings.bin` / `outcomes.bin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    /// `rows * cols` values. Checked at load time, never assumed.
    pub data: Vec<f32>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Self {
        Self { rows, cols, data }
    }

    /// True when the buffer length agrees with the declared shape.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.rows.checked_mul(self.cols) == Some(self.data.len())
    }

    /// Row slice. Panics on out-of-range rows; callers index with validated ids.
    #[inline]
    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }
}

/// Shape every catalog must agree on, bound once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogExpectations {
    pub dimension: usize,
    /// Ordered outcome columns.
    pub variables: Vec<Variable>,
}

/// Unvalidated catalog artifacts, exactly as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogParts {
    pub manifest: CatalogManifest,
    pub embeddings: Matrix,
    pub outcomes: Matrix,
    pub index: VectorIndex,
}

impl CatalogParts {
    /// Assemble parts and derive the manifest from them.
    ///
    /// Used by tooling that produces artifacts; the manifest row count is
    /// taken from the embeddings.
    pub fn from_matrices(
        horizon: Horizon,
        embeddings: Matrix,
        outcomes: Matrix,
        variables: Vec<Variable>,
        index: VectorIndex,
    ) -> Self {
        let manifest = CatalogManifest::new(
            horizon,
            embeddings.cols,
            embeddings.rows,
            variables,
            index.kind(),
        );
        Self {
            manifest,
            embeddings,
            outcomes,
            index,
        }
    }
}

/// Validated, immutable per-horizon catalog.
///
/// Rows of `embeddings`, `outcomes` and the index ids are aligned 1:1.
/// Shared read-only across requests once constructed.
#[derive(Debug)]
pub struct Catalog {
    horizon: Horizon,
    parts: CatalogParts,
    expectations: CatalogExpectations,
    columns: HashMap<Variable, usize>,
}

impl Catalog {
    /// Validate parts and build a catalog. Fails closed.
    ///
    /// # Errors
    ///
    /// `StructuralMismatch` for the first failing check. Warnings (for
    /// example non-unit embedding norms) are logged and tolerated.
    pub fn new(
        horizon: Horizon,
        parts: CatalogParts,
        expectations: CatalogExpectations,
    ) -> ForecastResult<Self> {
        let report = inspect(&parts, horizon, &expectations);
        if let Some(err) = report.first_failure() {
            return Err(err);
        }
        for check in report.checks.iter().filter(|c| c.status == CheckStatus::Warn) {
            warn!(
                horizon = %horizon,
                check = %check.name,
                expected = %check.expected,
                found = %check.found,
                "catalog check produced a warning"
            );
        }

        let columns = parts
            .manifest
            .variables
            .iter()
            .enumerate()
            .map(|(col, v)| (*v, col))
            .collect();

        Ok(Self {
            horizon,
            parts,
            expectations,
            columns,
        })
    }

    #[inline]
    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Number of historical rows (N).
    #[inline]
    pub fn rows(&self) -> usize {
        self.parts.manifest.rows
    }

    /// Embedding dimension (D).
    #[inline]
    pub fn dimension(&self) -> usize {
        self.parts.manifest.dimension
    }

    /// Outcome columns in order.
    pub fn variables(&self) -> &[Variable] {
        &self.parts.manifest.variables
    }

    pub fn manifest(&self) -> &CatalogManifest {
        &self.parts.manifest
    }

    pub fn index(&self) -> &VectorIndex {
        &self.parts.index
    }

    pub fn parts(&self) -> &CatalogParts {
        &self.parts
    }

    /// Column of `variable` in the outcome matrix, if the catalog carries it.
    #[inline]
    pub fn column_of(&self, variable: Variable) -> Option<usize> {
        self.columns.get(&variable).copied()
    }

    /// Outcome row aligned with embedding row `row`.
    ///
    /// # Errors
    ///
    /// `Internal` if `row` is out of range, which means the index returned
    /// an id the load-time checks should have rejected.
    pub fn outcome_row(&self, row: usize) -> ForecastResult<&[f32]> {
        if row >= self.rows() {
            return Err(ForecastError::Internal(format!(
                "row {} out of range for {} catalog with {} rows",
                row,
                self.horizon,
                self.rows()
            )));
        }
        Ok(self.parts.outcomes.row(row))
    }

    /// Top-k analog rows for a unit query.
    pub fn search(&self, query: &[f32], k: usize) -> ForecastResult<Vec<SearchHit>> {
        self.parts.index.search(query, k)
    }

    /// Re-run the structural checks on the loaded artifacts. Read-only.
    pub fn integrity_report(&self) -> IntegrityReport {
        inspect(&self.parts, self.horizon, &self.expectations)
    }
}
