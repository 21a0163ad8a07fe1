//! Nearest-neighbor index over catalog embeddings.
//!
//! # Architecture
//!
//! ```text
//! flat.rs          - exact exhaustive inner-product index
//! ivf_pq.rs        - inverted file + product quantization (approximate)
//! search_result.rs - SearchHit / Analog types and top-k selection
//! ```
//!
//! [`VectorIndex`] is a closed set of strategies behind one `search`
//! capability. The strategy is fixed when a catalog is loaded; nothing
//! downstream of `search` knows which one is active.
//!
//! Scores are inner products. Catalog vectors and queries must both be unit
//! length for scores to mean cosine similarity.

mod flat;
mod ivf_pq;
pub mod search_result;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};
use crate::types::Horizon;

pub use flat::FlatIndex;
pub use ivf_pq::{InvertedList, IvfPqIndex, IvfPqParams};
pub use search_result::{select_top_k, Analog, SearchHit};

/// Index strategy tag recorded in catalog manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Flat,
    IvfPq,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Flat => f.write_str("flat"),
            IndexKind::IvfPq => f.write_str("ivf_pq"),
        }
    }
}

/// Vector index for one horizon's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VectorIndex {
    Flat(FlatIndex),
    IvfPq(IvfPqIndex),
}

impl VectorIndex {
    #[inline]
    pub fn kind(&self) -> IndexKind {
        match self {
            VectorIndex::Flat(_) => IndexKind::Flat,
            VectorIndex::IvfPq(_) => IndexKind::IvfPq,
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        match self {
            VectorIndex::Flat(idx) => idx.dimension(),
            VectorIndex::IvfPq(idx) => idx.dimension(),
        }
    }

    /// Number of indexed vectors.
    pub fn ntotal(&self) -> usize {
        match self {
            VectorIndex::Flat(idx) => idx.ntotal(),
            VectorIndex::IvfPq(idx) => idx.ntotal(),
        }
    }

    /// Override the IVF probe count. No-op for flat indexes.
    pub fn set_nprobe(&mut self, nprobe: usize) {
        if let VectorIndex::IvfPq(idx) = self {
            idx.set_nprobe(nprobe);
        }
    }

    /// Top-k rows by decreasing similarity.
    ///
    /// At most `k` hits, no duplicate rows, ties broken by ascending row.
    ///
    /// # Errors
    ///
    /// `InvalidQuery` if the query length differs from the index dimension.
    pub fn search(&self, query: &[f32], k: usize) -> ForecastResult<Vec<SearchHit>> {
        let dim = self.dimension();
        if query.len() != dim {
            return Err(ForecastError::invalid_query(
                "query dimension differs from index dimension",
                dim,
                query.len(),
            ));
        }
        let hits = match self {
            VectorIndex::Flat(idx) => idx.search(query, k),
            VectorIndex::IvfPq(idx) => idx.search(query, k),
        };
        Ok(hits)
    }

    /// Check internal consistency and that every row id is below `rows`.
    ///
    /// # Errors
    ///
    /// The first defect found, as `StructuralMismatch`.
    pub fn check_structure(&self, horizon: Horizon, rows: usize) -> ForecastResult<()> {
        let defects = self.structural_defects(rows);
        match defects.into_iter().next() {
            None => Ok(()),
            Some((what, expected, found)) => {
                Err(ForecastError::mismatch(horizon, what, expected, found))
            }
        }
    }

    /// All structural defects as `(what, expected, found)`.
    pub(crate) fn structural_defects(&self, rows: usize) -> Vec<(String, String, String)> {
        match self {
            VectorIndex::Flat(idx) => {
                let mut defects = Vec::new();
                if idx.dimension() == 0 {
                    defects.push(("flat index dimension".into(), "> 0".into(), "0".into()));
                } else if idx.raw_len() % idx.dimension() != 0 {
                    defects.push((
                        "flat index vectors".into(),
                        format!("multiple of {}", idx.dimension()),
                        idx.raw_len().to_string(),
                    ));
                }
                defects
            }
            VectorIndex::IvfPq(idx) => idx.structural_defects(rows),
        }
    }
}

/// Inner product of two equal-length slices.
#[inline]
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale `v` to unit L2 norm in place. Returns the original norm.
pub fn l2_normalize(v: &mut [f32]) -> f32 {
    let norm = dot(v, v).sqrt();
    if norm > 0.0 && norm.is_finite() {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    norm
}
