//! Exact exhaustive inner-product index.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::search_result::{select_top_k, SearchHit};
use super::dot;

/// Flat index storing every vector uncompressed.
///
/// Exact, O(N·D) per query. Meant for small catalogs and for validating the
/// approximate index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    /// Row-major `ntotal * dimension` values.
    vectors: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty flat index.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Create from row-major vectors. Trailing partial rows are kept so that
    /// load-time validation can report them instead of hiding them.
    pub fn from_vectors(dimension: usize, vectors: Vec<f32>) -> Self {
        Self { dimension, vectors }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of complete vectors stored.
    #[inline]
    pub fn ntotal(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.vectors.len() / self.dimension
        }
    }

    /// Length of the raw storage, for structural checks.
    #[inline]
    pub(crate) fn raw_len(&self) -> usize {
        self.vectors.len()
    }

    /// Append row-major vectors. Row ids are assigned sequentially.
    pub fn add(&mut self, vectors: &[f32]) {
        self.vectors.extend_from_slice(vectors);
    }

    /// Exact top-k by inner product.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        if self.dimension == 0 || k == 0 {
            return Vec::new();
        }
        let scores: Vec<(usize, f32)> = self
            .vectors
            .par_chunks_exact(self.dimension)
            .enumerate()
            .map(|(row, v)| (row, dot(query, v)))
            .collect();
        select_top_k(scores, k)
    }
}
