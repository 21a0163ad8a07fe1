//! Inverted-file index with product-quantized residuals (IVF-PQ).
//!
//! Vectors are assigned to one of `nlist` coarse centroids; the residual
//! `x - centroid` is split into `m` segments and each segment is replaced by
//! the id of its nearest codeword (`2^nbits` codewords per segment).
//!
//! Scoring uses asymmetric distance tables. Inner product is linear, so
//!
//! ```text
//! <q, c + r^> = <q, c> + sum_s <q_s, codeword_s[code_s]>
//! ```
//!
//! and the per-segment tables do not depend on the probed list.
//!
//! Centroids and codebooks are trained offline; this type only loads them,
//! encodes vectors against them and searches.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::dot;
use super::search_result::{select_top_k, SearchHit};
use crate::error::{ForecastError, ForecastResult};

/// Shape parameters of an IVF-PQ index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IvfPqParams {
    /// Vector dimension. Must be divisible by `m`.
    pub dimension: usize,
    /// Number of inverted lists (coarse centroids).
    pub nlist: usize,
    /// Number of product-quantization segments.
    pub m: usize,
    /// Bits per code, 1..=8.
    pub nbits: u8,
    /// Lists probed per query.
    pub nprobe: usize,
}

impl IvfPqParams {
    /// Codewords per segment.
    #[inline]
    pub fn ksub(&self) -> usize {
        1usize << self.nbits
    }

    /// Dimensions per segment.
    #[inline]
    pub fn dsub(&self) -> usize {
        self.dimension / self.m
    }

    /// FAISS-style factory description, e.g. `"IVF1024,PQ32x8"`.
    pub fn factory_string(&self) -> String {
        format!("IVF{},PQ{}x{}", self.nlist, self.m, self.nbits)
    }

    fn validate(&self) -> Result<(), String> {
        if self.dimension == 0 {
            return Err("dimension must be > 0".into());
        }
        if self.nlist == 0 {
            return Err("nlist must be > 0".into());
        }
        if self.m == 0 {
            return Err("m must be > 0".into());
        }
        if self.dimension % self.m != 0 {
            return Err(format!(
                "m ({}) must divide dimension ({}) evenly",
                self.m, self.dimension
            ));
        }
        if self.nbits == 0 || self.nbits > 8 {
            return Err(format!("nbits must be in 1..=8, got {}", self.nbits));
        }
        if self.nprobe == 0 {
            return Err("nprobe must be > 0".into());
        }
        Ok(())
    }
}

/// One inverted list: row ids and their `m`-byte codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvertedList {
    pub ids: Vec<u64>,
    /// `ids.len() * m` codes, row-major.
    pub codes: Vec<u8>,
}

/// Approximate compressed index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvfPqIndex {
    params: IvfPqParams,
    /// `nlist * dimension` values.
    coarse_centroids: Vec<f32>,
    /// `m * ksub * dsub` values, segment-major.
    codebooks: Vec<f32>,
    lists: Vec<InvertedList>,
}

impl IvfPqIndex {
    /// Create an empty index from pre-trained quantizers.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the parameters are inconsistent or the centroid /
    /// codebook buffers have the wrong length.
    pub fn new(
        params: IvfPqParams,
        coarse_centroids: Vec<f32>,
        codebooks: Vec<f32>,
    ) -> ForecastResult<Self> {
        params.validate().map_err(ForecastError::InvalidConfig)?;

        let expected_centroids = params.nlist * params.dimension;
        if coarse_centroids.len() != expected_centroids {
            return Err(ForecastError::InvalidConfig(format!(
                "coarse centroids: expected {} values, got {}",
                expected_centroids,
                coarse_centroids.len()
            )));
        }
        let expected_codebooks = params.m * params.ksub() * params.dsub();
        if codebooks.len() != expected_codebooks {
            return Err(ForecastError::InvalidConfig(format!(
                "codebooks: expected {} values, got {}",
                expected_codebooks,
                codebooks.len()
            )));
        }

        Ok(Self {
            lists: vec![InvertedList::default(); params.nlist],
            params,
            coarse_centroids,
            codebooks,
        })
    }

    #[inline]
    pub fn params(&self) -> &IvfPqParams {
        &self.params
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.params.dimension
    }

    /// Total vectors across all inverted lists.
    pub fn ntotal(&self) -> usize {
        self.lists.iter().map(|l| l.ids.len()).sum()
    }

    pub fn lists(&self) -> &[InvertedList] {
        &self.lists
    }

    /// Set the number of probed lists, clamped to `[1, nlist]`.
    pub fn set_nprobe(&mut self, nprobe: usize) {
        self.params.nprobe = nprobe.min(self.params.nlist).max(1);
    }

    /// Encode and add vectors with explicit row ids.
    ///
    /// # Errors
    ///
    /// - `InvalidQuery` if `vectors.len()` is not a multiple of the dimension
    /// - `InvalidConfig` if the vector count differs from the id count
    pub fn add_with_ids(&mut self, vectors: &[f32], ids: &[u64]) -> ForecastResult<()> {
        let dim = self.params.dimension;
        let remainder = vectors.len() % dim;
        if remainder != 0 {
            return Err(ForecastError::invalid_query(
                "vector buffer is not a multiple of the dimension",
                dim,
                remainder,
            ));
        }
        let n_vectors = vectors.len() / dim;
        if n_vectors != ids.len() {
            return Err(ForecastError::InvalidConfig(format!(
                "Vector count ({}) doesn't match ID count ({})",
                n_vectors,
                ids.len()
            )));
        }

        let mut residual = vec![0.0f32; dim];
        for (v, &id) in vectors.chunks_exact(dim).zip(ids) {
            let list = self.assign(v);
            let centroid = self.centroid(list);
            for ((r, x), c) in residual.iter_mut().zip(v).zip(centroid) {
                *r = x - c;
            }
            let codes = self.encode_residual(&residual);
            let target = &mut self.lists[list];
            target.ids.push(id);
            target.codes.extend_from_slice(&codes);
        }
        Ok(())
    }

    /// Approximate top-k by inner product over the `nprobe` best lists.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        if k == 0 {
            return Vec::new();
        }
        let m = self.params.m;
        let ksub = self.params.ksub();

        let coarse: Vec<(usize, f32)> = (0..self.params.nlist)
            .map(|j| (j, dot(query, self.centroid(j))))
            .collect();
        let probed = select_top_k(coarse, self.params.nprobe);

        let table = self.inner_product_table(query);

        let mut candidates = Vec::new();
        for list_hit in probed {
            let list = &self.lists[list_hit.row];
            for (id, codes) in list.ids.iter().zip(list.codes.chunks_exact(m)) {
                let residual_score: f32 = codes
                    .iter()
                    .enumerate()
                    .map(|(s, &c)| table[s * ksub + c as usize])
                    .sum();
                candidates.push((*id as usize, list_hit.score + residual_score));
            }
        }
        select_top_k(candidates, k)
    }

    /// Structural problems as `(what, expected, found)`, empty when sound.
    pub(crate) fn structural_defects(&self, ntotal_bound: usize) -> Vec<(String, String, String)> {
        let mut defects = Vec::new();
        if let Err(e) = self.params.validate() {
            defects.push(("ivf_pq params".to_string(), "valid parameters".to_string(), e));
            return defects;
        }
        if self.lists.len() != self.params.nlist {
            defects.push((
                "ivf_pq inverted lists".to_string(),
                self.params.nlist.to_string(),
                self.lists.len().to_string(),
            ));
        }
        let expected_centroids = self.params.nlist * self.params.dimension;
        if self.coarse_centroids.len() != expected_centroids {
            defects.push((
                "ivf_pq coarse centroids".to_string(),
                expected_centroids.to_string(),
                self.coarse_centroids.len().to_string(),
            ));
        }
        let expected_codebooks = self.params.m * self.params.ksub() * self.params.dsub();
        if self.codebooks.len() != expected_codebooks {
            defects.push((
                "ivf_pq codebooks".to_string(),
                expected_codebooks.to_string(),
                self.codebooks.len().to_string(),
            ));
        }

        // Sized by the ids actually stored; `ntotal_bound` comes from the manifest.
        let mut seen = HashSet::with_capacity(self.ntotal());
        for (j, list) in self.lists.iter().enumerate() {
            if list.codes.len() != list.ids.len() * self.params.m {
                defects.push((
                    format!("ivf_pq list {} codes", j),
                    (list.ids.len() * self.params.m).to_string(),
                    list.codes.len().to_string(),
                ));
            }
            let ksub = self.params.ksub();
            if let Some(&code) = list.codes.iter().find(|&&c| c as usize >= ksub) {
                defects.push((
                    format!("ivf_pq list {} codes", j),
                    format!("codes < {}", ksub),
                    format!("code {}", code),
                ));
            }
            for &id in &list.ids {
                if usize::try_from(id).map_or(true, |row| row >= ntotal_bound) {
                    defects.push((
                        format!("ivf_pq list {} ids", j),
                        format!("ids < {}", ntotal_bound),
                        format!("id {}", id),
                    ));
                } else if !seen.insert(id) {
                    defects.push((
                        format!("ivf_pq list {} ids", j),
                        "unique row ids".to_string(),
                        format!("duplicate id {}", id),
                    ));
                }
            }
        }
        defects
    }

    #[inline]
    fn centroid(&self, list: usize) -> &[f32] {
        let dim = self.params.dimension;
        &self.coarse_centroids[list * dim..(list + 1) * dim]
    }

    #[inline]
    fn codeword(&self, segment: usize, code: usize) -> &[f32] {
        let dsub = self.params.dsub();
        let start = (segment * self.params.ksub() + code) * dsub;
        &self.codebooks[start..start + dsub]
    }

    /// List with the highest centroid inner product, lowest id on ties.
    fn assign(&self, v: &[f32]) -> usize {
        let mut best = 0;
        let mut best_score = f32::NEG_INFINITY;
        for j in 0..self.params.nlist {
            let s = dot(v, self.centroid(j));
            if s > best_score {
                best = j;
                best_score = s;
            }
        }
        best
    }

    /// Nearest codeword (L2) per segment.
    fn encode_residual(&self, residual: &[f32]) -> Vec<u8> {
        let dsub = self.params.dsub();
        (0..self.params.m)
            .map(|s| {
                let sub = &residual[s * dsub..(s + 1) * dsub];
                let mut best = 0usize;
                let mut best_dist = f32::INFINITY;
                for c in 0..self.params.ksub() {
                    let d: f32 = sub
                        .iter()
                        .zip(self.codeword(s, c))
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum();
                    if d < best_dist {
                        best = c;
                        best_dist = d;
                    }
                }
                best as u8
            })
            .collect()
    }

    /// `table[s * ksub + c] = <q_s, codeword(s, c)>`.
    fn inner_product_table(&self, query: &[f32]) -> Vec<f32> {
        let dsub = self.params.dsub();
        let ksub = self.params.ksub();
        let mut table = Vec::with_capacity(self.params.m * ksub);
        for s in 0..self.params.m {
            let q_sub = &query[s * dsub..(s + 1) * dsub];
            for c in 0..ksub {
                table.push(dot(q_sub, self.codeword(s, c)));
            }
        }
        table
    }
}
