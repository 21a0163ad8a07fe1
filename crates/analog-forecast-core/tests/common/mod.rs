//! Shared fixtures for integration tests.
//!
//! Catalogs are written to real directories under a `TempDir` and read back
//! through the same code path production uses. Random catalogs come from a
//! seeded `ChaCha8Rng`, so every run sees identical data.

#![allow(dead_code)]

use std::path::Path;

use analog_forecast_core::catalog::persistence::{horizon_dir, write_parts};
use analog_forecast_core::index::l2_normalize;
use analog_forecast_core::{
    CatalogParts, FlatIndex, ForecastConfig, Horizon, IndexKind, IvfPqIndex, IvfPqParams, Matrix,
    Variable, VectorIndex,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::TempDir;

/// Config pointing at `root` with a small embedding dimension.
pub fn test_config(root: &Path, dimension: usize, variables: Vec<Variable>) -> ForecastConfig {
    let mut config = ForecastConfig::default_config();
    config.catalog.root = root.to_path_buf();
    config.catalog.dimension = dimension;
    config.catalog.variables = variables;
    config.search.timeout_ms = 10_000;
    config
}

/// Three unit rows in 2-D with temperature outcomes 10, 20, 30.
///
/// Row 0 is `[1, 0]`, row 1 is `[0.6, 0.8]`, row 2 is `[0, 1]`.
pub fn three_row_catalog(horizon: Horizon) -> CatalogParts {
    let vectors = vec![1.0, 0.0, 0.6, 0.8, 0.0, 1.0];
    CatalogParts::from_matrices(
        horizon,
        Matrix::new(3, 2, vectors.clone()),
        Matrix::new(3, 1, vec![10.0, 20.0, 30.0]),
        vec![Variable::Temperature2m],
        VectorIndex::Flat(FlatIndex::from_vectors(2, vectors)),
    )
}

/// `n` random unit vectors of length `dim`, row-major.
pub fn unit_rows(rng: &mut ChaCha8Rng, n: usize, dim: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(n * dim);
    for _ in 0..n {
        let mut row: Vec<f32> = (0..dim).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
        l2_normalize(&mut row);
        data.extend(row);
    }
    data
}

/// A random unit query.
pub fn unit_query(seed: u64, dim: usize) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    unit_rows(&mut rng, 1, dim)
}

/// Random catalog over the full variable vocabulary.
///
/// Outcomes are loosely tied to the first embedding component so that
/// nearby analogs have similar outcomes.
pub fn random_catalog(seed: u64, horizon: Horizon, n: usize, dim: usize, kind: IndexKind) -> CatalogParts {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let embeddings = unit_rows(&mut rng, n, dim);

    let variables = Variable::ALL.to_vec();
    let mut outcomes = Vec::with_capacity(n * variables.len());
    for row in embeddings.chunks_exact(dim) {
        for (j, _) in variables.iter().enumerate() {
            let noise: f32 = rng.gen_range(-1.0..1.0);
            outcomes.push(10.0 * row[0] + j as f32 + noise);
        }
    }

    let index = match kind {
        IndexKind::Flat => VectorIndex::Flat(FlatIndex::from_vectors(dim, embeddings.clone())),
        IndexKind::IvfPq => VectorIndex::IvfPq(ivf_pq_over(&embeddings, dim, 8, 4, 4, 8)),
    };

    CatalogParts::from_matrices(
        horizon,
        Matrix::new(n, dim, embeddings),
        Matrix::new(n, variables.len(), outcomes),
        variables,
        index,
    )
}

/// IVF-PQ index over `vectors` with quantizers sampled from the data.
///
/// Coarse centroids are evenly strided rows. Codewords are residuals of
/// strided rows against their centroid. No clustering is performed.
pub fn ivf_pq_over(
    vectors: &[f32],
    dim: usize,
    nlist: usize,
    m: usize,
    nbits: u8,
    nprobe: usize,
) -> IvfPqIndex {
    let n = vectors.len() / dim;
    let params = IvfPqParams {
        dimension: dim,
        nlist,
        m,
        nbits,
        nprobe,
    };
    let row = |i: usize| &vectors[i * dim..(i + 1) * dim];

    let stride = (n / nlist).max(1);
    let centroids: Vec<f32> = (0..nlist)
        .flat_map(|c| row((c * stride) % n.max(1)).to_vec())
        .collect();

    let nearest = |x: &[f32]| {
        (0..nlist)
            .map(|c| {
                let centroid = &centroids[c * dim..(c + 1) * dim];
                let ip: f32 = centroid.iter().zip(x).map(|(a, b)| a * b).sum();
                (c, ip)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(c, _)| c)
            .unwrap_or(0)
    };

    let ksub = params.ksub();
    let dsub = dim / m;
    let mut codebooks = vec![0.0f32; m * ksub * dsub];
    let sample_stride = (n / ksub).max(1);
    for j in 0..ksub.min(n) {
        let x = row((j * sample_stride) % n);
        let c = nearest(x);
        let residual: Vec<f32> = x
            .iter()
            .zip(&centroids[c * dim..(c + 1) * dim])
            .map(|(a, b)| a - b)
            .collect();
        for s in 0..m {
            let dst = (s * ksub + j) * dsub;
            codebooks[dst..dst + dsub].copy_from_slice(&residual[s * dsub..(s + 1) * dsub]);
        }
    }

    let mut index = IvfPqIndex::new(params, centroids, codebooks).expect("valid IVF-PQ params");
    let ids: Vec<u64> = (0..n as u64).collect();
    index.add_with_ids(vectors, &ids).expect("vectors match ids");
    index
}

/// Write `parts` under `root/<horizon>/`.
pub fn write_catalog(root: &Path, parts: &CatalogParts) {
    write_parts(&horizon_dir(root, parts.manifest.horizon), parts).expect("write catalog");
}

/// Fresh temp dir holding the given catalogs.
pub fn catalog_root(catalogs: &[CatalogParts]) -> TempDir {
    let temp = tempfile::tempdir().expect("temp dir");
    for parts in catalogs {
        write_catalog(temp.path(), parts);
    }
    temp
}
