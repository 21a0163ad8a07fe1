//! Catalog tests.


pub(super) use crate::test_utils::{corrupted_parts, expectations, tiny_parts, MemoryLoader};

use crate::catalog::CatalogParts;
use crate::index::{IndexKind, IvfPqIndex, IvfPqParams, VectorIndex};
use crate::types::Horizon;

/// The tiny catalog served by an IVF-PQ index. Both centroids sit at the
/// origin, so every row lands in list 0.
pub(super) fn ivf_pq_parts(horizon: Horizon) -> CatalogParts {
    let params = IvfPqParams {
        dimension: 2,
        nlist: 2,
        m: 1,
        nbits: 1,
        nprobe: 1,
    };
    let mut index = IvfPqIndex::new(params, vec![0.0; 4], vec![1.0, 0.0, 0.0, 1.0]).unwrap();
    let mut parts = tiny_parts(horizon);
    index.add_with_ids(&parts.embeddings.data, &[0, 1, 2]).unwrap();
    parts.index = VectorIndex::IvfPq(index);
    parts.manifest.index_kind = IndexKind::IvfPq;
    parts
}
