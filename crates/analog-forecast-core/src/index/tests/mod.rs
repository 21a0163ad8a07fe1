//! Index tests.

mod ivf_pq_tests;

use super::{IvfPqIndex, IvfPqParams};

/// Residual codewords per 2-D segment, shared by both segments.
const CODEWORDS: [[f32; 2]; 4] = [[0.0, 0.0], [0.1, 0.0], [0.0, 0.1], [-0.1, 0.0]];

/// Small IVF-PQ index whose vectors are exactly representable:
/// every vector is a centroid plus one codeword per segment.
///
/// Returns the index (all vectors added, ids 0..n) and the raw vectors.
pub(super) fn toy_ivf_pq(nprobe: usize) -> (IvfPqIndex, Vec<f32>) {
    let params = IvfPqParams {
        dimension: 4,
        nlist: 2,
        m: 2,
        nbits: 2,
        nprobe,
    };
    let centroids = vec![
        1.0, 0.0, 0.0, 0.0, // list 0
        0.0, 0.0, 1.0, 0.0, // list 1
    ];
    let codebooks: Vec<f32> = (0..2)
        .flat_map(|_| CODEWORDS.iter().flat_map(|c| c.iter().copied()))
        .collect();
    let mut index = IvfPqIndex::new(params, centroids.clone(), codebooks).unwrap();

    // (list, code segment 0, code segment 1)
    let layout = [(0, 0, 0), (0, 2, 0), (0, 1, 2), (1, 0, 0), (1, 0, 1), (1, 3, 2)];
    let mut vectors = Vec::new();
    for (list, c0, c1) in layout {
        let centroid = &centroids[list * 4..list * 4 + 4];
        let residual = [
            CODEWORDS[c0][0],
            CODEWORDS[c0][1],
            CODEWORDS[c1][0],
            CODEWORDS[c1][1],
        ];
        vectors.extend(centroid.iter().zip(residual).map(|(c, r)| c + r));
    }
    let ids: Vec<u64> = (0..layout.len() as u64).collect();
    index.add_with_ids(&vectors, &ids).unwrap();
    (index, vectors)
}
