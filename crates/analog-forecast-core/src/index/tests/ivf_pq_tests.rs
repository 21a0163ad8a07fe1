//! Tests for the IVF-PQ index.

use super::toy_ivf_pq;
use crate::error::ForecastError;
use crate::index::{FlatIndex, IvfPqIndex, IvfPqParams, VectorIndex};
use crate::types::Horizon;

#[test]
fn test_factory_string() {
    let (index, _) = toy_ivf_pq(1);
    assert_eq!(index.params().factory_string(), "IVF2,PQ2x2");
    assert_eq!(index.params().ksub(), 4);
    assert_eq!(index.params().dsub(), 2);
}

#[test]
fn test_add_distributes_into_lists() {
    let (index, _) = toy_ivf_pq(1);
    assert_eq!(index.ntotal(), 6);
    assert_eq!(index.lists()[0].ids, vec![0, 1, 2]);
    assert_eq!(index.lists()[1].ids, vec![3, 4, 5]);
    assert_eq!(index.lists()[1].codes, vec![0, 0, 0, 1, 3, 2]);
}

#[test]
fn test_full_probe_agrees_with_flat() {
    let (ivf, vectors) = toy_ivf_pq(2);
    let flat = FlatIndex::from_vectors(4, vectors.clone());

    // Row 5 is left out: it is equidistant from rows 0-2 up to rounding.
    for row in 0..5 {
        let query = &vectors[row * 4..row * 4 + 4];
        let approx = ivf.search(query, 6);
        let exact = flat.search(query, 6);
        assert_eq!(approx.len(), exact.len());
        for (a, e) in approx.iter().zip(&exact) {
            assert_eq!(a.row, e.row, "ranking differs for query row {}", row);
            assert!((a.score - e.score).abs() < 1e-5);
        }
    }
}

#[test]
fn test_single_probe_restricts_candidates() {
    let (ivf, _) = toy_ivf_pq(1);
    let hits = ivf.search(&[1.0, 0.0, 0.0, 0.0], 6);
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|h| h.row < 3));
    assert_eq!(hits[0].row, 2);
}

#[test]
fn test_set_nprobe_clamps() {
    let (mut ivf, _) = toy_ivf_pq(1);
    ivf.set_nprobe(100);
    assert_eq!(ivf.params().nprobe, 2);
    ivf.set_nprobe(0);
    assert_eq!(ivf.params().nprobe, 1);
}

#[test]
fn test_new_rejects_indivisible_segments() {
    let params = IvfPqParams {
        dimension: 5,
        nlist: 1,
        m: 2,
        nbits: 2,
        nprobe: 1,
    };
    let err = IvfPqIndex::new(params, vec![0.0; 5], vec![0.0; 8]).unwrap_err();
    assert!(err.to_string().contains("divide"));
}

#[test]
fn test_new_rejects_short_codebooks() {
    let params = IvfPqParams {
        dimension: 4,
        nlist: 1,
        m: 2,
        nbits: 2,
        nprobe: 1,
    };
    let err = IvfPqIndex::new(params, vec![0.0; 4], vec![0.0; 3]).unwrap_err();
    assert!(err.to_string().contains("codebooks"));
}

#[test]
fn test_add_with_ids_count_mismatch() {
    let (mut ivf, _) = toy_ivf_pq(1);
    let err = ivf.add_with_ids(&[1.0, 0.0, 0.0, 0.0], &[10, 11]).unwrap_err();
    assert!(matches!(err, ForecastError::InvalidConfig(_)));
}

#[test]
fn test_add_with_ids_partial_vector() {
    let (mut ivf, _) = toy_ivf_pq(1);
    let err = ivf.add_with_ids(&[1.0, 0.0, 0.0], &[10]).unwrap_err();
    assert!(matches!(err, ForecastError::InvalidQuery { .. }));
}

#[test]
fn test_check_structure_flags_out_of_range_ids() {
    let (ivf, _) = toy_ivf_pq(1);
    let index = VectorIndex::IvfPq(ivf);
    assert!(index.check_structure(Horizon::H12, 6).is_ok());

    let err = index.check_structure(Horizon::H12, 4).unwrap_err();
    match err {
        ForecastError::StructuralMismatch { artifact, .. } => {
            assert!(artifact.contains("ids"));
        }
        other => panic!("expected StructuralMismatch, got {:?}", other),
    }
}

#[test]
fn test_check_structure_flags_duplicate_ids() {
    let (mut ivf, vectors) = toy_ivf_pq(1);
    ivf.add_with_ids(&vectors[0..4], &[3]).unwrap();
    let defects = VectorIndex::IvfPq(ivf).structural_defects(6);
    assert!(defects.iter().any(|(_, _, found)| found.contains("duplicate id 3")));
}

#[test]
fn test_bincode_roundtrip_preserves_search() {
    let (ivf, vectors) = toy_ivf_pq(2);
    let index = VectorIndex::IvfPq(ivf);
    let bytes = bincode::serialize(&index).unwrap();
    let restored: VectorIndex = bincode::deserialize(&bytes).unwrap();

    let query = &vectors[8..12];
    assert_eq!(index.search(query, 3).unwrap(), restored.search(query, 3).unwrap());
}

#[test]
fn test_check_structure_flags_codes_beyond_codebook() {
    let (ivf, _) = toy_ivf_pq(2);
    let mut value = serde_json::to_value(&ivf).unwrap();
    value["lists"][1]["codes"][0] = serde_json::json!(9);
    let corrupted: IvfPqIndex = serde_json::from_value(value).unwrap();

    let defects = VectorIndex::IvfPq(corrupted).structural_defects(6);
    assert!(defects
        .iter()
        .any(|(what, _, found)| what == "ivf_pq list 1 codes" && found == "code 9"));
}
