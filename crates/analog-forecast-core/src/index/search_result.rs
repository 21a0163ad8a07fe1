//! Search output types.
//!
//! Index strategies return [`SearchHit`]s ranked by decreasing similarity.
//! The orchestrator turns them into [`Analog`]s, which also carry the
//! squared-L2 distance and, once weighted, an ensemble weight.

use std::cmp::Ordering;

/// One ranked index result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Row in the catalog's embeddings/outcomes matrices.
    pub row: usize,
    /// Inner-product similarity (cosine for unit vectors). Higher = closer.
    pub score: f32,
}

impl SearchHit {
    #[inline]
    pub fn new(row: usize, score: f32) -> Self {
        Self { row, score }
    }

    /// Ranking order: score descending, then row ascending.
    #[inline]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.row.cmp(&other.row))
    }
}

/// A retrieved historical state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analog {
    pub row: usize,
    /// Cosine similarity in [-1, 1] for unit vectors.
    pub similarity: f32,
    /// Squared L2 distance between unit vectors, `2 - 2 * similarity`, floored at 0.
    pub distance: f32,
    /// Ensemble weight, 0 until a weighting policy assigns one.
    pub weight: f32,
}

impl Analog {
    /// Create from a search hit, converting similarity to squared L2.
    ///
    /// # Math
    ///
    /// For normalized vectors `||a - b||^2 = 2 - 2 cos(theta)`. Approximate
    /// scores can exceed 1 slightly, so the distance is floored at zero.
    #[inline]
    pub fn from_hit(hit: SearchHit) -> Self {
        let distance = (2.0 * (1.0 - hit.score)).max(0.0);
        Self {
            row: hit.row,
            similarity: hit.score,
            distance,
            weight: 0.0,
        }
    }
}

/// Keep the `k` best `(row, score)` pairs in ranking order.
///
/// Non-finite scores are dropped and each row appears at most once (its best
/// score wins). The ordering is total, so the result is deterministic.
pub fn select_top_k<I>(candidates: I, k: usize) -> Vec<SearchHit>
where
    I: IntoIterator<Item = (usize, f32)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = candidates
        .into_iter()
        .filter(|(_, score)| score.is_finite())
        .map(|(row, score)| SearchHit::new(row, score))
        .collect();

    // Rows sorted together, best score first, so dedup keeps the best.
    hits.sort_unstable_by(|a, b| a.row.cmp(&b.row).then_with(|| b.score.total_cmp(&a.score)));
    hits.dedup_by_key(|h| h.row);

    if hits.len() > k {
        hits.select_nth_unstable_by(k - 1, SearchHit::rank_cmp);
        hits.truncate(k);
    }
    hits.sort_unstable_by(SearchHit::rank_cmp);
    hits
}
