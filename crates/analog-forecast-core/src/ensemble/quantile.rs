//! Weighted order statistics.

/// One weighted observation. `order` is the analog's rank, used to break
/// value ties so sorting is deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedSample {
    pub value: f64,
    pub weight: f64,
    pub order: usize,
}

impl WeightedSample {
    pub fn new(value: f64, weight: f64, order: usize) -> Self {
        Self {
            value,
            weight,
            order,
        }
    }
}

/// Sort samples by value, ties by order.
pub fn sort_samples(samples: &mut [WeightedSample]) {
    samples.sort_by(|a, b| {
        a.value
            .total_cmp(&b.value)
            .then_with(|| a.order.cmp(&b.order))
    });
}

/// Weighted quantile of `sorted` (ascending, finite, positive weights).
///
/// Sample `i` sits at plotting position `(C_i - w_i / 2) / W`, where `C_i`
/// is the cumulative weight through `i` and `W` the total. Between two
/// positions the value is interpolated linearly; outside the first and last
/// positions it is clamped to the extreme samples.
///
/// Returns `None` for an empty slice or a non-positive total weight.
pub fn weighted_quantile(sorted: &[WeightedSample], q: f64) -> Option<f64> {
    let total: f64 = sorted.iter().map(|s| s.weight).sum();
    if sorted.is_empty() || !(total > 0.0) || !total.is_finite() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);

    let mut cumulative = 0.0;
    let mut previous: Option<(f64, f64)> = None;
    for sample in sorted {
        cumulative += sample.weight;
        let position = (cumulative - sample.weight / 2.0) / total;
        match previous {
            None if q <= position => return Some(sample.value),
            Some((prev_pos, prev_value)) if q <= position => {
                let span = position - prev_pos;
                if span <= 0.0 {
                    return Some(sample.value);
                }
                let t = (q - prev_pos) / span;
                return Some(prev_value + t * (sample.value - prev_value));
            }
            _ => previous = Some((position, sample.value)),
        }
    }
    previous.map(|(_, value)| value)
}

/// Weighted arithmetic mean, accumulated in f64.
pub fn weighted_mean(samples: &[WeightedSample]) -> Option<f64> {
    let (sum_w, sum_wv) = samples
        .iter()
        .fold((0.0f64, 0.0f64), |(w, wv), s| (w + s.weight, wv + s.weight * s.value));
    (sum_w > 0.0 && sum_w.is_finite()).then(|| sum_wv / sum_w)
}
