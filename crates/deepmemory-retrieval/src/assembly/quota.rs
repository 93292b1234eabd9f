use std::collections::BTreeMap;

use deepmemory_core::config::QuotaPlan;
use deepmemory_core::models::{Bucket, QuotaCounts};

/// Absorbs float noise such as `0.3 * 10.0` landing just under 3.
const FLOOR_EPSILON: f64 = 1e-9;

/// Slot counts per bucket that always sum to `max_total`.
///
/// Each bucket gets `floor(fraction × max_total)`; leftover slots go to the
/// largest fractional remainders, ties in bucket order.
pub fn quota_counts(plan: &QuotaPlan, max_total: usize) -> QuotaCounts {
    let total = max_total as f64;
    let mut counts: BTreeMap<Bucket, usize> = BTreeMap::new();
    let mut remainders: Vec<(Bucket, f64)> = Vec::with_capacity(Bucket::ALL.len());

    for bucket in Bucket::ALL {
        let exact = plan.fraction(bucket) * total;
        let base = (exact + FLOOR_EPSILON).floor();
        counts.insert(bucket, base as usize);
        remainders.push((bucket, (exact - base).max(0.0)));
    }

    let assigned: usize = counts.values().sum();
    let leftover = max_total.saturating_sub(assigned);
    // Stable sort keeps bucket order among equal remainders.
    remainders.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (bucket, _) in remainders.into_iter().take(leftover) {
        *counts.entry(bucket).or_default() += 1;
    }

    QuotaCounts(counts)
}
