//! Property tests for rank fusion and evidence assembly.

use std::collections::HashSet;

use proptest::prelude::*;

use deepmemory_core::config::{DimensionSpec, QuotaPlan};
use deepmemory_core::models::{Bucket, CandidateKey, Metadata, SourceId};
use deepmemory_retrieval::{fuse, quota_counts, EvidenceAssembler, RankedItem, RankedSource};
use uuid::Uuid;

fn source(name: &str, weight: f64, ids: &[u8]) -> RankedSource {
    RankedSource {
        source: SourceId::Dimension(name.to_string()),
        weight,
        items: ids
            .iter()
            .map(|id| RankedItem {
                key: CandidateKey::Vector(format!("v{id}")),
                metadata: Metadata::new(),
                graph_distance: None,
            })
            .collect(),
    }
}

fn lists() -> impl Strategy<Value = Vec<(f64, Vec<u8>)>> {
    prop::collection::vec((0.0f64..2.0, prop::collection::vec(0u8..30, 0..20)), 1..5)
}

fn sources(lists: &[(f64, Vec<u8>)]) -> Vec<RankedSource> {
    lists
        .iter()
        .enumerate()
        .map(|(i, (w, ids))| source(&format!("d{i}"), *w, ids))
        .collect()
}

fn plan() -> impl Strategy<Value = QuotaPlan> {
    prop::collection::vec(1u32..100, 5).prop_map(|raw| {
        let total: u32 = raw.iter().sum();
        let f: Vec<f64> = raw.iter().map(|r| *r as f64 / total as f64).collect();
        QuotaPlan {
            direct_match: f[0],
            lateral_connection: f[1],
            relationship_map: f[2],
            contradiction_flag: f[3],
            temporal_context: 1.0 - f[0] - f[1] - f[2] - f[3],
        }
    })
}

proptest! {
    #[test]
    fn fusion_is_deterministic(lists in lists(), k in 1u32..200) {
        let sources = sources(&lists);
        let a = fuse(&sources, k);
        let b = fuse(&sources, k);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn fusion_orders_by_score_and_dedups(lists in lists(), k in 1u32..200) {
        let fused = fuse(&sources(&lists), k);
        for pair in fused.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        let keys: HashSet<_> = fused.iter().map(|c| c.key.clone()).collect();
        prop_assert_eq!(keys.len(), fused.len());
        for candidate in &fused {
            let distinct: HashSet<_> = candidate.origins.iter().map(|o| o.source.clone()).collect();
            prop_assert_eq!(distinct.len(), candidate.origins.len());
            let sum: f64 = candidate.origins.iter().map(|o| o.term).sum();
            prop_assert!((sum - candidate.score).abs() < 1e-12);
        }
    }

    #[test]
    fn single_source_rank_one_is_exact(w in 0.0f64..5.0, k in 0u32..500) {
        let fused = fuse(&[source("only", w, &[1, 2])], k);
        prop_assert_eq!(fused[0].score, w / (k as f64 + 1.0));
    }

    #[test]
    fn quota_counts_sum_to_max_total(plan in plan(), max_total in 1usize..500) {
        prop_assert_eq!(quota_counts(&plan, max_total).total(), max_total);
    }

    #[test]
    fn assembly_never_exceeds_max_total(
        lists in lists(),
        plan in plan(),
        max_total in 1usize..40,
        redistribute in any::<bool>(),
    ) {
        let sources = sources(&lists);
        let dims: Vec<DimensionSpec> = (0..sources.len())
            .map(|i| if i == 0 {
                DimensionSpec::verbatim(format!("d{i}"))
            } else {
                DimensionSpec::instructed(format!("d{i}"), "Facet:")
            })
            .collect();
        let fused = fuse(&sources, 60);
        let assembler = EvidenceAssembler::new(plan, max_total, redistribute, &dims);
        let package = assembler.assemble(Uuid::nil(), fused);

        prop_assert!(package.len() <= max_total);
        for bucket in Bucket::ALL {
            let ranks: Vec<usize> = package.bucket(bucket).iter().map(|i| i.fused_rank).collect();
            let mut sorted = ranks.clone();
            sorted.sort_unstable();
            prop_assert_eq!(ranks, sorted);
            if !redistribute {
                prop_assert!(package.bucket(bucket).len() <= package.quotas.get(bucket));
            }
        }
    }
}
