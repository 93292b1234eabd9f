//! Partition the fused list into five quota-bounded buckets.

use std::collections::HashMap;

use deepmemory_core::config::{DimensionSpec, QuotaPlan, RetrievalConfig};
use deepmemory_core::constants::{CONTRADICTION_KEY, FLAGS_KEY};
use deepmemory_core::models::{
    Bucket, EvidenceItem, EvidencePackage, FusedCandidate, Metadata, QuotaCounts, SourceId,
};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::quota::quota_counts;

/// Whether metadata marks an item as contradicting other evidence:
/// `contradiction: true`, or a `flags` array containing `"contradiction"`.
pub fn is_contradiction(metadata: &Metadata) -> bool {
    if metadata.get(CONTRADICTION_KEY) == Some(&Value::Bool(true)) {
        return true;
    }
    metadata
        .get(FLAGS_KEY)
        .and_then(Value::as_array)
        .is_some_and(|flags| flags.iter().any(|f| f.as_str() == Some(CONTRADICTION_KEY)))
}

/// Per-dimension facts the bucket rules need.
#[derive(Debug, Clone, Copy)]
struct DimensionTraits {
    verbatim: bool,
    affinity: Bucket,
}

pub struct EvidenceAssembler {
    plan: QuotaPlan,
    max_total: usize,
    redistribute: bool,
    dimensions: HashMap<String, DimensionTraits>,
}

impl EvidenceAssembler {
    pub fn new(
        plan: QuotaPlan,
        max_total: usize,
        redistribute: bool,
        dimensions: &[DimensionSpec],
    ) -> Self {
        let dimensions = dimensions
            .iter()
            .map(|d| {
                (
                    d.name.clone(),
                    DimensionTraits {
                        verbatim: d.is_verbatim(),
                        affinity: d.bucket_affinity(),
                    },
                )
            })
            .collect();
        Self {
            plan,
            max_total,
            redistribute,
            dimensions,
        }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(
            config.quota_plan.clone(),
            config.max_total,
            config.redistribute_unused_quota,
            &config.dimensions,
        )
    }

    pub fn quotas(&self) -> QuotaCounts {
        quota_counts(&self.plan, self.max_total)
    }

    /// The bucket a candidate belongs in. First matching rule wins.
    pub fn classify(&self, candidate: &FusedCandidate) -> Bucket {
        if is_contradiction(&candidate.metadata) {
            return Bucket::ContradictionFlag;
        }
        if candidate.is_graph_only() {
            return match candidate.graph_distance {
                Some(d) if d >= 2 => Bucket::LateralConnection,
                _ => Bucket::RelationshipMap,
            };
        }
        if candidate.has_graph_origin() {
            return Bucket::RelationshipMap;
        }
        if candidate
            .dimensions()
            .any(|d| self.dimensions.get(d).is_some_and(|t| t.verbatim))
        {
            return Bucket::DirectMatch;
        }

        // Lowest rank wins; origins are in source order so ties go to the
        // earlier configured dimension.
        candidate
            .origins
            .iter()
            .filter_map(|c| match &c.source {
                SourceId::Dimension(name) => Some((c.rank, name)),
                SourceId::Graph => None,
            })
            .min_by_key(|(rank, _)| *rank)
            .and_then(|(_, name)| self.dimensions.get(name.as_str()))
            .map(|t| t.affinity)
            .unwrap_or(Bucket::LateralConnection)
    }

    /// Place fused candidates into buckets without exceeding `max_total`.
    ///
    /// The first pass fills each bucket up to its quota in fused order. With
    /// redistribution on, a second pass fills the remaining slots from the
    /// candidates skipped in the first pass, again in fused order.
    pub fn assemble(&self, query_id: Uuid, fused: Vec<FusedCandidate>) -> EvidencePackage {
        let quotas = self.quotas();
        let mut package = EvidencePackage::empty(query_id, self.max_total, quotas.clone());
        package.fused_count = fused.len();

        let mut placed = 0;
        let mut skipped: Vec<EvidenceItem> = Vec::new();

        for (idx, candidate) in fused.into_iter().enumerate() {
            let bucket = self.classify(&candidate);
            let item = EvidenceItem {
                fused_rank: idx + 1,
                bucket,
                candidate,
            };
            let slot = package.buckets.entry(bucket).or_default();
            if placed < self.max_total && slot.len() < quotas.get(bucket) {
                slot.push(item);
                placed += 1;
            } else {
                skipped.push(item);
            }
        }

        if self.redistribute {
            for item in skipped.into_iter().take(self.max_total - placed) {
                package.buckets.entry(item.bucket).or_default().push(item);
                placed += 1;
            }
        }

        debug!(
            fused = package.fused_count,
            placed,
            max_total = self.max_total,
            "evidence assembled"
        );
        package
    }
}
