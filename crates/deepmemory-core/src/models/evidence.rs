use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BranchFailure, FusedCandidate};

/// Evidence category in the final package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    DirectMatch,
    LateralConnection,
    RelationshipMap,
    ContradictionFlag,
    TemporalContext,
}

impl Bucket {
    /// All buckets in declaration order. Quota remainders tie-break on this order.
    pub const ALL: [Bucket; 5] = [
        Bucket::DirectMatch,
        Bucket::LateralConnection,
        Bucket::RelationshipMap,
        Bucket::ContradictionFlag,
        Bucket::TemporalContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectMatch => "direct_match",
            Self::LateralConnection => "lateral_connection",
            Self::RelationshipMap => "relationship_map",
            Self::ContradictionFlag => "contradiction_flag",
            Self::TemporalContext => "temporal_context",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved per-bucket slot counts for one `max_total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaCounts(pub BTreeMap<Bucket, usize>);

impl QuotaCounts {
    pub fn get(&self, bucket: Bucket) -> usize {
        self.0.get(&bucket).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// A fused candidate placed in a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// 1-based position in the overall fused order.
    pub fused_rank: usize,
    pub bucket: Bucket,
    pub candidate: FusedCandidate,
}

/// The bounded, bucketed result of one retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidencePackage {
    pub query_id: Uuid,
    pub max_total: usize,
    pub quotas: QuotaCounts,
    /// Every bucket is present, possibly empty. Items keep fused order.
    pub buckets: BTreeMap<Bucket, Vec<EvidenceItem>>,
    /// Number of fused candidates offered to the assembler.
    pub fused_count: usize,
    /// Branches that degraded to empty during this retrieval.
    pub warnings: Vec<BranchFailure>,
}

impl EvidencePackage {
    pub fn empty(query_id: Uuid, max_total: usize, quotas: QuotaCounts) -> Self {
        Self {
            query_id,
            max_total,
            quotas,
            buckets: Bucket::ALL.iter().map(|b| (*b, Vec::new())).collect(),
            fused_count: 0,
            warnings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bucket(&self, bucket: Bucket) -> &[EvidenceItem] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every item across buckets, in overall fused order.
    pub fn items(&self) -> Vec<&EvidenceItem> {
        let mut items: Vec<&EvidenceItem> = self.buckets.values().flatten().collect();
        items.sort_by_key(|item| item.fused_rank);
        items
    }
}
