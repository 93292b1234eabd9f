//! Weighted Reciprocal Rank Fusion: score = Σ w_s / (k + rank_s)
//!
//! Each dimension's hit list is one source and the graph traversal is one
//! more. Only ranks matter; raw similarity scores never enter the fused score.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use deepmemory_core::models::{
    CandidateKey, Contribution, FusedCandidate, Metadata, SearchHit, SourceId, TraversalHit,
};
use serde_json::{json, Value};

/// One ranked item inside a source, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedItem {
    pub key: CandidateKey,
    pub metadata: Metadata,
    pub graph_distance: Option<usize>,
}

/// A ranked list contributing to the fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSource {
    pub source: SourceId,
    pub weight: f64,
    pub items: Vec<RankedItem>,
}

impl RankedSource {
    /// A dimension's hits, in the order the index returned them.
    pub fn from_hits(dimension: impl Into<String>, weight: f64, hits: &[SearchHit]) -> Self {
        Self {
            source: SourceId::Dimension(dimension.into()),
            weight,
            items: hits
                .iter()
                .map(|h| RankedItem {
                    key: CandidateKey::Vector(h.id.clone()),
                    metadata: h.metadata.clone(),
                    graph_distance: None,
                })
                .collect(),
        }
    }

    /// Traversal hits, already ordered by distance then discovery order.
    pub fn from_traversal(weight: f64, hits: &[TraversalHit]) -> Self {
        Self {
            source: SourceId::Graph,
            weight,
            items: hits
                .iter()
                .map(|h| RankedItem {
                    key: CandidateKey::Node(h.node.key().to_string()),
                    metadata: node_metadata(h),
                    graph_distance: Some(h.distance),
                })
                .collect(),
        }
    }
}

/// Node properties plus the identity and path of a traversal hit.
fn node_metadata(hit: &TraversalHit) -> Metadata {
    let mut metadata = hit.node.properties.clone();
    metadata.insert("label".to_string(), json!(hit.node.label));
    metadata.insert("name".to_string(), json!(hit.node.name));
    metadata.insert("seed".to_string(), json!(hit.seed));
    let path: Vec<Value> = hit
        .path
        .iter()
        .map(|e| json!(format!("{} -[{}]-> {}", e.from, e.rel_type, e.to)))
        .collect();
    metadata.insert("path".to_string(), Value::Array(path));
    metadata
}

/// Fuse ranked sources into one list, best first.
///
/// Ties on score break by best individual rank, then by candidate key. A
/// candidate repeated within one source counts only at its first rank. The
/// metadata kept is the first one seen across sources.
pub fn fuse(sources: &[RankedSource], k: u32) -> Vec<FusedCandidate> {
    let mut candidates: Vec<FusedCandidate> = Vec::new();
    let mut positions: HashMap<CandidateKey, usize> = HashMap::new();

    for source in sources {
        for (idx, item) in source.items.iter().enumerate() {
            let rank = idx + 1;
            let term = source.weight / (k as f64 + rank as f64);
            let contribution = Contribution {
                source: source.source.clone(),
                rank,
                weight: source.weight,
                term,
            };

            match positions.entry(item.key.clone()) {
                Entry::Occupied(slot) => {
                    let candidate = &mut candidates[*slot.get()];
                    if candidate.contribution(&source.source).is_some() {
                        continue;
                    }
                    candidate.score += term;
                    candidate.best_rank = candidate.best_rank.min(rank);
                    if candidate.graph_distance.is_none() {
                        candidate.graph_distance = item.graph_distance;
                    }
                    candidate.origins.push(contribution);
                }
                Entry::Vacant(slot) => {
                    slot.insert(candidates.len());
                    candidates.push(FusedCandidate {
                        key: item.key.clone(),
                        score: term,
                        best_rank: rank,
                        origins: vec![contribution],
                        metadata: item.metadata.clone(),
                        graph_distance: item.graph_distance,
                    });
                }
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.best_rank.cmp(&b.best_rank))
            .then_with(|| a.key.cmp(&b.key))
    });
    candidates
}

/// Fuse per-dimension hit lists and graph hits. Dimensions missing from
/// `weights` count with weight 1.0.
pub fn fuse_ranked_lists(
    per_dimension: &[(String, Vec<SearchHit>)],
    graph: &[TraversalHit],
    weights: &BTreeMap<String, f64>,
    graph_weight: f64,
    k: u32,
) -> Vec<FusedCandidate> {
    let mut sources: Vec<RankedSource> = per_dimension
        .iter()
        .map(|(dimension, hits)| {
            let weight = weights.get(dimension).copied().unwrap_or(1.0);
            RankedSource::from_hits(dimension.clone(), weight, hits)
        })
        .collect();
    if !graph.is_empty() {
        sources.push(RankedSource::from_traversal(graph_weight, graph));
    }
    fuse(&sources, k)
}
