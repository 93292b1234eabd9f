use std::fmt;

use serde::{Deserialize, Serialize};

use super::Metadata;

/// Identity of a fused candidate. Vector ids and graph nodes live in
/// separate key spaces, so they never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CandidateKey {
    Vector(String),
    Node(String),
}

impl fmt::Display for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector(id) => write!(f, "vector:{id}"),
            Self::Node(key) => write!(f, "node:{key}"),
        }
    }
}

/// A ranked list that feeds fusion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum SourceId {
    Dimension(String),
    Graph,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimension(name) => write!(f, "dimension:{name}"),
            Self::Graph => f.write_str("graph"),
        }
    }
}

/// What one source contributed to a candidate's fused score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub source: SourceId,
    /// 1-based rank within the source list.
    pub rank: usize,
    pub weight: f64,
    /// `weight / (k + rank)`.
    pub term: f64,
}

/// A candidate after rank fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedCandidate {
    pub key: CandidateKey,
    /// Sum of contribution terms. Derived from ranks only.
    pub score: f64,
    /// Lowest rank across all contributing sources.
    pub best_rank: usize,
    /// Contributions in source order.
    pub origins: Vec<Contribution>,
    /// Metadata from the first source that produced this candidate.
    pub metadata: Metadata,
    /// Hop distance when the graph contributed.
    pub graph_distance: Option<usize>,
}

impl FusedCandidate {
    pub fn has_graph_origin(&self) -> bool {
        self.origins.iter().any(|c| c.source == SourceId::Graph)
    }

    pub fn is_graph_only(&self) -> bool {
        !self.origins.is_empty() && self.origins.iter().all(|c| c.source == SourceId::Graph)
    }

    /// Names of contributing dimensions, in source order.
    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().filter_map(|c| match &c.source {
            SourceId::Dimension(name) => Some(name.as_str()),
            SourceId::Graph => None,
        })
    }

    pub fn contribution(&self, source: &SourceId) -> Option<&Contribution> {
        self.origins.iter().find(|c| &c.source == source)
    }
}
