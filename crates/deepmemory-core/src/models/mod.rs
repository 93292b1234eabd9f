//! Per-query data model. Nothing here outlives a single retrieval call.

pub mod branch;
pub mod candidate;
pub mod embedding;
pub mod evidence;
pub mod filter;
pub mod graph;
pub mod query;
pub mod search_hit;

pub use branch::{BranchFailure, BranchKind};
pub use candidate::{CandidateKey, Contribution, FusedCandidate, SourceId};
pub use embedding::DimensionEmbedding;
pub use evidence::{Bucket, EvidenceItem, EvidencePackage, QuotaCounts};
pub use filter::MetadataFilter;
pub use graph::{GraphEdge, GraphNode, GraphStats, Neighbor, NodeKey, TraversalHit};
pub use query::Query;
pub use search_hit::{IndexStats, NamespaceStats, SearchHit, VectorRecord};

use std::collections::BTreeMap;

/// Metadata attached to vectors, nodes, and edges. Ordered for stable output.
pub type Metadata = BTreeMap<String, serde_json::Value>;
