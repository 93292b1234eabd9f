//! # deepmemory-retrieval
//!
//! Multi-dimensional retrieval: per-dimension namespace search and graph
//! traversal run concurrently, weighted reciprocal rank fusion merges them,
//! and the evidence assembler partitions the result into quota-bounded
//! buckets.

pub mod assembly;
pub mod cancellation;
pub mod engine;
pub mod fusion;
pub mod index;
pub mod indexer;
pub mod search;

pub use assembly::{quota_counts, ContextBrief, EvidenceAssembler};
pub use cancellation::CancellationToken;
pub use engine::{RetrievalEngine, RetrievalProviders};
pub use fusion::{fuse, fuse_ranked_lists, RankedItem, RankedSource};
pub use index::InMemoryVectorIndex;
pub use indexer::{EvidenceDocument, EvidenceIndexer, IndexReport};
pub use search::{NamespaceSearchClient, NamespaceSearchResult};
