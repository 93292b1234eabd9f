//! # deepmemory-graph
//!
//! Labeled property graph storage and the Graph Traversal Engine: one
//! breadth-first expansion seeded by every entity at once, bounded by depth,
//! node count, and a relationship-type whitelist.

pub mod store;
pub mod traversal;

pub use store::{GraphPath, GraphSnapshot, InMemoryGraphStore, Subgraph};
pub use traversal::{GraphStoreExt, GraphTraversalEngine, TraversalConfig, TraversalOutcome};
