//! Substitutable collaborators for failure-path and scheduling tests.

mod embedder;
mod graph_store;
mod vector_index;

pub use embedder::{FailingEmbedder, FixedEmbedder, SlowEmbedder};
pub use graph_store::{
    FailingGraphStore, NeighborFailingGraphStore, SeedFailingGraphStore, SlowGraphStore,
};
pub use vector_index::{FailingVectorIndex, ScriptedVectorIndex};
