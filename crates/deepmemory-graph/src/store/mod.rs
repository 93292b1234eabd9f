//! Graph store implementations.

mod identifier;
mod memory_store;

pub use identifier::validate_identifier;
pub use memory_store::{GraphPath, GraphSnapshot, InMemoryGraphStore, Subgraph};
