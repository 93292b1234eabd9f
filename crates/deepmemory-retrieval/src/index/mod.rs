//! Vector index implementations.

mod memory_index;

pub use memory_index::{cosine_similarity, InMemoryVectorIndex};
