//! # deepmemory-embeddings
//!
//! Embedding providers and the Dimension Router, which turns one query into
//! one vector per configured semantic dimension.

pub mod providers;
pub mod router;

pub use providers::{create_provider, HashingProvider, HttpProvider};
pub use router::{DimensionRouter, RoutedEmbeddings};
