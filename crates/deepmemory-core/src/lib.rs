//! # deepmemory-core
//!
//! Foundation crate for DeepMemory retrieval.
//! Defines the data model, collaborator traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{DeepMemoryConfig, RetrievalConfig};
pub use errors::{DeepMemoryError, DeepMemoryResult, RetrievalError};
pub use models::{Bucket, CandidateKey, EvidencePackage, FusedCandidate, Metadata, Query};
