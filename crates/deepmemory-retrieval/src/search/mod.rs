//! Namespace Search Client.

mod namespace_client;

pub use namespace_client::{NamespaceSearchClient, NamespaceSearchResult};
