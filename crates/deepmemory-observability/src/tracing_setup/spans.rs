//! Span definitions per operation: retrieval, embedding, search, traversal.

/// Create a retrieval span for one query.
#[macro_export]
macro_rules! retrieval_span {
    ($query_id:expr, $dimensions:expr, $seeds:expr) => {
        tracing::info_span!(
            "deepmemory.retrieval",
            query_id = %$query_id,
            dimensions = $dimensions,
            seeds = $seeds
        )
    };
}

/// Create an embedding span for one dimension.
#[macro_export]
macro_rules! embedding_span {
    ($provider:expr, $dimension:expr) => {
        tracing::debug_span!("deepmemory.embedding", provider = %$provider, dimension = %$dimension)
    };
}

/// Create a search span for one namespace.
#[macro_export]
macro_rules! search_span {
    ($namespace:expr, $top_k:expr) => {
        tracing::debug_span!("deepmemory.search", namespace = %$namespace, top_k = $top_k)
    };
}

/// Create a graph traversal span.
#[macro_export]
macro_rules! traversal_span {
    ($seeds:expr, $max_depth:expr) => {
        tracing::debug_span!("deepmemory.traversal", seeds = $seeds, max_depth = $max_depth)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const RETRIEVAL: &str = "deepmemory.retrieval";
    pub const EMBEDDING: &str = "deepmemory.embedding";
    pub const SEARCH: &str = "deepmemory.search";
    pub const TRAVERSAL: &str = "deepmemory.traversal";
}
