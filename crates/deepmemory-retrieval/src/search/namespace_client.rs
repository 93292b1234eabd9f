//! Top-K lookup against one vector index partition per dimension.
//!
//! Backend errors never escape: a failed or timed-out namespace comes back as
//! an empty hit list with a recorded [`BranchFailure`]. Hits with a NaN or
//! infinite score are dropped.

use std::sync::Arc;
use std::time::Duration;

use deepmemory_core::config::RetrievalConfig;
use deepmemory_core::constants::LOCAL_FILTER_OVERFETCH;
use deepmemory_core::errors::SearchError;
use deepmemory_core::models::{BranchFailure, DimensionEmbedding, MetadataFilter, SearchHit};
use deepmemory_core::traits::IVectorIndex;
use deepmemory_observability::search_span;
use futures::future::join_all;
use tracing::{debug, warn, Instrument};

/// Outcome of searching one namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceSearchResult {
    /// Dimension the query vector came from.
    pub dimension: String,
    pub namespace: String,
    /// Highest similarity first, at most `top_k`.
    pub hits: Vec<SearchHit>,
    pub failure: Option<BranchFailure>,
}

impl NamespaceSearchResult {
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

pub struct NamespaceSearchClient {
    index: Arc<dyn IVectorIndex>,
    top_k: usize,
    timeout: Duration,
}

impl NamespaceSearchClient {
    pub fn new(index: Arc<dyn IVectorIndex>, top_k: usize, timeout: Duration) -> Self {
        Self {
            index,
            top_k,
            timeout,
        }
    }

    pub fn from_config(index: Arc<dyn IVectorIndex>, config: &RetrievalConfig) -> Self {
        Self::new(index, config.top_k, config.timeouts.search())
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Search one namespace. The result's `dimension` is the namespace name.
    pub async fn search(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> NamespaceSearchResult {
        self.search_as(namespace, namespace, vector, top_k, filter)
            .await
    }

    /// One search per embedding, all in flight at once. Results follow the
    /// order of `embeddings`.
    pub async fn search_all(
        &self,
        embeddings: &[DimensionEmbedding],
        filter: Option<&MetadataFilter>,
    ) -> Vec<NamespaceSearchResult> {
        let calls = embeddings.iter().map(|e| {
            self.search_as(&e.dimension, &e.namespace, &e.vector, self.top_k, filter)
        });
        join_all(calls).await
    }

    async fn search_as(
        &self,
        dimension: &str,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> NamespaceSearchResult {
        let span = search_span!(namespace, top_k);
        let outcome = self
            .query(namespace, vector, top_k, filter)
            .instrument(span)
            .await;

        let (hits, failure) = match outcome {
            Ok(hits) => {
                debug!(namespace = %namespace, hits = hits.len(), "namespace searched");
                (hits, None)
            }
            Err(e) => (Vec::new(), Some(BranchFailure::search(namespace, e))),
        };
        NamespaceSearchResult {
            dimension: dimension.to_string(),
            namespace: namespace.to_string(),
            hits,
            failure,
        }
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchHit>, SearchError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let pushdown = self.index.supports_filtering();
        let local_filter = if pushdown { None } else { filter };
        let index_filter = if pushdown { filter } else { None };
        let fetch = match local_filter {
            Some(_) => top_k.saturating_mul(LOCAL_FILTER_OVERFETCH),
            None => top_k,
        };

        let mut hits = tokio::time::timeout(
            self.timeout,
            self.index.query(namespace, vector, fetch, index_filter),
        )
        .await
        .map_err(|_| SearchError::Timeout {
            after_ms: self.timeout.as_millis() as u64,
        })??;

        let before = hits.len();
        hits.retain(|h| h.score.is_finite());
        if hits.len() < before {
            warn!(
                namespace = %namespace,
                dropped = before - hits.len(),
                "dropped hits with non-finite scores"
            );
        }
        if let Some(filter) = local_filter {
            hits.retain(|h| filter.matches(&h.metadata));
        }
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }
}
