//! Dimension Router: one query in, one vector per configured dimension out.
//!
//! Non-default dimensions embed `"<instruction> <text>"` so a single model
//! serves several semantic facets. Dimensions are embedded concurrently and
//! fail independently.

use std::sync::Arc;
use std::time::Duration;

use deepmemory_core::config::{DimensionSpec, RetrievalConfig};
use deepmemory_core::errors::EmbeddingError;
use deepmemory_core::models::{BranchFailure, DimensionEmbedding};
use deepmemory_core::traits::IEmbeddingProvider;
use deepmemory_observability::embedding_span;
use futures::future::join_all;
use tracing::{debug, Instrument};

/// Result of routing one query.
#[derive(Debug, Clone, Default)]
pub struct RoutedEmbeddings {
    /// Successful embeddings in configured dimension order.
    pub embeddings: Vec<DimensionEmbedding>,
    /// One entry per dimension that produced no embedding.
    pub failures: Vec<BranchFailure>,
}

impl RoutedEmbeddings {
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

/// Maps query text to per-dimension embeddings.
pub struct DimensionRouter {
    provider: Arc<dyn IEmbeddingProvider>,
    dimensions: Vec<DimensionSpec>,
    timeout: Duration,
}

impl DimensionRouter {
    pub fn new(
        provider: Arc<dyn IEmbeddingProvider>,
        dimensions: Vec<DimensionSpec>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            dimensions,
            timeout,
        }
    }

    pub fn from_config(provider: Arc<dyn IEmbeddingProvider>, config: &RetrievalConfig) -> Self {
        Self::new(provider, config.dimensions.clone(), config.timeouts.embedding())
    }

    pub fn dimensions(&self) -> &[DimensionSpec] {
        &self.dimensions
    }

    /// Embed `text` for one dimension, enforcing the timeout and declared D.
    pub async fn embed_dimension(
        &self,
        spec: &DimensionSpec,
        text: &str,
    ) -> Result<DimensionEmbedding, EmbeddingError> {
        let prompt = spec.render(text);
        let vector = tokio::time::timeout(self.timeout, self.provider.embed(&prompt))
            .await
            .map_err(|_| EmbeddingError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            })??;

        if vector.len() != spec.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: spec.dimensions,
                actual: vector.len(),
            });
        }

        Ok(DimensionEmbedding {
            dimension: spec.name.clone(),
            namespace: spec.namespace().to_string(),
            vector,
        })
    }

    /// Embed `text` for every configured dimension concurrently.
    pub async fn route(&self, text: &str) -> RoutedEmbeddings {
        let calls = self.dimensions.iter().map(|spec| {
            let span = embedding_span!(self.provider.name(), spec.name);
            async move { (spec, self.embed_dimension(spec, text).await) }.instrument(span)
        });

        let mut routed = RoutedEmbeddings::default();
        for (spec, result) in join_all(calls).await {
            match result {
                Ok(embedding) => {
                    debug!(dimension = %spec.name, len = embedding.dimensionality(), "dimension embedded");
                    routed.embeddings.push(embedding);
                }
                Err(e) => routed.failures.push(BranchFailure::embedding(&spec.name, e)),
            }
        }
        routed
    }
}
