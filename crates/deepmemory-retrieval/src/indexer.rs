//! Writes documents into every dimension namespace.
//!
//! Documents are embedded with the same per-dimension instruction templates as
//! queries, so a query in one dimension lands near documents embedded for it.

use std::sync::Arc;

use deepmemory_core::config::RetrievalConfig;
use deepmemory_core::constants::CONTENT_KEY;
use deepmemory_core::models::{BranchFailure, Metadata, VectorRecord};
use deepmemory_core::traits::{IEmbeddingProvider, IVectorIndex};
use deepmemory_embeddings::DimensionRouter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// A piece of evidence to index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceDocument {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl EvidenceDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Metadata as stored: the document's own fields plus its text under
    /// `content` unless the caller already set one.
    fn stored_metadata(&self) -> Metadata {
        let mut metadata = self.metadata.clone();
        metadata
            .entry(CONTENT_KEY.to_string())
            .or_insert_with(|| Value::String(self.text.clone()));
        metadata
    }
}

/// What one indexing call wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexReport {
    /// Vectors written, summed over namespaces.
    pub written: usize,
    /// Dimensions or namespaces that could not be written.
    pub failures: Vec<BranchFailure>,
}

impl IndexReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct EvidenceIndexer {
    router: DimensionRouter,
    index: Arc<dyn IVectorIndex>,
}

impl EvidenceIndexer {
    pub fn new(router: DimensionRouter, index: Arc<dyn IVectorIndex>) -> Self {
        Self { router, index }
    }

    pub fn from_config(
        embedder: Arc<dyn IEmbeddingProvider>,
        index: Arc<dyn IVectorIndex>,
        config: &RetrievalConfig,
    ) -> Self {
        Self::new(DimensionRouter::from_config(embedder, config), index)
    }

    /// Embed and upsert one document into every dimension namespace.
    pub async fn index_document(&self, document: &EvidenceDocument) -> IndexReport {
        self.index_documents(std::slice::from_ref(document)).await
    }

    /// Embed every document for every dimension, then upsert per namespace in
    /// batches. A dimension that fails to embed one document skips only that
    /// document.
    pub async fn index_documents(&self, documents: &[EvidenceDocument]) -> IndexReport {
        let mut report = IndexReport::default();
        for spec in self.router.dimensions() {
            let mut records = Vec::with_capacity(documents.len());
            for document in documents {
                match self.router.embed_dimension(spec, &document.text).await {
                    Ok(embedding) => records.push(VectorRecord::new(
                        document.id.clone(),
                        embedding.vector,
                        document.stored_metadata(),
                    )),
                    Err(e) => {
                        warn!(dimension = %spec.name, id = %document.id, error = %e, "document not embedded");
                        report.failures.push(BranchFailure::embedding(&spec.name, e));
                    }
                }
            }
            if records.is_empty() {
                continue;
            }
            match self.index.upsert_batch(spec.namespace(), records).await {
                Ok(written) => {
                    debug!(namespace = %spec.namespace(), written, "namespace indexed");
                    report.written += written;
                }
                Err(e) => {
                    warn!(namespace = %spec.namespace(), error = %e, "namespace upsert failed");
                    report.failures.push(BranchFailure::search(spec.namespace(), e));
                }
            }
        }
        report
    }
}
