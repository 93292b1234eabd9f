use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use deepmemory_core::errors::SearchError;
use deepmemory_core::models::{
    IndexStats, MetadataFilter, NamespaceStats, SearchHit, VectorRecord,
};
use deepmemory_core::traits::IVectorIndex;

/// Scripted response for one namespace.
#[derive(Debug, Clone)]
enum Script {
    Hits(Vec<SearchHit>),
    Fail(String),
}

/// A call observed by [`ScriptedVectorIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCall {
    pub namespace: String,
    pub top_k: usize,
    pub vector_len: usize,
    pub filter: Option<MetadataFilter>,
}

/// Returns preset hits per namespace, ignoring the query vector.
///
/// Scripted lists are returned whole unless [`truncating`](Self::truncating)
/// is set, so callers can check that they cap `top_k` themselves. Unscripted
/// namespaces return nothing.
pub struct ScriptedVectorIndex {
    scripts: HashMap<String, Script>,
    delays: HashMap<String, Duration>,
    filtering: bool,
    truncate: bool,
    calls: Mutex<Vec<QueryCall>>,
}

impl Default for ScriptedVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedVectorIndex {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            delays: HashMap::new(),
            filtering: true,
            truncate: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn from_hits(hits: BTreeMap<String, Vec<SearchHit>>) -> Self {
        hits.into_iter()
            .fold(Self::new(), |index, (ns, hits)| index.with_hits(ns, hits))
    }

    pub fn with_hits(mut self, namespace: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.scripts.insert(namespace.into(), Script::Hits(hits));
        self
    }

    pub fn with_failure(mut self, namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        self.scripts
            .insert(namespace.into(), Script::Fail(reason.into()));
        self
    }

    pub fn with_delay(mut self, namespace: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(namespace.into(), delay);
        self
    }

    /// When `false`, filters are ignored and reported as unsupported.
    pub fn with_filter_support(mut self, filtering: bool) -> Self {
        self.filtering = filtering;
        self
    }

    /// Return at most `top_k` hits per query, in scripted order.
    pub fn truncating(mut self) -> Self {
        self.truncate = true;
        self
    }

    pub fn calls(&self) -> Vec<QueryCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl IVectorIndex for ScriptedVectorIndex {
    async fn upsert(&self, _namespace: &str, _record: VectorRecord) -> Result<(), SearchError> {
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchHit>, SearchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(QueryCall {
                namespace: namespace.to_string(),
                top_k,
                vector_len: vector.len(),
                filter: filter.cloned(),
            });
        }
        if let Some(delay) = self.delays.get(namespace) {
            tokio::time::sleep(*delay).await;
        }
        match self.scripts.get(namespace) {
            Some(Script::Hits(hits)) => Ok(hits
                .iter()
                .filter(|h| !self.filtering || filter.map_or(true, |f| f.matches(&h.metadata)))
                .take(if self.truncate { top_k } else { usize::MAX })
                .cloned()
                .collect()),
            Some(Script::Fail(reason)) => Err(SearchError::BackendFailed {
                reason: reason.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn delete(&self, _namespace: &str, _ids: &[String]) -> Result<usize, SearchError> {
        Ok(0)
    }

    async fn delete_namespace(&self, _namespace: &str) -> Result<usize, SearchError> {
        Ok(0)
    }

    async fn stats(&self) -> Result<IndexStats, SearchError> {
        let mut stats = IndexStats::default();
        for (ns, script) in &self.scripts {
            if let Script::Hits(hits) = script {
                stats.total_vector_count += hits.len();
                stats.namespaces.insert(
                    ns.clone(),
                    NamespaceStats {
                        vector_count: hits.len(),
                        dimension: None,
                    },
                );
            }
        }
        Ok(stats)
    }

    fn supports_filtering(&self) -> bool {
        self.filtering
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Fails every call.
pub struct FailingVectorIndex;

fn down() -> SearchError {
    SearchError::BackendFailed {
        reason: "index unreachable".to_string(),
    }
}

#[async_trait]
impl IVectorIndex for FailingVectorIndex {
    async fn upsert(&self, _namespace: &str, _record: VectorRecord) -> Result<(), SearchError> {
        Err(down())
    }

    async fn query(
        &self,
        _namespace: &str,
        _vector: &[f32],
        _top_k: usize,
        _filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchHit>, SearchError> {
        Err(down())
    }

    async fn delete(&self, _namespace: &str, _ids: &[String]) -> Result<usize, SearchError> {
        Err(down())
    }

    async fn delete_namespace(&self, _namespace: &str) -> Result<usize, SearchError> {
        Err(down())
    }

    async fn stats(&self) -> Result<IndexStats, SearchError> {
        Err(down())
    }

    fn name(&self) -> &str {
        "failing"
    }
}
