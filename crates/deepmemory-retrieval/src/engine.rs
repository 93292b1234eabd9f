//! RetrievalEngine: orchestrates one query end to end.
//!
//! query → Dimension Router → per-namespace search ─┐
//! seeds → Graph Traversal Engine ───────────────────┴→ RRF → assembler
//!
//! The vector branch and the graph branch run concurrently inside the query
//! future. Each degraded branch becomes a warning on the package; only a
//! query where every executed branch failed is an error.

use std::sync::Arc;

use deepmemory_core::config::RetrievalConfig;
use deepmemory_core::errors::{DeepMemoryError, DeepMemoryResult, RetrievalError};
use deepmemory_core::models::{BranchFailure, EvidencePackage, Query, TraversalHit};
use deepmemory_core::traits::{IEmbeddingProvider, IGraphStore, IVectorIndex};
use deepmemory_embeddings::{DimensionRouter, RoutedEmbeddings};
use deepmemory_graph::{GraphTraversalEngine, TraversalConfig, TraversalOutcome};
use deepmemory_observability::retrieval_span;
use deepmemory_observability::tracing_setup::events;
use tracing::{debug, Instrument};

use crate::assembly::{ContextBrief, EvidenceAssembler};
use crate::cancellation::CancellationToken;
use crate::fusion::{fuse, RankedSource};
use crate::search::{NamespaceSearchClient, NamespaceSearchResult};

/// The three collaborators an engine is built from.
#[derive(Clone)]
pub struct RetrievalProviders {
    pub embedder: Arc<dyn IEmbeddingProvider>,
    pub index: Arc<dyn IVectorIndex>,
    pub graph: Arc<dyn IGraphStore>,
}

/// Everything the branches produced for one query, before fusion.
struct BranchResults {
    routed: RoutedEmbeddings,
    searches: Vec<NamespaceSearchResult>,
    /// `None` when the query had no seeds and the graph branch did not run.
    graph: Option<TraversalOutcome>,
}

impl BranchResults {
    fn failures(&self) -> Vec<BranchFailure> {
        let mut failures = self.routed.failures.clone();
        failures.extend(self.searches.iter().filter_map(|s| s.failure.clone()));
        match &self.graph {
            Some(TraversalOutcome {
                failure: Some(failure),
                ..
            }) => failures.push(BranchFailure::graph(failure)),
            Some(outcome) if outcome.is_degraded() => {
                let reason = format!("skipped failed lookups: {}", outcome.errors.join("; "));
                failures.push(BranchFailure::graph(reason));
            }
            _ => {}
        }
        failures
    }

    /// True when no executed branch produced a usable answer. A dimension
    /// branch succeeds when its search returned without error, even empty.
    fn all_failed(&self) -> bool {
        let any_search_ok = self.searches.iter().any(|s| !s.is_failed());
        let graph_ok = self.graph.as_ref().is_some_and(|g| !g.is_failed());
        !any_search_ok && !graph_ok
    }

    fn graph_hits(&self) -> &[TraversalHit] {
        match &self.graph {
            Some(outcome) if !outcome.is_failed() => &outcome.hits,
            _ => &[],
        }
    }
}

pub struct RetrievalEngine {
    config: RetrievalConfig,
    router: DimensionRouter,
    search: NamespaceSearchClient,
    traversal: GraphTraversalEngine,
    graph: Arc<dyn IGraphStore>,
    assembler: EvidenceAssembler,
}

impl RetrievalEngine {
    /// Build an engine. Fails with `ConfigurationInvalid` before any query
    /// can run if `config` does not validate.
    pub fn new(config: RetrievalConfig, providers: RetrievalProviders) -> Result<Self, RetrievalError> {
        config.validate()?;
        Ok(Self {
            router: DimensionRouter::from_config(providers.embedder, &config),
            search: NamespaceSearchClient::from_config(providers.index, &config),
            traversal: GraphTraversalEngine::new(TraversalConfig::from_retrieval(&config)),
            graph: providers.graph,
            assembler: EvidenceAssembler::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Run one query to an evidence package.
    pub async fn retrieve(&self, query: &Query) -> Result<EvidencePackage, RetrievalError> {
        let span = retrieval_span!(query.id(), self.config.dimensions.len(), query.seeds().len());
        self.run(query).instrument(span).await
    }

    /// Like [`retrieve`](Self::retrieve), but stops with `Cancelled` as soon
    /// as `token` fires. In-flight branches are dropped with the query future.
    pub async fn retrieve_with_cancellation(
        &self,
        query: &Query,
        token: &CancellationToken,
    ) -> Result<EvidencePackage, RetrievalError> {
        if token.is_cancelled() {
            return Err(RetrievalError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(query_id = %query.id(), "retrieval cancelled");
                Err(RetrievalError::Cancelled)
            }
            result = self.retrieve(query) => result,
        }
    }

    /// Retrieve and render the package as a context brief.
    pub async fn retrieve_brief(&self, query: &Query) -> Result<ContextBrief, RetrievalError> {
        let package = self.retrieve(query).await?;
        Ok(ContextBrief::from_package(&package))
    }

    /// Blocking wrapper for callers without a runtime. Returns
    /// `ConcurrencyError` when called from inside one.
    pub fn retrieve_blocking(&self, query: &Query) -> DeepMemoryResult<EvidencePackage> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(DeepMemoryError::ConcurrencyError(
                "retrieve_blocking called from within an async runtime".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DeepMemoryError::ConcurrencyError(format!("runtime build failed: {e}")))?;
        Ok(runtime.block_on(self.retrieve(query))?)
    }

    async fn run(&self, query: &Query) -> Result<EvidencePackage, RetrievalError> {
        let query_id = query.id().to_string();

        let vector_branch = async {
            let routed = self.router.route(query.text()).await;
            let searches = self.search.search_all(&routed.embeddings, query.filter()).await;
            (routed, searches)
        };
        let graph_branch = async {
            if query.seeds().is_empty() {
                return None;
            }
            Some(self.traversal.traverse(self.graph.as_ref(), query.seeds()).await)
        };
        let ((routed, searches), graph) = tokio::join!(vector_branch, graph_branch);
        let results = BranchResults {
            routed,
            searches,
            graph,
        };

        let failures = results.failures();
        if results.all_failed() {
            events::all_sources_failed(&query_id, &failures);
            return Err(RetrievalError::AllSourcesFailed { failures });
        }
        for failure in &failures {
            events::branch_degraded(&query_id, failure);
        }

        let mut sources: Vec<RankedSource> = results
            .searches
            .iter()
            .filter(|s| !s.is_failed())
            .map(|s| RankedSource::from_hits(&s.dimension, self.config.weight_for(&s.dimension), &s.hits))
            .collect();
        let graph_hits = results.graph_hits();
        if !graph_hits.is_empty() {
            sources.push(RankedSource::from_traversal(self.config.graph_weight, graph_hits));
        }

        let fused = fuse(&sources, self.config.rrf_k);
        let mut package = self.assembler.assemble(query.id(), fused);
        package.warnings = failures;

        events::retrieval_completed(
            &query_id,
            package.fused_count,
            package.len(),
            package.warnings.len(),
        );
        Ok(package)
    }
}
