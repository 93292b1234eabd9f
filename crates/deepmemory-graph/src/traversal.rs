//! Graph Traversal Engine: bounded breadth-first expansion from seed names.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use deepmemory_core::config::defaults;
use deepmemory_core::config::RetrievalConfig;
use deepmemory_core::errors::GraphError;
use deepmemory_core::models::{GraphEdge, NodeKey, TraversalHit};
use deepmemory_core::traits::IGraphStore;
use deepmemory_observability::tracing_setup::events;
use deepmemory_observability::traversal_span;
use futures::future::join_all;
use tracing::{debug, warn, Instrument};

/// Bounds for one traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalConfig {
    /// Maximum hops from a seed.
    pub max_depth: usize,
    /// Maximum nodes to return.
    pub max_nodes: usize,
    /// Relationship types to follow. Empty follows every type.
    pub relationship_whitelist: Vec<String>,
    /// Budget for the whole traversal.
    pub timeout: Duration,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: defaults::DEFAULT_MAX_DEPTH,
            max_nodes: defaults::DEFAULT_MAX_NODES,
            relationship_whitelist: defaults::DEFAULT_RELATIONSHIP_WHITELIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout: Duration::from_millis(defaults::DEFAULT_GRAPH_TIMEOUT_MS),
        }
    }
}

impl TraversalConfig {
    pub fn from_retrieval(config: &RetrievalConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_nodes: config.max_nodes,
            relationship_whitelist: config.relationship_whitelist.clone(),
            timeout: config.timeouts.graph(),
        }
    }
}

/// Result of one traversal.
#[derive(Debug, Clone, Default)]
pub struct TraversalOutcome {
    /// Ordered by ascending distance, then discovery order.
    pub hits: Vec<TraversalHit>,
    /// Seeds with no matching node. Not an error.
    pub missing_seeds: Vec<String>,
    /// Per-seed or per-node lookup errors that were skipped over.
    pub errors: Vec<String>,
    /// Set when the traversal as a whole failed: every seed lookup errored,
    /// lookup errors left it with no hits, or the time budget ran out.
    pub failure: Option<GraphError>,
}

impl TraversalOutcome {
    fn failed(failure: GraphError) -> Self {
        Self {
            failure: Some(failure),
            ..Default::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Lookup errors were skipped but the traversal still produced hits.
    pub fn is_degraded(&self) -> bool {
        self.failure.is_none() && !self.errors.is_empty()
    }

    /// Deepest distance reported.
    pub fn max_depth_reached(&self) -> usize {
        self.hits.last().map(|h| h.distance).unwrap_or(0)
    }
}

/// A node on the BFS frontier.
struct Frontier {
    key: NodeKey,
    path: Vec<GraphEdge>,
    seed: String,
}

/// Breadth-first traversal shared by every seed of one call.
///
/// All seeds start in one frontier with one visited set, so a node reachable
/// from several seeds is reported once, at its minimum depth. Neighbor
/// lookups for a whole layer are issued concurrently; the whitelist is handed
/// to the store so disallowed edges are never expanded.
#[derive(Debug, Clone, Default)]
pub struct GraphTraversalEngine {
    pub config: TraversalConfig,
}

impl GraphTraversalEngine {
    pub fn new(config: TraversalConfig) -> Self {
        Self { config }
    }

    /// Traverse from every seed name within the configured time budget.
    pub async fn traverse<S>(&self, store: &S, seeds: &[String]) -> TraversalOutcome
    where
        S: IGraphStore + ?Sized,
    {
        let span = traversal_span!(seeds.len(), self.config.max_depth);
        let run = self.expand(store, seeds).instrument(span);
        match tokio::time::timeout(self.config.timeout, run).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let after_ms = self.config.timeout.as_millis() as u64;
                warn!(after_ms, "graph traversal timed out");
                TraversalOutcome::failed(GraphError::Timeout { after_ms })
            }
        }
    }

    async fn expand<S>(&self, store: &S, seeds: &[String]) -> TraversalOutcome
    where
        S: IGraphStore + ?Sized,
    {
        let mut outcome = TraversalOutcome::default();
        if seeds.is_empty() || self.config.max_nodes == 0 {
            return outcome;
        }

        let mut visited: HashSet<NodeKey> = HashSet::new();
        let mut frontier: Vec<Frontier> = Vec::new();
        let mut seed_errors = 0;

        let lookups = join_all(seeds.iter().map(|seed| store.find_nodes(seed))).await;
        for (seed, lookup) in seeds.iter().zip(lookups) {
            match lookup {
                Ok(nodes) if nodes.is_empty() => {
                    events::seed_not_found(seed);
                    outcome.missing_seeds.push(seed.clone());
                }
                Ok(nodes) => {
                    for node in nodes {
                        let key = node.key();
                        if visited.insert(key.clone()) {
                            frontier.push(Frontier {
                                key,
                                path: Vec::new(),
                                seed: seed.clone(),
                            });
                        }
                    }
                }
                Err(e) => {
                    warn!(seed = %seed, error = %e, "seed lookup failed");
                    outcome.errors.push(format!("seed {seed}: {e}"));
                    seed_errors += 1;
                }
            }
        }

        if seed_errors == seeds.len() {
            let reason = outcome.errors.join("; ");
            outcome.failure = Some(GraphError::BackendFailed { reason });
            return outcome;
        }

        let whitelist = &self.config.relationship_whitelist;
        let mut depth = 0;
        'layers: while depth < self.config.max_depth && !frontier.is_empty() {
            depth += 1;
            let results = join_all(frontier.iter().map(|f| store.neighbors(&f.key, whitelist))).await;

            let mut next = Vec::new();
            for (origin, result) in frontier.iter().zip(results) {
                let neighbors = match result {
                    Ok(neighbors) => neighbors,
                    Err(e) => {
                        warn!(node = %origin.key, error = %e, "neighbor lookup failed");
                        outcome.errors.push(format!("{}: {e}", origin.key));
                        continue;
                    }
                };
                for neighbor in neighbors {
                    let key = neighbor.node.key();
                    if !visited.insert(key.clone()) {
                        continue;
                    }
                    let mut path = origin.path.clone();
                    path.push(neighbor.edge);
                    outcome.hits.push(TraversalHit {
                        node: neighbor.node,
                        distance: depth,
                        path: path.clone(),
                        seed: origin.seed.clone(),
                    });
                    if outcome.hits.len() >= self.config.max_nodes {
                        break 'layers;
                    }
                    next.push(Frontier {
                        key,
                        path,
                        seed: origin.seed.clone(),
                    });
                }
            }
            frontier = next;
        }

        if outcome.hits.is_empty() && !outcome.errors.is_empty() {
            let reason = outcome.errors.join("; ");
            outcome.failure = Some(GraphError::BackendFailed { reason });
            return outcome;
        }

        debug!(
            hits = outcome.hits.len(),
            depth = outcome.max_depth_reached(),
            missing = outcome.missing_seeds.len(),
            "traversal finished"
        );
        outcome
    }
}

/// Single-seed traversal available on every graph store.
#[async_trait]
pub trait GraphStoreExt: IGraphStore {
    /// Nodes reachable from `seed` within `max_depth` hops. `whitelist` of
    /// `None` follows every relationship type.
    async fn traverse(
        &self,
        seed: &str,
        max_depth: usize,
        whitelist: Option<&[String]>,
    ) -> Result<Vec<TraversalHit>, GraphError>;
}

#[async_trait]
impl<T: IGraphStore + ?Sized> GraphStoreExt for T {
    async fn traverse(
        &self,
        seed: &str,
        max_depth: usize,
        whitelist: Option<&[String]>,
    ) -> Result<Vec<TraversalHit>, GraphError> {
        let engine = GraphTraversalEngine::new(TraversalConfig {
            max_depth,
            max_nodes: usize::MAX,
            relationship_whitelist: whitelist.map(<[String]>::to_vec).unwrap_or_default(),
            timeout: Duration::from_millis(defaults::DEFAULT_GRAPH_TIMEOUT_MS),
        });
        let outcome = engine.traverse(self, &[seed.to_string()]).await;
        match outcome.failure {
            Some(e) => Err(e),
            None => Ok(outcome.hits),
        }
    }
}
