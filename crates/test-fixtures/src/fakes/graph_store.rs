use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deepmemory_core::errors::GraphError;
use deepmemory_core::models::{GraphEdge, GraphNode, GraphStats, Metadata, Neighbor, NodeKey};
use deepmemory_core::traits::IGraphStore;

fn unreachable_store() -> GraphError {
    GraphError::BackendFailed {
        reason: "graph store unreachable".to_string(),
    }
}

/// Fails every call.
pub struct FailingGraphStore;

#[async_trait]
impl IGraphStore for FailingGraphStore {
    async fn upsert_node(
        &self,
        _label: &str,
        _name: &str,
        _properties: Metadata,
    ) -> Result<GraphNode, GraphError> {
        Err(unreachable_store())
    }

    async fn upsert_edge(
        &self,
        _from_label: &str,
        _from_name: &str,
        _to_label: &str,
        _to_name: &str,
        _rel_type: &str,
        _properties: Metadata,
    ) -> Result<GraphEdge, GraphError> {
        Err(unreachable_store())
    }

    async fn find_nodes(&self, _name: &str) -> Result<Vec<GraphNode>, GraphError> {
        Err(unreachable_store())
    }

    async fn neighbors(
        &self,
        _key: &NodeKey,
        _allowed: &[String],
    ) -> Result<Vec<Neighbor>, GraphError> {
        Err(unreachable_store())
    }

    async fn stats(&self) -> Result<GraphStats, GraphError> {
        Err(unreachable_store())
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Delegates to `inner`, but seed lookups for the listed names fail.
pub struct SeedFailingGraphStore {
    inner: Arc<dyn IGraphStore>,
    failing: HashSet<String>,
}

impl SeedFailingGraphStore {
    pub fn new<I, S>(inner: Arc<dyn IGraphStore>, failing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner,
            failing: failing.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl IGraphStore for SeedFailingGraphStore {
    async fn upsert_node(
        &self,
        label: &str,
        name: &str,
        properties: Metadata,
    ) -> Result<GraphNode, GraphError> {
        self.inner.upsert_node(label, name, properties).await
    }

    async fn upsert_edge(
        &self,
        from_label: &str,
        from_name: &str,
        to_label: &str,
        to_name: &str,
        rel_type: &str,
        properties: Metadata,
    ) -> Result<GraphEdge, GraphError> {
        self.inner
            .upsert_edge(from_label, from_name, to_label, to_name, rel_type, properties)
            .await
    }

    async fn find_nodes(&self, name: &str) -> Result<Vec<GraphNode>, GraphError> {
        if self.failing.contains(name) {
            return Err(unreachable_store());
        }
        self.inner.find_nodes(name).await
    }

    async fn neighbors(
        &self,
        key: &NodeKey,
        allowed: &[String],
    ) -> Result<Vec<Neighbor>, GraphError> {
        self.inner.neighbors(key, allowed).await
    }

    async fn stats(&self) -> Result<GraphStats, GraphError> {
        self.inner.stats().await
    }

    fn name(&self) -> &str {
        "seed-failing"
    }
}

/// Delegates to `inner` after sleeping on every neighbor lookup.
pub struct SlowGraphStore {
    inner: Arc<dyn IGraphStore>,
    delay: Duration,
}

impl SlowGraphStore {
    pub fn new(inner: Arc<dyn IGraphStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl IGraphStore for SlowGraphStore {
    async fn upsert_node(
        &self,
        label: &str,
        name: &str,
        properties: Metadata,
    ) -> Result<GraphNode, GraphError> {
        self.inner.upsert_node(label, name, properties).await
    }

    async fn upsert_edge(
        &self,
        from_label: &str,
        from_name: &str,
        to_label: &str,
        to_name: &str,
        rel_type: &str,
        properties: Metadata,
    ) -> Result<GraphEdge, GraphError> {
        self.inner
            .upsert_edge(from_label, from_name, to_label, to_name, rel_type, properties)
            .await
    }

    async fn find_nodes(&self, name: &str) -> Result<Vec<GraphNode>, GraphError> {
        self.inner.find_nodes(name).await
    }

    async fn neighbors(
        &self,
        key: &NodeKey,
        allowed: &[String],
    ) -> Result<Vec<Neighbor>, GraphError> {
        tokio::time::sleep(self.delay).await;
        self.inner.neighbors(key, allowed).await
    }

    async fn stats(&self) -> Result<GraphStats, GraphError> {
        self.inner.stats().await
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Delegates to `inner`, but neighbor lookups fail. With no names given every
/// lookup fails; otherwise only lookups from the listed node names do.
pub struct NeighborFailingGraphStore {
    inner: Arc<dyn IGraphStore>,
    failing: HashSet<String>,
}

impl NeighborFailingGraphStore {
    pub fn new(inner: Arc<dyn IGraphStore>) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
        }
    }

    pub fn for_nodes<I, S>(inner: Arc<dyn IGraphStore>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner,
            failing: names.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl IGraphStore for NeighborFailingGraphStore {
    async fn upsert_node(
        &self,
        label: &str,
        name: &str,
        properties: Metadata,
    ) -> Result<GraphNode, GraphError> {
        self.inner.upsert_node(label, name, properties).await
    }

    async fn upsert_edge(
        &self,
        from_label: &str,
        from_name: &str,
        to_label: &str,
        to_name: &str,
        rel_type: &str,
        properties: Metadata,
    ) -> Result<GraphEdge, GraphError> {
        self.inner
            .upsert_edge(from_label, from_name, to_label, to_name, rel_type, properties)
            .await
    }

    async fn find_nodes(&self, name: &str) -> Result<Vec<GraphNode>, GraphError> {
        self.inner.find_nodes(name).await
    }

    async fn neighbors(
        &self,
        key: &NodeKey,
        allowed: &[String],
    ) -> Result<Vec<Neighbor>, GraphError> {
        if self.failing.is_empty() || self.failing.contains(&key.name) {
            return Err(unreachable_store());
        }
        self.inner.neighbors(key, allowed).await
    }

    async fn stats(&self) -> Result<GraphStats, GraphError> {
        self.inner.stats().await
    }

    fn name(&self) -> &str {
        "neighbor-failing"
    }
}
