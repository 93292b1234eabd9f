use async_trait::async_trait;

use crate::errors::GraphError;
use crate::models::{GraphEdge, GraphNode, GraphStats, Metadata, Neighbor, NodeKey};

/// Labeled property graph.
///
/// Nodes are identified by (label, name); edges by (from, to, rel_type).
/// Writes merge: an existing node or edge has its properties replaced rather
/// than being duplicated.
#[async_trait]
pub trait IGraphStore: Send + Sync {
    async fn upsert_node(
        &self,
        label: &str,
        name: &str,
        properties: Metadata,
    ) -> Result<GraphNode, GraphError>;

    /// Merge a directed edge of `rel_type` between two existing nodes.
    /// Fails with `NodeNotFound` when either endpoint is missing.
    async fn upsert_edge(
        &self,
        from_label: &str,
        from_name: &str,
        to_label: &str,
        to_name: &str,
        rel_type: &str,
        properties: Metadata,
    ) -> Result<GraphEdge, GraphError>;

    /// All nodes with this name, across labels.
    async fn find_nodes(&self, name: &str) -> Result<Vec<GraphNode>, GraphError>;

    /// Nodes one hop from `key` in either direction over edges whose type is
    /// in `allowed`. An empty `allowed` permits every type.
    async fn neighbors(&self, key: &NodeKey, allowed: &[String])
        -> Result<Vec<Neighbor>, GraphError>;

    async fn stats(&self) -> Result<GraphStats, GraphError>;

    fn name(&self) -> &str;
}
