//! petgraph-backed graph store with MERGE semantics.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use deepmemory_core::errors::GraphError;
use deepmemory_core::models::{GraphEdge, GraphNode, GraphStats, Metadata, Neighbor, NodeKey};
use deepmemory_core::traits::IGraphStore;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};

use super::identifier::validate_identifier;

/// The underlying directed graph type.
type PropertyGraph = StableGraph<GraphNode, GraphEdge, Directed>;

/// A walk between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPath {
    /// Nodes in walk order, both endpoints included.
    pub nodes: Vec<GraphNode>,
    /// `edges[i]` connects `nodes[i]` and `nodes[i + 1]`.
    pub edges: Vec<GraphEdge>,
}

impl GraphPath {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Nodes within some radius of a center, plus every edge among them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Full graph contents for snapshotting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub node_count: usize,
    pub edge_count: usize,
}

#[derive(Default)]
struct GraphState {
    graph: PropertyGraph,
    /// (label, name) → NodeIndex for O(1) lookup.
    node_index: HashMap<NodeKey, NodeIndex>,
    /// (from, to, rel_type) → EdgeIndex for MERGE on edges.
    edge_index: HashMap<(NodeIndex, NodeIndex, String), EdgeIndex>,
}

impl GraphState {
    /// Nodes named `name`, sorted by key.
    fn indices_named(&self, name: &str) -> Vec<NodeIndex> {
        let mut found: Vec<(&NodeKey, NodeIndex)> = self
            .node_index
            .iter()
            .filter(|(key, _)| key.name == name)
            .map(|(key, idx)| (key, *idx))
            .collect();
        found.sort_by(|a, b| a.0.cmp(b.0));
        found.into_iter().map(|(_, idx)| idx).collect()
    }

    /// Edges touching `idx` in either direction, each listed once, with the
    /// index of the opposite endpoint.
    fn incident(&self, idx: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        let outgoing = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target()));
        let incoming = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| e.source() != e.target())
            .map(|e| (e.id(), e.source()));
        outgoing.chain(incoming).collect()
    }

    /// Undirected BFS from every node in `starts`, up to `radius` hops.
    /// Returns each reached node with its parent edge.
    fn bfs(
        &self,
        starts: &[NodeIndex],
        radius: usize,
    ) -> HashMap<NodeIndex, Option<(EdgeIndex, NodeIndex)>> {
        let mut parents = HashMap::new();
        let mut queue = VecDeque::new();
        for &s in starts {
            if parents.insert(s, None).is_none() {
                queue.push_back((s, 0));
            }
        }
        while let Some((current, depth)) = queue.pop_front() {
            if depth >= radius {
                continue;
            }
            for (edge, other) in self.incident(current) {
                if let std::collections::hash_map::Entry::Vacant(slot) = parents.entry(other) {
                    slot.insert(Some((edge, current)));
                    queue.push_back((other, depth + 1));
                }
            }
        }
        parents
    }

    fn node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    fn edge(&self, idx: EdgeIndex) -> Option<&GraphEdge> {
        self.graph.edge_weight(idx)
    }

    fn nodes(&self) -> Vec<GraphNode> {
        self.graph
            .node_indices()
            .filter_map(|i| self.node(i).cloned())
            .collect()
    }

    fn edges(&self) -> Vec<GraphEdge> {
        self.graph
            .edge_indices()
            .filter_map(|i| self.edge(i).cloned())
            .collect()
    }
}

/// In-process property graph.
///
/// Nodes merge on (label, name) and edges on (from, to, rel_type). Node writes
/// stamp `created` on insert and `last_updated` on merge; edge writes stamp
/// `created` and `last_seen`.
pub struct InMemoryGraphStore {
    state: RwLock<GraphState>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(GraphState::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GraphState>, GraphError> {
        self.state.read().map_err(|e| GraphError::BackendFailed {
            reason: format!("graph lock poisoned: {e}"),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GraphState>, GraphError> {
        self.state.write().map_err(|e| GraphError::BackendFailed {
            reason: format!("graph lock poisoned: {e}"),
        })
    }

    /// Shortest undirected path between any node named `from` and any node
    /// named `to`, over every relationship type.
    pub fn shortest_path(&self, from: &str, to: &str) -> Result<Option<GraphPath>, GraphError> {
        let state = self.read()?;
        let starts = state.indices_named(from);
        let targets: HashSet<NodeIndex> = state.indices_named(to).into_iter().collect();
        if starts.is_empty() || targets.is_empty() {
            return Ok(None);
        }

        let parents = state.bfs(&starts, usize::MAX);
        // Closest target by hop count; ties go to the lowest key.
        let hops = |idx: NodeIndex| {
            let mut n = 0;
            let mut cur = idx;
            while let Some(Some((_, prev))) = parents.get(&cur) {
                n += 1;
                cur = *prev;
            }
            n
        };
        let end = targets
            .iter()
            .filter(|t| parents.contains_key(*t))
            .min_by_key(|t| (hops(**t), state.node(**t).map(GraphNode::key)));
        let Some(&end) = end else {
            return Ok(None);
        };

        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut cur = end;
        loop {
            if let Some(node) = state.node(cur) {
                nodes.push(node.clone());
            }
            match parents.get(&cur) {
                Some(Some((edge, prev))) => {
                    if let Some(edge) = state.edge(*edge) {
                        edges.push(edge.clone());
                    }
                    cur = *prev;
                }
                _ => break,
            }
        }
        nodes.reverse();
        edges.reverse();
        Ok(Some(GraphPath { nodes, edges }))
    }

    /// Every node within `radius` hops of nodes named `name`, and all edges
    /// among those nodes.
    pub fn neighborhood(&self, name: &str, radius: usize) -> Result<Subgraph, GraphError> {
        let state = self.read()?;
        let starts = state.indices_named(name);
        if starts.is_empty() {
            return Ok(Subgraph::default());
        }

        let reached = state.bfs(&starts, radius);
        let mut nodes: Vec<GraphNode> = reached
            .keys()
            .filter_map(|idx| state.node(*idx).cloned())
            .collect();
        nodes.sort_by_key(GraphNode::key);

        let mut edges: Vec<GraphEdge> = state
            .graph
            .edge_indices()
            .filter(|e| {
                state
                    .graph
                    .edge_endpoints(*e)
                    .is_some_and(|(a, b)| reached.contains_key(&a) && reached.contains_key(&b))
            })
            .filter_map(|e| state.edge(e).cloned())
            .collect();
        edges.sort_by(|a, b| (&a.from, &a.to, &a.rel_type).cmp(&(&b.from, &b.to, &b.rel_type)));

        Ok(Subgraph { nodes, edges })
    }

    /// Export every node and edge.
    pub fn export_state(&self) -> Result<GraphSnapshot, GraphError> {
        let state = self.read()?;
        let mut nodes = state.nodes();
        nodes.sort_by_key(GraphNode::key);
        let mut edges = state.edges();
        edges.sort_by(|a, b| (&a.from, &a.to, &a.rel_type).cmp(&(&b.from, &b.to, &b.rel_type)));
        Ok(GraphSnapshot {
            node_count: nodes.len(),
            edge_count: edges.len(),
            nodes,
            edges,
        })
    }

    /// Remove every node and edge.
    pub fn clear(&self) -> Result<(), GraphError> {
        let mut state = self.write()?;
        *state = GraphState::default();
        Ok(())
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IGraphStore for InMemoryGraphStore {
    async fn upsert_node(
        &self,
        label: &str,
        name: &str,
        properties: Metadata,
    ) -> Result<GraphNode, GraphError> {
        validate_identifier(label)?;
        let key = NodeKey::new(label, name);
        let mut state = self.write()?;

        if let Some(&idx) = state.node_index.get(&key) {
            let node = state
                .graph
                .node_weight_mut(idx)
                .ok_or_else(|| GraphError::BackendFailed {
                    reason: format!("index points at missing node {key}"),
                })?;
            node.properties = properties;
            node.last_updated = Some(Utc::now());
            return Ok(node.clone());
        }

        let node = GraphNode {
            label: label.to_string(),
            name: name.to_string(),
            properties,
            created: Utc::now(),
            last_updated: None,
        };
        let idx = state.graph.add_node(node.clone());
        state.node_index.insert(key, idx);
        Ok(node)
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
        validate_identifier(from_label)?;
        validate_identifier(to_label)?;
        validate_identifier(rel_type)?;

        let from = NodeKey::new(from_label, from_name);
        let to = NodeKey::new(to_label, to_name);
        let mut state = self.write()?;

        let lookup = |state: &GraphState, key: &NodeKey| {
            state
                .node_index
                .get(key)
                .copied()
                .ok_or_else(|| GraphError::NodeNotFound {
                    label: key.label.clone(),
                    name: key.name.clone(),
                })
        };
        let a = lookup(&*state, &from)?;
        let b = lookup(&*state, &to)?;
        let merge_key = (a, b, rel_type.to_string());

        if let Some(&eidx) = state.edge_index.get(&merge_key) {
            let edge = state
                .graph
                .edge_weight_mut(eidx)
                .ok_or_else(|| GraphError::BackendFailed {
                    reason: format!("index points at missing edge {from}-[{rel_type}]->{to}"),
                })?;
            edge.properties = properties;
            edge.last_seen = Some(Utc::now());
            return Ok(edge.clone());
        }

        let edge = GraphEdge {
            from,
            to,
            rel_type: rel_type.to_string(),
            properties,
            created: Utc::now(),
            last_seen: None,
        };
        let eidx = state.graph.add_edge(a, b, edge.clone());
        state.edge_index.insert(merge_key, eidx);
        Ok(edge)
    }

    async fn find_nodes(&self, name: &str) -> Result<Vec<GraphNode>, GraphError> {
        let state = self.read()?;
        Ok(state
            .indices_named(name)
            .into_iter()
            .filter_map(|idx| state.node(idx).cloned())
            .collect())
    }

    async fn neighbors(
        &self,
        key: &NodeKey,
        allowed: &[String],
    ) -> Result<Vec<Neighbor>, GraphError> {
        let state = self.read()?;
        let Some(&idx) = state.node_index.get(key) else {
            return Err(GraphError::NodeNotFound {
                label: key.label.clone(),
                name: key.name.clone(),
            });
        };

        let mut out: Vec<Neighbor> = state
            .incident(idx)
            .into_iter()
            .filter_map(|(eidx, other)| {
                let edge = state.edge(eidx)?;
                if !allowed.is_empty() && !allowed.iter().any(|t| t == &edge.rel_type) {
                    return None;
                }
                Some(Neighbor {
                    edge: edge.clone(),
                    node: state.node(other)?.clone(),
                })
            })
            .collect();
        // Stable discovery order regardless of insertion history.
        out.sort_by(|a, b| {
            (a.node.key(), &a.edge.rel_type).cmp(&(b.node.key(), &b.edge.rel_type))
        });
        Ok(out)
    }

    async fn stats(&self) -> Result<GraphStats, GraphError> {
        let state = self.read()?;
        let mut stats = GraphStats {
            node_count: state.graph.node_count(),
            edge_count: state.graph.edge_count(),
            ..Default::default()
        };
        for node in state.nodes() {
            *stats.labels.entry(node.label).or_default() += 1;
        }
        for edge in state.edges() {
            *stats.relationship_types.entry(edge.rel_type).or_default() += 1;
        }
        Ok(stats)
    }

    fn name(&self) -> &str {
        "in-memory-graph"
    }
}
