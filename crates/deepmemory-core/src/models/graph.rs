use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Metadata;

/// Node identity: nodes merge on (label, name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub label: String,
    pub name: String,
}

impl NodeKey {
    pub fn new(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.label, self.name)
    }
}

/// A labeled property-graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub label: String,
    pub name: String,
    #[serde(default)]
    pub properties: Metadata,
    pub created: DateTime<Utc>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl GraphNode {
    pub fn key(&self) -> NodeKey {
        NodeKey::new(&self.label, &self.name)
    }
}

/// A typed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub rel_type: String,
    #[serde(default)]
    pub properties: Metadata,
    pub created: DateTime<Utc>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl GraphEdge {
    /// The endpoint opposite `key`, treating the edge as undirected.
    pub fn other_end(&self, key: &NodeKey) -> &NodeKey {
        if &self.from == key {
            &self.to
        } else {
            &self.from
        }
    }
}

/// A node adjacent to some origin node, with the connecting edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub edge: GraphEdge,
    pub node: GraphNode,
}

/// One node reached by a traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalHit {
    pub node: GraphNode,
    /// Minimum hop count from any seed. Always at least 1.
    pub distance: usize,
    /// Edges walked from the seed to this node, in order.
    pub path: Vec<GraphEdge>,
    /// Name of the seed this node was first reached from.
    pub seed: String,
}

/// Graph-wide counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub labels: BTreeMap<String, usize>,
    pub relationship_types: BTreeMap<String, usize>,
}
