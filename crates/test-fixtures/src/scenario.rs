//! Typed scenario fixtures.

use std::collections::BTreeMap;

use deepmemory_core::errors::GraphError;
use deepmemory_core::models::{Metadata, SearchHit};
use deepmemory_core::traits::IGraphStore;
use serde::Deserialize;

/// One retrieval scenario: query, seeds, scripted per-namespace hits, graph.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub query: String,
    #[serde(default)]
    pub seeds: Vec<String>,
    /// Hits each namespace returns, best first.
    #[serde(default)]
    pub namespaces: BTreeMap<String, Vec<HitFixture>>,
    #[serde(default)]
    pub graph: GraphFixture,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HitFixture {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphFixture {
    #[serde(default)]
    pub nodes: Vec<NodeFixture>,
    #[serde(default)]
    pub edges: Vec<EdgeFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeFixture {
    pub label: String,
    pub name: String,
    #[serde(default)]
    pub properties: Metadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeFixture {
    pub from_label: String,
    pub from_name: String,
    pub to_label: String,
    pub to_name: String,
    pub rel_type: String,
    #[serde(default)]
    pub properties: Metadata,
}

impl Scenario {
    /// Scripted hits keyed by namespace, in the shape an index returns them.
    pub fn hits(&self) -> BTreeMap<String, Vec<SearchHit>> {
        self.namespaces
            .iter()
            .map(|(ns, hits)| {
                let hits = hits
                    .iter()
                    .map(|h| SearchHit {
                        id: h.id.clone(),
                        namespace: ns.clone(),
                        score: h.score,
                        metadata: h.metadata.clone(),
                    })
                    .collect();
                (ns.clone(), hits)
            })
            .collect()
    }
}

impl GraphFixture {
    /// Write every node, then every edge, into `store`.
    pub async fn populate<S: IGraphStore + ?Sized>(&self, store: &S) -> Result<(), GraphError> {
        for node in &self.nodes {
            store
                .upsert_node(&node.label, &node.name, node.properties.clone())
                .await?;
        }
        for edge in &self.edges {
            store
                .upsert_edge(
                    &edge.from_label,
                    &edge.from_name,
                    &edge.to_label,
                    &edge.to_name,
                    &edge.rel_type,
                    edge.properties.clone(),
                )
                .await?;
        }
        Ok(())
    }
}
