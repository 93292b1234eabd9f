//! Integration tests for the Graph Traversal Engine against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use deepmemory_core::errors::GraphError;
use deepmemory_core::models::Metadata;
use deepmemory_core::traits::IGraphStore;
use deepmemory_graph::{
    GraphStoreExt, GraphTraversalEngine, InMemoryGraphStore, TraversalConfig,
};
use test_fixtures::fakes::{
    FailingGraphStore, NeighborFailingGraphStore, SeedFailingGraphStore, SlowGraphStore,
};
use test_fixtures::{load_fixture, Scenario};

async fn jordy_store() -> InMemoryGraphStore {
    let scenario: Scenario = load_fixture("scenarios/jordy_launch.json");
    let store = InMemoryGraphStore::new();
    scenario.graph.populate(&store).await.unwrap();
    store
}

/// Chain a - b - c - d, all RELATES_TO.
async fn chain_store() -> InMemoryGraphStore {
    let store = InMemoryGraphStore::new();
    for name in ["a", "b", "c", "d"] {
        store.upsert_node("Concept", name, Metadata::new()).await.unwrap();
    }
    for (from, to) in [("a", "b"), ("b", "c"), ("c", "d")] {
        store
            .upsert_edge("Concept", from, "Concept", to, "RELATES_TO", Metadata::new())
            .await
            .unwrap();
    }
    store
}

fn seeds(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn names(hits: &[deepmemory_core::models::TraversalHit]) -> Vec<(&str, usize)> {
    hits.iter().map(|h| (h.node.name.as_str(), h.distance)).collect()
}

#[tokio::test]
async fn jordy_scenario_follows_whitelist_only() {
    let store = jordy_store().await;
    let engine = GraphTraversalEngine::default();

    let outcome = engine.traverse(&store, &seeds(&["Jordy"])).await;

    assert!(!outcome.is_failed());
    assert_eq!(names(&outcome.hits), vec![("Launch", 1), ("Q3 Roadmap", 2)]);
    assert!(outcome.missing_seeds.is_empty());
    assert_eq!(outcome.max_depth_reached(), 2);

    let roadmap = &outcome.hits[1];
    assert_eq!(roadmap.seed, "Jordy");
    let rels: Vec<&str> = roadmap.path.iter().map(|e| e.rel_type.as_str()).collect();
    assert_eq!(rels, vec!["WORKS_ON", "RELATES_TO"]);
}

#[tokio::test]
async fn empty_whitelist_follows_every_type() {
    let store = jordy_store().await;
    let engine = GraphTraversalEngine::new(TraversalConfig {
        relationship_whitelist: Vec::new(),
        ..Default::default()
    });

    let outcome = engine.traverse(&store, &seeds(&["Jordy"])).await;
    let found: Vec<&str> = outcome.hits.iter().map(|h| h.node.name.as_str()).collect();
    assert!(found.contains(&"Sam"));
}

#[tokio::test]
async fn disallowed_edge_is_not_expanded_through() {
    // Sam only reaches Launch through a whitelisted edge; Jordy-Sam is not.
    let store = jordy_store().await;
    store
        .upsert_edge("Person", "Sam", "Concept", "Q3 Roadmap", "KNOWS", Metadata::new())
        .await
        .unwrap();
    let engine = GraphTraversalEngine::new(TraversalConfig {
        max_depth: 3,
        ..Default::default()
    });

    let outcome = engine.traverse(&store, &seeds(&["Jordy"])).await;
    // Sam is reached at depth 3 via Roadmap, never at depth 1 via DISAGREES_WITH.
    let sam = outcome.hits.iter().find(|h| h.node.name == "Sam").unwrap();
    assert_eq!(sam.distance, 3);
}

#[tokio::test]
async fn seeds_share_one_visited_set() {
    let store = chain_store().await;
    let engine = GraphTraversalEngine::new(TraversalConfig {
        max_depth: 3,
        relationship_whitelist: Vec::new(),
        ..Default::default()
    });

    let outcome = engine.traverse(&store, &seeds(&["a", "d"])).await;

    // Seeds are excluded; b and c each appear once at their minimum depth.
    assert_eq!(names(&outcome.hits), vec![("b", 1), ("c", 1)]);
    assert_eq!(outcome.hits[0].seed, "a");
    assert_eq!(outcome.hits[1].seed, "d");
}

#[tokio::test]
async fn depth_is_bounded() {
    let store = chain_store().await;
    let engine = GraphTraversalEngine::new(TraversalConfig {
        max_depth: 1,
        ..Default::default()
    });

    let outcome = engine.traverse(&store, &seeds(&["a"])).await;
    assert_eq!(names(&outcome.hits), vec![("b", 1)]);
}

#[tokio::test]
async fn max_nodes_caps_output() {
    let store = InMemoryGraphStore::new();
    store.upsert_node("Person", "hub", Metadata::new()).await.unwrap();
    for i in 0..10 {
        let leaf = format!("leaf-{i:02}");
        store.upsert_node("Person", &leaf, Metadata::new()).await.unwrap();
        store
            .upsert_edge("Person", "hub", "Person", &leaf, "KNOWS", Metadata::new())
            .await
            .unwrap();
    }
    let engine = GraphTraversalEngine::new(TraversalConfig {
        max_nodes: 3,
        ..Default::default()
    });

    let outcome = engine.traverse(&store, &seeds(&["hub"])).await;
    assert_eq!(outcome.hits.len(), 3);
    assert_eq!(outcome.hits[0].node.name, "leaf-00");
}

#[tokio::test]
async fn missing_seed_is_reported_not_failed() {
    let store = jordy_store().await;
    let engine = GraphTraversalEngine::default();

    let outcome = engine.traverse(&store, &seeds(&["Nobody", "Jordy"])).await;

    assert!(!outcome.is_failed());
    assert_eq!(outcome.missing_seeds, vec!["Nobody".to_string()]);
    assert_eq!(outcome.hits.len(), 2);
}

#[tokio::test]
async fn no_seeds_yields_empty_outcome() {
    let store = jordy_store().await;
    let outcome = GraphTraversalEngine::default().traverse(&store, &[]).await;
    assert!(!outcome.is_failed());
    assert!(outcome.hits.is_empty());
}

#[tokio::test]
async fn partial_seed_failure_keeps_other_seeds() {
    let inner: Arc<dyn IGraphStore> = Arc::new(jordy_store().await);
    let store = SeedFailingGraphStore::new(inner, ["Sam"]);

    let outcome = GraphTraversalEngine::default()
        .traverse(&store, &seeds(&["Jordy", "Sam"]))
        .await;

    assert!(!outcome.is_failed());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("Sam"));
    assert_eq!(outcome.hits.len(), 2);
}

#[tokio::test]
async fn every_seed_failing_fails_traversal() {
    let inner: Arc<dyn IGraphStore> = Arc::new(jordy_store().await);
    let store = SeedFailingGraphStore::new(inner, ["Jordy"]);

    let outcome = GraphTraversalEngine::default()
        .traverse(&store, &seeds(&["Jordy"]))
        .await;

    assert!(matches!(outcome.failure, Some(GraphError::BackendFailed { .. })));
    assert!(outcome.hits.is_empty());
}

#[tokio::test]
async fn neighbor_errors_with_no_hits_fail_traversal() {
    let inner: Arc<dyn IGraphStore> = Arc::new(jordy_store().await);
    let store = NeighborFailingGraphStore::new(inner);

    let outcome = GraphTraversalEngine::default()
        .traverse(&store, &seeds(&["Jordy"]))
        .await;

    assert!(matches!(outcome.failure, Some(GraphError::BackendFailed { .. })));
    assert!(outcome.hits.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(!outcome.is_degraded());
}

#[tokio::test]
async fn neighbor_error_after_hits_degrades_traversal() {
    let inner: Arc<dyn IGraphStore> = Arc::new(jordy_store().await);
    let store = NeighborFailingGraphStore::for_nodes(inner, ["Launch"]);

    let outcome = GraphTraversalEngine::default()
        .traverse(&store, &seeds(&["Jordy"]))
        .await;

    assert!(!outcome.is_failed());
    assert!(outcome.is_degraded());
    assert_eq!(names(&outcome.hits), vec![("Launch", 1)]);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("Launch"));
}

#[tokio::test]
async fn unreachable_store_fails_traversal() {
    let outcome = GraphTraversalEngine::default()
        .traverse(&FailingGraphStore, &seeds(&["Jordy"]))
        .await;
    assert!(outcome.is_failed());
}

#[tokio::test(start_paused = true)]
async fn slow_store_times_out() {
    let inner: Arc<dyn IGraphStore> = Arc::new(jordy_store().await);
    let store = SlowGraphStore::new(inner, Duration::from_secs(30));
    let engine = GraphTraversalEngine::new(TraversalConfig {
        timeout: Duration::from_millis(200),
        ..Default::default()
    });

    let outcome = engine.traverse(&store, &seeds(&["Jordy"])).await;

    assert!(matches!(
        outcome.failure,
        Some(GraphError::Timeout { after_ms: 200 })
    ));
    assert!(outcome.hits.is_empty());
}

#[tokio::test]
async fn extension_traverse_single_seed() {
    let store = jordy_store().await;

    let all = store.traverse("Jordy", 1, None).await.unwrap();
    let mut found: Vec<&str> = all.iter().map(|h| h.node.name.as_str()).collect();
    found.sort_unstable();
    assert_eq!(found, vec!["Launch", "Sam"]);

    let whitelist = vec!["WORKS_ON".to_string()];
    let filtered = store.traverse("Jordy", 3, Some(&whitelist)).await.unwrap();
    assert_eq!(names(&filtered), vec![("Launch", 1)]);
}

#[tokio::test]
async fn extension_traverse_surfaces_failure() {
    let err = FailingGraphStore.traverse("Jordy", 2, None).await.unwrap_err();
    assert!(matches!(err, GraphError::BackendFailed { .. }));
}

#[tokio::test]
async fn upsert_edge_requires_both_endpoints() {
    let store = jordy_store().await;
    let err = store
        .upsert_edge("Person", "Jordy", "Person", "Ghost", "KNOWS", Metadata::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound { ref name, .. } if name == "Ghost"));
}

#[tokio::test]
async fn shortest_path_crosses_any_relationship() {
    let store = jordy_store().await;
    let path = store.shortest_path("Sam", "Q3 Roadmap").unwrap().unwrap();
    let hops: Vec<&str> = path.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(hops, vec!["Sam", "Jordy", "Launch", "Q3 Roadmap"]);
    assert_eq!(path.len(), 3);
}
