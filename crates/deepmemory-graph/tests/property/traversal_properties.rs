//! Property tests for the Graph Traversal Engine over random graphs.

use std::collections::HashSet;

use proptest::prelude::*;

use deepmemory_core::models::{Metadata, TraversalHit};
use deepmemory_core::traits::IGraphStore;
use deepmemory_graph::{GraphTraversalEngine, InMemoryGraphStore, TraversalConfig};

const REL_TYPES: [&str; 3] = ["KNOWS", "RELATES_TO", "BLOCKS"];

fn run<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(fut)
}

async fn build_graph(n: usize, edges: &[(usize, usize, usize)]) -> InMemoryGraphStore {
    let store = InMemoryGraphStore::new();
    for i in 0..n {
        store
            .upsert_node("Node", &format!("n{i}"), Metadata::new())
            .await
            .unwrap();
    }
    for &(a, b, rel) in edges {
        store
            .upsert_edge(
                "Node",
                &format!("n{a}"),
                "Node",
                &format!("n{b}"),
                REL_TYPES[rel],
                Metadata::new(),
            )
            .await
            .unwrap();
    }
    store
}

fn traverse(
    n: usize,
    edges: &[(usize, usize, usize)],
    seeds: &[usize],
    config: TraversalConfig,
) -> Vec<TraversalHit> {
    run(async {
        let store = build_graph(n, edges).await;
        let seeds: Vec<String> = seeds.iter().map(|s| format!("n{s}")).collect();
        let outcome = GraphTraversalEngine::new(config).traverse(&store, &seeds).await;
        assert!(!outcome.is_failed());
        outcome.hits
    })
}

fn edge_strategy(n: usize) -> impl Strategy<Value = Vec<(usize, usize, usize)>> {
    prop::collection::vec((0..n, 0..n, 0..REL_TYPES.len()), 0..n * 3)
}

proptest! {
    #[test]
    fn nodes_are_unique_and_exclude_seeds(
        edges in edge_strategy(15),
        seeds in prop::collection::vec(0usize..15, 1..4),
    ) {
        let config = TraversalConfig { relationship_whitelist: Vec::new(), ..Default::default() };
        let hits = traverse(15, &edges, &seeds, config);
        let mut seen = HashSet::new();
        for hit in &hits {
            prop_assert!(seen.insert(hit.node.key()), "duplicate {}", hit.node.key());
            let name = &hit.node.name;
            let is_seed = seeds.iter().any(|s| &format!("n{s}") == name);
            prop_assert!(!is_seed);
        }
    }

    #[test]
    fn distances_are_non_decreasing_and_bounded(
        edges in edge_strategy(20),
        seed in 0usize..20,
        max_depth in 1usize..5,
    ) {
        let config = TraversalConfig {
            max_depth,
            relationship_whitelist: Vec::new(),
            ..Default::default()
        };
        let hits = traverse(20, &edges, &[seed], config);
        for pair in hits.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
        }
        for hit in &hits {
            prop_assert!(hit.distance >= 1 && hit.distance <= max_depth);
            prop_assert_eq!(hit.path.len(), hit.distance);
        }
    }

    #[test]
    fn respects_node_cap(
        edges in edge_strategy(20),
        seed in 0usize..20,
        max_nodes in 1usize..8,
    ) {
        let config = TraversalConfig {
            max_nodes,
            max_depth: 10,
            relationship_whitelist: Vec::new(),
            ..Default::default()
        };
        let hits = traverse(20, &edges, &[seed], config);
        prop_assert!(hits.len() <= max_nodes);
    }

    #[test]
    fn paths_only_use_whitelisted_types(
        edges in edge_strategy(15),
        seed in 0usize..15,
    ) {
        let config = TraversalConfig {
            relationship_whitelist: vec!["KNOWS".to_string()],
            ..Default::default()
        };
        let hits = traverse(15, &edges, &[seed], config);
        for hit in &hits {
            prop_assert!(hit.path.iter().all(|e| e.rel_type == "KNOWS"));
        }
    }
}
