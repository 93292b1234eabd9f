//! Rank fusion over the scenario fixtures.

use std::collections::BTreeMap;

use deepmemory_core::config::RetrievalConfig;
use deepmemory_core::models::SourceId;
use deepmemory_graph::{GraphTraversalEngine, InMemoryGraphStore};
use deepmemory_retrieval::fuse_ranked_lists;
use test_fixtures::{load_fixture, Scenario};

#[tokio::test]
async fn jordy_fusion_matches_expected_order() {
    let scenario: Scenario = load_fixture("scenarios/jordy_launch.json");
    let store = InMemoryGraphStore::new();
    scenario.graph.populate(&store).await.unwrap();
    let graph = GraphTraversalEngine::default()
        .traverse(&store, &scenario.seeds)
        .await;

    let config = RetrievalConfig::default();
    let per_dimension: Vec<(String, Vec<_>)> = scenario.hits().into_iter().collect();
    let fused = fuse_ranked_lists(
        &per_dimension,
        &graph.hits,
        &config.weights,
        config.graph_weight,
        config.rrf_k,
    );

    let keys: Vec<String> = fused.iter().map(|c| c.key.to_string()).collect();
    assert_eq!(
        keys,
        vec![
            "vector:sem-1",
            "vector:sem-2",
            "vector:sem-3",
            "vector:sent-1",
            "vector:strat-1",
            "node:Project:Launch",
            "vector:sent-2",
            "vector:strat-2",
            "node:Concept:Q3 Roadmap",
            "vector:sent-3",
            "vector:strat-3",
        ]
    );

    let launch = &fused[5];
    assert_eq!(launch.graph_distance, Some(1));
    assert!(launch.is_graph_only());
    assert_eq!(launch.contribution(&SourceId::Graph).map(|c| c.rank), Some(1));
    assert_eq!(launch.metadata["seed"], "Jordy");
}

#[test]
fn unweighted_dimension_defaults_to_one() {
    let hits = vec![(
        "unlisted".to_string(),
        vec![deepmemory_core::models::SearchHit {
            id: "x".into(),
            namespace: "unlisted".into(),
            score: 0.5,
            metadata: Default::default(),
        }],
    )];
    let fused = fuse_ranked_lists(&hits, &[], &BTreeMap::new(), 0.3, 60);
    assert_eq!(fused[0].score, 1.0 / 61.0);
}

#[test]
fn empty_inputs_fuse_to_nothing() {
    assert!(fuse_ranked_lists(&[], &[], &BTreeMap::new(), 0.3, 60).is_empty());
}
