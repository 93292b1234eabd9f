use deepmemory_core::errors::*;
use deepmemory_core::models::{BranchFailure, BranchKind};

#[test]
fn embedding_error_dimension_mismatch_carries_sizes() {
    let err = EmbeddingError::DimensionMismatch {
        expected: 1024,
        actual: 384,
    };
    let msg = err.to_string();
    assert!(msg.contains("1024"));
    assert!(msg.contains("384"));
}

#[test]
fn search_error_carries_namespace() {
    let err = SearchError::DimensionMismatch {
        namespace: "sentiment".into(),
        expected: 1024,
        actual: 3,
    };
    assert!(err.to_string().contains("sentiment"));
}

#[test]
fn graph_error_node_not_found_carries_key() {
    let err = GraphError::NodeNotFound {
        label: "Person".into(),
        name: "Jordy".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("Person"));
    assert!(msg.contains("Jordy"));
}

#[test]
fn config_error_quota_sum_carries_value() {
    let err = ConfigError::QuotaSumInvalid { sum: 0.9 };
    assert!(err.to_string().contains("0.9"));
}

#[test]
fn all_sources_failed_lists_every_branch() {
    let err = RetrievalError::AllSourcesFailed {
        failures: vec![
            BranchFailure::search("semantic", "connection refused"),
            BranchFailure::graph("timed out"),
        ],
    };
    let msg = err.to_string();
    assert!(msg.contains("all 2 retrieval sources failed"));
    assert!(msg.contains("search[semantic]: connection refused"));
    assert!(msg.contains("graph: timed out"));
}

#[test]
fn branch_failure_maps_to_taxonomy() {
    let failure = BranchFailure::embedding("sentiment", "provider down");
    assert_eq!(
        failure.branch,
        BranchKind::Embedding {
            dimension: "sentiment".into()
        }
    );
    assert!(matches!(
        failure.to_error(),
        RetrievalError::EmbeddingUnavailable { ref dimension, .. } if dimension == "sentiment"
    ));
    assert!(matches!(
        BranchFailure::search("strategic", "x").to_error(),
        RetrievalError::SearchBackendUnavailable { .. }
    ));
    assert!(matches!(
        BranchFailure::graph("x").to_error(),
        RetrievalError::GraphBackendUnavailable { .. }
    ));
}

#[test]
fn config_error_converts_to_retrieval_error() {
    let err: RetrievalError = ConfigError::NoDimensions.into();
    assert!(matches!(err, RetrievalError::ConfigurationInvalid(_)));
    assert!(err.to_string().contains("at least one dimension"));
}

#[test]
fn subsystem_errors_convert_to_deepmemory_error() {
    let err: DeepMemoryError = SearchError::BackendFailed {
        reason: "boom".into(),
    }
    .into();
    assert!(matches!(err, DeepMemoryError::Search(_)));

    let err: DeepMemoryError = RetrievalError::Cancelled.into();
    assert_eq!(err.to_string(), "retrieval cancelled");
}

#[test]
fn serde_json_error_converts_to_serialization() {
    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: DeepMemoryError = json_err.into();
    assert!(matches!(err, DeepMemoryError::Serialization(_)));
}
