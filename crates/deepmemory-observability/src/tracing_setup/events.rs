//! Structured log events for key retrieval operations.
//!
//! Each function emits a `tracing` event with structured fields.

use deepmemory_core::models::{BranchFailure, BranchKind};

/// Log a branch that degraded to empty.
pub fn branch_degraded(query_id: &str, failure: &BranchFailure) {
    let (branch, target) = match &failure.branch {
        BranchKind::Embedding { dimension } => ("embedding", dimension.as_str()),
        BranchKind::Search { namespace } => ("search", namespace.as_str()),
        BranchKind::Graph => ("graph", ""),
    };
    tracing::warn!(
        event = "branch_degraded",
        query_id = %query_id,
        branch = branch,
        target = %target,
        reason = %failure.reason,
        "retrieval branch degraded"
    );
}

/// Log a seed entity absent from the graph. Not a failure.
pub fn seed_not_found(seed: &str) {
    tracing::debug!(event = "seed_not_found", seed = %seed, "seed not in graph");
}

/// Log a completed retrieval.
pub fn retrieval_completed(query_id: &str, fused: usize, returned: usize, warnings: usize) {
    tracing::info!(
        event = "retrieval_completed",
        query_id = %query_id,
        fused = fused,
        returned = returned,
        warnings = warnings,
        "retrieval completed"
    );
}

/// Log a retrieval in which every executed branch failed.
pub fn all_sources_failed(query_id: &str, failures: &[BranchFailure]) {
    let reasons: Vec<String> = failures.iter().map(ToString::to_string).collect();
    tracing::error!(
        event = "all_sources_failed",
        query_id = %query_id,
        failures = ?reasons,
        "all retrieval sources failed"
    );
}
