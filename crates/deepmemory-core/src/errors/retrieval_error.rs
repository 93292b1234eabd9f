use crate::models::BranchFailure;

use super::ConfigError;

/// Caller-visible retrieval errors.
///
/// The first three variants describe a single degraded branch. They are
/// recorded on the evidence package as warnings and only surface on their own
/// when a caller inspects a [`BranchFailure`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding unavailable for dimension {dimension}: {reason}")]
    EmbeddingUnavailable { dimension: String, reason: String },

    #[error("search backend unavailable for namespace {namespace}: {reason}")]
    SearchBackendUnavailable { namespace: String, reason: String },

    #[error("graph backend unavailable: {reason}")]
    GraphBackendUnavailable { reason: String },

    #[error("all {} retrieval sources failed: {}", .failures.len(), summarize(.failures))]
    AllSourcesFailed { failures: Vec<BranchFailure> },

    #[error("configuration invalid: {0}")]
    ConfigurationInvalid(#[from] ConfigError),

    #[error("retrieval cancelled")]
    Cancelled,
}

fn summarize(failures: &[BranchFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
