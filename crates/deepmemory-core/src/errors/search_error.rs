/// Vector index errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("dimension mismatch in namespace {namespace}: expected {expected}, got {actual}")]
    DimensionMismatch {
        namespace: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid vector {id} in namespace {namespace}: {reason}")]
    InvalidVector {
        namespace: String,
        id: String,
        reason: String,
    },

    #[error("invalid metadata filter: {reason}")]
    InvalidFilter { reason: String },

    #[error("index backend failed: {reason}")]
    BackendFailed { reason: String },

    #[error("search timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}
