/// Graph store errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    #[error("node not found: {label}:{name}")]
    NodeNotFound { label: String, name: String },

    #[error("invalid identifier {value:?}: {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("graph backend failed: {reason}")]
    BackendFailed { reason: String },

    #[error("traversal timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}
