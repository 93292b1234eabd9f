use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::RetrievalError;

/// Which fan-out branch of a query a failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BranchKind {
    Embedding { dimension: String },
    Search { namespace: String },
    Graph,
}

/// A branch that returned nothing because of an error, as opposed to a
/// legitimate empty result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchFailure {
    pub branch: BranchKind,
    pub reason: String,
}

impl BranchFailure {
    pub fn embedding(dimension: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            branch: BranchKind::Embedding {
                dimension: dimension.into(),
            },
            reason: reason.to_string(),
        }
    }

    pub fn search(namespace: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            branch: BranchKind::Search {
                namespace: namespace.into(),
            },
            reason: reason.to_string(),
        }
    }

    pub fn graph(reason: impl fmt::Display) -> Self {
        Self {
            branch: BranchKind::Graph,
            reason: reason.to_string(),
        }
    }

    /// The taxonomy error this failure corresponds to.
    pub fn to_error(&self) -> RetrievalError {
        match &self.branch {
            BranchKind::Embedding { dimension } => RetrievalError::EmbeddingUnavailable {
                dimension: dimension.clone(),
                reason: self.reason.clone(),
            },
            BranchKind::Search { namespace } => RetrievalError::SearchBackendUnavailable {
                namespace: namespace.clone(),
                reason: self.reason.clone(),
            },
            BranchKind::Graph => RetrievalError::GraphBackendUnavailable {
                reason: self.reason.clone(),
            },
        }
    }
}

impl fmt::Display for BranchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            BranchKind::Embedding { dimension } => {
                write!(f, "embedding[{dimension}]: {}", self.reason)
            }
            BranchKind::Search { namespace } => write!(f, "search[{namespace}]: {}", self.reason),
            BranchKind::Graph => write!(f, "graph: {}", self.reason),
        }
    }
}
