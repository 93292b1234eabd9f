use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Metadata;

/// A vector to store in one namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, values: Vec<f32>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            values,
            metadata,
        }
    }
}

/// One nearest-neighbor match from a single namespace query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub namespace: String,
    /// Raw similarity as reported by the index. Never used for fusion.
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Per-namespace index counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceStats {
    pub vector_count: usize,
    /// Dimensionality fixed by the first vector written, if any.
    pub dimension: Option<usize>,
}

/// Whole-index counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_vector_count: usize,
    pub namespaces: BTreeMap<String, NamespaceStats>,
}
