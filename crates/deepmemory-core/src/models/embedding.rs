use serde::{Deserialize, Serialize};

/// One query vector for one semantic dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionEmbedding {
    /// Configured dimension name, e.g. `sentiment`.
    pub dimension: String,
    /// Index namespace this vector is searched against.
    pub namespace: String,
    pub vector: Vec<f32>,
}

impl DimensionEmbedding {
    /// Vector length (D).
    pub fn dimensionality(&self) -> usize {
        self.vector.len()
    }
}
