pub mod defaults;
mod embedding_config;
mod retrieval_config;

pub use embedding_config::EmbeddingProviderConfig;
pub use retrieval_config::{DimensionSpec, QuotaPlan, RetrievalConfig, TimeoutConfig};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepMemoryConfig {
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingProviderConfig,
}

impl DeepMemoryConfig {
    /// Parse from TOML. Missing sections and fields take their defaults.
    /// The result is validated before it is returned.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retrieval.validate()?;
        self.embedding.validate()
    }
}
