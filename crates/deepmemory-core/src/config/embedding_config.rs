use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingProviderConfig {
    /// Provider: "hashing" (offline, deterministic) or "http".
    pub provider: String,
    /// Endpoint for the "http" provider (OpenAI-compatible `/v1/embeddings`).
    pub endpoint: Option<String>,
    /// Model name sent to the endpoint.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Vector length produced by the provider.
    pub dimensions: usize,
    /// Retries after the first failed request.
    pub max_retries: u32,
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self {
            provider: defaults::DEFAULT_EMBEDDING_PROVIDER.to_string(),
            endpoint: None,
            model: defaults::DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key_env: defaults::DEFAULT_EMBEDDING_API_KEY_ENV.to_string(),
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            max_retries: defaults::DEFAULT_EMBEDDING_MAX_RETRIES,
        }
    }
}

impl EmbeddingProviderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimensions == 0 {
            return Err(ConfigError::ZeroValue {
                field: "embedding.dimensions".to_string(),
            });
        }
        Ok(())
    }
}
