//! Embedding provider implementations and factory.

pub mod hashing;
pub mod http_provider;

use std::sync::Arc;

use deepmemory_core::config::EmbeddingProviderConfig;
use deepmemory_core::errors::{ConfigError, EmbeddingError};
use deepmemory_core::traits::IEmbeddingProvider;

pub use hashing::HashingProvider;
pub use http_provider::HttpProvider;

/// Build the provider named by `config.provider`.
pub fn create_provider(
    config: &EmbeddingProviderConfig,
) -> Result<Arc<dyn IEmbeddingProvider>, ConfigError> {
    config.validate()?;
    match config.provider.as_str() {
        "hashing" => Ok(Arc::new(HashingProvider::new(config.dimensions))),
        "http" => {
            let endpoint = config.endpoint.clone().ok_or_else(|| ConfigError::Parse {
                reason: "embedding.endpoint is required for the http provider".to_string(),
            })?;
            let api_key = std::env::var(&config.api_key_env).ok();
            let provider = HttpProvider::new(endpoint, config.model.clone(), config.dimensions)
                .map_err(|e: EmbeddingError| ConfigError::Parse {
                    reason: e.to_string(),
                })?
                .with_api_key(api_key)
                .with_max_retries(config.max_retries);
            Ok(Arc::new(provider))
        }
        other => Err(ConfigError::Parse {
            reason: format!("unknown embedding provider: {other}"),
        }),
    }
}
