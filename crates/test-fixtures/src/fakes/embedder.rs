use std::time::Duration;

use async_trait::async_trait;
use deepmemory_core::errors::EmbeddingError;
use deepmemory_core::traits::IEmbeddingProvider;

/// Returns the same vector for every text.
pub struct FixedEmbedder {
    dims: usize,
}

impl FixedEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

#[async_trait]
impl IEmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(vec![1.0 / (self.dims.max(1) as f32).sqrt(); self.dims])
    }
    fn dimensions(&self) -> usize {
        self.dims
    }
    fn name(&self) -> &str {
        "fixed"
    }
}

/// Fails every call.
pub struct FailingEmbedder;

#[async_trait]
impl IEmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::ProviderUnavailable {
            provider: "failing".to_string(),
        })
    }
    fn dimensions(&self) -> usize {
        0
    }
    fn name(&self) -> &str {
        "failing"
    }
    fn is_available(&self) -> bool {
        false
    }
}

/// Answers after a fixed delay.
pub struct SlowEmbedder {
    dims: usize,
    delay: Duration,
}

impl SlowEmbedder {
    pub fn new(dims: usize, delay: Duration) -> Self {
        Self { dims, delay }
    }
}

#[async_trait]
impl IEmbeddingProvider for SlowEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![0.0; self.dims])
    }
    fn dimensions(&self) -> usize {
        self.dims
    }
    fn name(&self) -> &str {
        "slow"
    }
}
