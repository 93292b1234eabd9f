//! HTTP embedding provider for OpenAI-compatible `/v1/embeddings` endpoints.
//!
//! Works against hosted APIs and local inference servers alike. Includes
//! retry with exponential backoff.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use deepmemory_core::errors::EmbeddingError;
use deepmemory_core::traits::IEmbeddingProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Base delay before the first retry. Doubles on each further attempt.
const RETRY_BASE_DELAY_MS: u64 = 100;

/// HTTP embedding provider with retry.
pub struct HttpProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
    max_retries: u32,
    available: AtomicBool,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// Outcome of one HTTP attempt.
enum Attempt {
    Done(Vec<Vec<f32>>),
    Retry(EmbeddingError),
    Fatal(EmbeddingError),
}

impl HttpProvider {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .build()
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("HTTP client error: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
            dimensions,
            max_retries: 3,
            available: AtomicBool::new(true),
        })
    }

    /// Bearer token sent with each request. Blank keys are ignored.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Reset availability after the endpoint has recovered.
    pub fn reset_availability(&self) {
        self.available.store(true, Ordering::Relaxed);
    }

    /// Send an embedding request with retry and exponential backoff.
    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if !self.available.load(Ordering::Relaxed) {
            return Err(EmbeddingError::ProviderUnavailable {
                provider: self.name().to_string(),
            });
        }

        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * 2u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
                debug!(attempt, "retrying embedding request");
            }

            match self.send_request(texts).await {
                Attempt::Done(embeddings) => return Ok(embeddings),
                Attempt::Fatal(e) => return Err(e),
                Attempt::Retry(e) => {
                    warn!(attempt, error = %e, endpoint = %self.endpoint, "embedding request failed");
                    last_err = Some(e);
                }
            }
        }

        self.available.store(false, Ordering::Relaxed);
        Err(last_err.unwrap_or_else(|| EmbeddingError::InferenceFailed {
            reason: "all retries exhausted".to_string(),
        }))
    }

    async fn send_request(&self, texts: &[String]) -> Attempt {
        let mut request = self.client.post(&self.endpoint).json(&EmbedRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Retry(EmbeddingError::InferenceFailed {
                    reason: format!("HTTP error: {e}"),
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = EmbeddingError::InferenceFailed {
                reason: format!("endpoint returned {status}: {body}"),
            };
            // Client errors other than throttling will not improve on retry.
            let retryable = status.is_server_error()
                || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                || status == reqwest::StatusCode::REQUEST_TIMEOUT;
            return if retryable {
                Attempt::Retry(err)
            } else {
                Attempt::Fatal(err)
            };
        }

        let parsed: EmbedResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                return Attempt::Fatal(EmbeddingError::InferenceFailed {
                    reason: format!("JSON parse error: {e}"),
                })
            }
        };

        match self.collect(parsed, texts.len()) {
            Ok(vectors) => Attempt::Done(vectors),
            Err(e) => Attempt::Fatal(e),
        }
    }

    /// Order by the response `index` field and check every vector's length.
    fn collect(
        &self,
        mut parsed: EmbedResponse,
        expected_count: usize,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if parsed.data.len() != expected_count {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!(
                    "expected {expected_count} embeddings, got {}",
                    parsed.data.len()
                ),
            });
        }
        parsed.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));

        parsed
            .data
            .into_iter()
            .map(|d| {
                if d.embedding.len() == self.dimensions {
                    Ok(d.embedding)
                } else {
                    Err(EmbeddingError::DimensionMismatch {
                        expected: self.dimensions,
                        actual: d.embedding.len(),
                    })
                }
            })
            .collect()
    }
}

#[async_trait]
impl IEmbeddingProvider for HttpProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let results = self.request_embeddings(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InferenceFailed {
                reason: "empty response".to_string(),
            })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(texts).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }
}
