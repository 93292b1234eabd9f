mod config_error;
mod embedding_error;
mod graph_error;
mod retrieval_error;
mod search_error;

pub use config_error::ConfigError;
pub use embedding_error::EmbeddingError;
pub use graph_error::GraphError;
pub use retrieval_error::RetrievalError;
pub use search_error::SearchError;

/// Top-level error for every fallible DeepMemory operation.
#[derive(Debug, thiserror::Error)]
pub enum DeepMemoryError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),
}

impl From<serde_json::Error> for DeepMemoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type DeepMemoryResult<T> = Result<T, DeepMemoryError>;
