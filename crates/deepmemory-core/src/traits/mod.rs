mod embedding;
mod graph_store;
mod vector_index;

pub use embedding::IEmbeddingProvider;
pub use graph_store::IGraphStore;
pub use vector_index::IVectorIndex;
