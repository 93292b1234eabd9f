use async_trait::async_trait;

use crate::constants::UPSERT_BATCH_SIZE;
use crate::errors::SearchError;
use crate::models::{IndexStats, MetadataFilter, SearchHit, VectorRecord};

/// Namespaced nearest-neighbor index.
///
/// Each namespace holds vectors of one fixed length. Implementations return
/// hits ordered by descending similarity and never more than `top_k`.
#[async_trait]
pub trait IVectorIndex: Send + Sync {
    /// Insert or replace one vector.
    async fn upsert(&self, namespace: &str, record: VectorRecord) -> Result<(), SearchError>;

    /// Insert or replace many vectors, in chunks of [`UPSERT_BATCH_SIZE`].
    /// Returns the number written.
    async fn upsert_batch(
        &self,
        namespace: &str,
        records: Vec<VectorRecord>,
    ) -> Result<usize, SearchError> {
        let mut written = 0;
        for chunk in records.chunks(UPSERT_BATCH_SIZE) {
            for record in chunk {
                self.upsert(namespace, record.clone()).await?;
                written += 1;
            }
        }
        Ok(written)
    }

    /// Nearest neighbors of `vector` within `namespace`.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchHit>, SearchError>;

    /// Remove vectors by id. Returns how many existed.
    async fn delete(&self, namespace: &str, ids: &[String]) -> Result<usize, SearchError>;

    /// Drop a namespace and everything in it. Returns how many vectors it held.
    async fn delete_namespace(&self, namespace: &str) -> Result<usize, SearchError>;

    async fn stats(&self) -> Result<IndexStats, SearchError>;

    /// Whether `query` applies metadata filters itself. When it does not,
    /// callers over-fetch and filter the hits themselves, so a namespace whose
    /// matches all rank below that window still comes back short.
    fn supports_filtering(&self) -> bool {
        true
    }

    fn name(&self) -> &str;
}
