//! In-process namespaced vector index: DashMap of namespaces, brute-force
//! cosine scan parallelised with rayon.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use deepmemory_core::errors::SearchError;
use deepmemory_core::models::{
    IndexStats, MetadataFilter, NamespaceStats, SearchHit, VectorRecord,
};
use deepmemory_core::traits::IVectorIndex;
use rayon::prelude::*;

#[derive(Debug, Default)]
struct Namespace {
    /// Fixed by the first vector written.
    dimension: Option<usize>,
    /// Ordered by id so equal scores come back in a stable order.
    records: BTreeMap<String, VectorRecord>,
}

impl Namespace {
    fn check_dimension(&self, namespace: &str, actual: usize) -> Result<(), SearchError> {
        match self.dimension {
            Some(expected) if expected != actual => Err(SearchError::DimensionMismatch {
                namespace: namespace.to_string(),
                expected,
                actual,
            }),
            _ => Ok(()),
        }
    }
}

/// NaN or infinite components would poison every cosine score they touch.
fn check_finite(namespace: &str, id: &str, values: &[f32]) -> Result<(), SearchError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(at) => Err(SearchError::InvalidVector {
            namespace: namespace.to_string(),
            id: id.to_string(),
            reason: format!("non-finite component at index {at}"),
        }),
        None => Ok(()),
    }
}

/// Thread-safe in-memory vector index with one partition per namespace.
#[derive(Clone, Default)]
pub struct InMemoryVectorIndex {
    namespaces: Arc<DashMap<String, Namespace>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vectors in `namespace`.
    pub fn len(&self, namespace: &str) -> usize {
        self.namespaces
            .get(namespace)
            .map(|ns| ns.records.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, namespace: &str) -> bool {
        self.len(namespace) == 0
    }

    /// Fetch one stored record.
    pub fn get(&self, namespace: &str, id: &str) -> Option<VectorRecord> {
        self.namespaces
            .get(namespace)
            .and_then(|ns| ns.records.get(id).cloned())
    }

    pub fn namespace_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }
}

/// Cosine similarity between two vectors. Zero when either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)) as f32
}

#[async_trait]
impl IVectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, namespace: &str, record: VectorRecord) -> Result<(), SearchError> {
        if record.values.is_empty() {
            return Err(SearchError::DimensionMismatch {
                namespace: namespace.to_string(),
                expected: self
                    .namespaces
                    .get(namespace)
                    .and_then(|ns| ns.dimension)
                    .unwrap_or(1),
                actual: 0,
            });
        }
        check_finite(namespace, &record.id, &record.values)?;
        let mut ns = self.namespaces.entry(namespace.to_string()).or_default();
        ns.check_dimension(namespace, record.values.len())?;
        ns.dimension = Some(record.values.len());
        ns.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn upsert_batch(
        &self,
        namespace: &str,
        records: Vec<VectorRecord>,
    ) -> Result<usize, SearchError> {
        for record in &records {
            check_finite(namespace, &record.id, &record.values)?;
        }
        let mut ns = self.namespaces.entry(namespace.to_string()).or_default();
        // Validate the whole batch before writing any of it.
        let expected = ns.dimension.or_else(|| records.first().map(|r| r.values.len()));
        if let Some(expected) = expected {
            for record in &records {
                if record.values.len() != expected || expected == 0 {
                    return Err(SearchError::DimensionMismatch {
                        namespace: namespace.to_string(),
                        expected,
                        actual: record.values.len(),
                    });
                }
            }
            ns.dimension = Some(expected);
        }
        let written = records.len();
        for record in records {
            ns.records.insert(record.id.clone(), record);
        }
        Ok(written)
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let Some(ns) = self.namespaces.get(namespace) else {
            return Ok(Vec::new());
        };
        ns.check_dimension(namespace, vector.len())?;
        check_finite(namespace, "query", vector)?;
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let records: Vec<&VectorRecord> = ns.records.values().collect();
        let mut scored: Vec<(f32, &VectorRecord)> = records
            .par_iter()
            .filter(|r| filter.map_or(true, |f| f.matches(&r.metadata)))
            .map(|r| (cosine_similarity(vector, &r.values), *r))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(score, record)| SearchHit {
                id: record.id.clone(),
                namespace: namespace.to_string(),
                score,
                metadata: record.metadata.clone(),
            })
            .collect())
    }

    async fn delete(&self, namespace: &str, ids: &[String]) -> Result<usize, SearchError> {
        let Some(mut ns) = self.namespaces.get_mut(namespace) else {
            return Ok(0);
        };
        Ok(ids.iter().filter(|id| ns.records.remove(*id).is_some()).count())
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<usize, SearchError> {
        Ok(self
            .namespaces
            .remove(namespace)
            .map(|(_, ns)| ns.records.len())
            .unwrap_or(0))
    }

    async fn stats(&self) -> Result<IndexStats, SearchError> {
        let namespaces: BTreeMap<String, NamespaceStats> = self
            .namespaces
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    NamespaceStats {
                        vector_count: entry.records.len(),
                        dimension: entry.dimension,
                    },
                )
            })
            .collect();
        Ok(IndexStats {
            total_vector_count: namespaces.values().map(|s| s.vector_count).sum(),
            namespaces,
        })
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
