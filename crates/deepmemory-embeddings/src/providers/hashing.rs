//! Hashed term-frequency provider.
//!
//! Generates fixed-dimension vectors from term frequency scores. No model,
//! no network. Deterministic, so it doubles as the test embedder.

use std::collections::HashMap;

use async_trait::async_trait;
use deepmemory_core::errors::EmbeddingError;
use deepmemory_core::traits::IEmbeddingProvider;

/// Hashed term-frequency embedding provider.
///
/// Hashes terms into fixed-dimension buckets and weights them by term
/// frequency scaled by `1 + ln(term length)`. There is no corpus, so no
/// document-frequency term. Not as semantically rich as neural embeddings, but always
/// available.
#[derive(Debug, Clone)]
pub struct HashingProvider {
    dimensions: usize,
}

impl HashingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Hash a term into a bucket index using FNV-1a.
    fn hash_term(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % dims as u64) as usize
    }

    /// Lowercase alphanumeric terms of two or more characters.
    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.chars().count() >= 2)
            .map(|s| s.to_lowercase())
            .collect()
    }

    /// Build the L2-normalized vector for `text`.
    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vec;
        }
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return vec;
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for tok in &tokens {
            *tf.entry(tok.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        for (term, count) in &tf {
            let freq = count / total;
            // Longer terms carry more signal than short function words.
            let length_weight = 1.0 + (term.len() as f32).ln();
            vec[Self::hash_term(term, self.dimensions)] += freq * length_weight;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

#[async_trait]
impl IEmbeddingProvider for HashingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn empty_text_returns_zero_vector() {
        let p = HashingProvider::new(128);
        let v = p.embed("").await.unwrap();
        assert_eq!(v.len(), 128);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn output_is_normalized() {
        let p = HashingProvider::new(256);
        let v = p.embed("quarterly launch planning with Jordy").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "expected unit norm, got {norm}");
    }

    #[tokio::test]
    async fn deterministic() {
        let p = HashingProvider::new(64);
        assert_eq!(
            p.embed("same words").await.unwrap(),
            p.embed("same words").await.unwrap()
        );
    }

    #[tokio::test]
    async fn batch_matches_individual() {
        let p = HashingProvider::new(128);
        let texts = vec!["hello world".to_string(), "launch delay".to_string()];
        let batch = p.embed_batch(&texts).await.unwrap();
        for (i, text) in texts.iter().enumerate() {
            assert_eq!(batch[i], p.embed(text).await.unwrap());
        }
    }

    #[test]
    fn longer_terms_weigh_more() {
        let p = HashingProvider::new(256);
        let v = p.vectorize("ab abcdefgh");
        let short = v[HashingProvider::hash_term("ab", 256)];
        let long = v[HashingProvider::hash_term("abcdefgh", 256)];
        let expected = (1.0 + 2f32.ln()) / (1.0 + 8f32.ln());
        assert!((short / long - expected).abs() < 1e-5);
    }

    #[test]
    fn similar_texts_have_higher_cosine() {
        let p = HashingProvider::new(256);
        let a = p.vectorize("launch deadline pressure");
        let b = p.vectorize("launch deadline slipping");
        let c = p.vectorize("weekend hiking trip");
        assert!(cosine(&a, &b) > cosine(&a, &c));
    }
}
