use async_trait::async_trait;

use super::{Embedder, EmbeddingError};
use crate::hashing::token_feature;

/// Default dimension of the hashed embedder.
pub const HASHED_EMBEDDING_DIM: usize = 256;

/// Signed feature hashing over lowercase word tokens, L2-normalised.
///
/// Identical texts map to identical vectors (cosine distance 0); texts with
/// disjoint vocabularies land near distance 1. Text without any alphanumeric
/// token maps to the zero vector.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    dim: usize,
}

impl HashedEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let (bucket, sign) = token_feature(&token.to_lowercase(), self.dim);
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(HASHED_EMBEDDING_DIM)
    }
}

#[async_trait]
impl Embedder for HashedEmbedder {
    fn dimension(&self) -> usize {
        self.dim
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_sync(t)).collect())
    }
}
