//! Text embedding backends for the chunk index.
//!
//! - [`OpenAiEmbedder`] calls an OpenAI-compatible `/embeddings` endpoint.
//! - [`HashedEmbedder`] is a deterministic bag-of-words feature hasher; it needs no
//!   network and is what tests and offline runs use.

mod error;
mod hashed;
mod openai;

pub use error::EmbeddingError;
pub use hashed::HashedEmbedder;
pub use openai::OpenAiEmbedder;

use async_trait::async_trait;

/// Produces fixed-size vectors for text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Output dimension of every vector.
    fn dimension(&self) -> usize;

    /// Largest number of texts callers should pass to one `embed_batch` call.
    fn max_batch_size(&self) -> usize {
        usize::MAX
    }

    /// Embeds every text, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or(EmbeddingError::MalformedResponse {
            reason: "no vector returned for single input".to_string(),
        })
    }
}
