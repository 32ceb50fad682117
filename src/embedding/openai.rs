use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::embeddings::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::debug;

use super::{Embedder, EmbeddingError};
use crate::config::{Config, DEFAULT_EMBEDDING_BATCH_SIZE};

/// Embedder backed by an OpenAI-compatible embeddings endpoint.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dim: usize,
    batch_size: usize,
}

impl std::fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("model", &self.model)
            .field("dim", &self.dim)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl OpenAiEmbedder {
    pub fn new(client: Client<OpenAIConfig>, model: impl Into<String>, dim: usize) -> Self {
        Self {
            client,
            model: model.into(),
            dim,
            batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }

    /// Caps the texts sent per request; 0 is treated as 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let mut openai = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
        if let Some(base) = &config.openai_base_url {
            openai = openai.with_api_base(base.clone());
        }
        Self::new(
            Client::with_config(openai),
            config.embedding_model.clone(),
            config.embedding_dim as usize,
        )
        .with_batch_size(config.embedding_batch_size)
    }

    async fn embed_request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(EmbeddingInput::StringArray(texts.to_vec()))
            .build()?;

        let response = self.client.embeddings().create(request).await?;
        debug!(
            model = %response.model,
            inputs = texts.len(),
            "Embedding batch completed"
        );

        if response.data.len() != texts.len() {
            return Err(EmbeddingError::MalformedResponse {
                reason: format!(
                    "expected {} vectors, got {}",
                    texts.len(),
                    response.data.len()
                ),
            });
        }

        let mut data = response.data;
        data.sort_by_key(|e| e.index);

        data.into_iter()
            .map(|e| {
                if e.embedding.len() != self.dim {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.dim,
                        actual: e.embedding.len(),
                    });
                }
                Ok(e.embedding)
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_request(batch).await?);
        }
        Ok(vectors)
    }
}
