use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from an embedding provider.
///
/// These never cross the pipeline boundary: the ranker catches them and
/// falls back to heuristic scoring for the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding API error: {0}")]
    Api(String),

    #[error("malformed embedding response: {0}")]
    Response(String),
}

/// A source of fixed-dimension text embeddings.
///
/// Implementations must be deterministic for identical input. The trait is
/// async to accommodate API-backed providers; a local model can simply
/// return ready values.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts, preserving input order.
    ///
    /// The default implementation embeds sequentially; API-backed providers
    /// should override with a real batch request.
    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingObject>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingObject {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedding provider speaking the OpenAI `POST {base_url}/embeddings`
/// wire format, which several hosted and local servers expose.
pub struct OpenAiEmbedding {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiEmbedding {
    /// Create a provider for `base_url` (including the `/v1` prefix).
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    async fn request(
        &self,
        input: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError> {
        let body = EmbeddingsRequest {
            model: &self.model,
            input,
        };

        let mut request = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let parsed: EmbeddingsResponse = response.json().await?;
        if parsed.data.len() != input.len() {
            return Err(EmbeddingError::Response(format!(
                "expected {} embeddings, got {}",
                input.len(),
                parsed.data.len()
            )));
        }

        // The API may reorder entries; `index` is authoritative.
        let mut out = vec![Vec::new(); input.len()];
        for object in parsed.data {
            let slot = out.get_mut(object.index).ok_or_else(|| {
                EmbeddingError::Response(format!(
                    "embedding index {} out of range",
                    object.index
                ))
            })?;
            *slot = object.embedding;
        }

        Ok(out)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbeddingError> {
        let input = [text.to_string()];
        let mut embeddings = self.request(&input).await?;
        Ok(embeddings.remove(0))
    }

    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
