//! Azure OpenAI embeddings client.
//!
//! `embed_documents` sends its inputs in batches of `chunk_size`, one request
//! per batch, and returns the vectors in input order.

use std::future::Future;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{api_error, build_http_client, deployment_url, LlmError};
use crate::config::AzureDeployment;

pub type Embedding = Vec<f32>;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Embedding>, LlmError>;

    async fn embed_query(&self, text: &str) -> Result<Embedding, LlmError> {
        self.embed_documents(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyContent)
    }

    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Embedding,
    index: usize,
}

#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    deployment: AzureDeployment,
    chunk_size: usize,
}

impl EmbeddingClient {
    pub fn new(deployment: AzureDeployment, chunk_size: usize) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client()?,
            deployment,
            chunk_size: chunk_size.max(1),
        })
    }

    async fn embed_chunk(&self, chunk: &[String]) -> Result<Vec<Embedding>, LlmError> {
        let response = self
            .client
            .post(deployment_url(&self.deployment, "embeddings"))
            .header("api-key", &self.deployment.api_key)
            .json(&EmbeddingRequest { input: chunk })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: EmbeddingResponse = response.json().await?;
        order_by_index(body.data, chunk.len())
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Embedding>, LlmError> {
        embed_in_chunks(texts, self.chunk_size, |chunk| self.embed_chunk(chunk)).await
    }

    fn model_name(&self) -> &str {
        &self.deployment.deployment
    }
}

/// Runs `embed_chunk` sequentially over batches of at most `chunk_size` texts
/// and concatenates the results.
pub(crate) async fn embed_in_chunks<'a, F, Fut>(
    texts: &'a [String],
    chunk_size: usize,
    mut embed_chunk: F,
) -> Result<Vec<Embedding>, LlmError>
where
    F: FnMut(&'a [String]) -> Fut,
    Fut: Future<Output = Result<Vec<Embedding>, LlmError>>,
{
    let chunk_size = chunk_size.max(1);
    let mut vectors = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(chunk_size) {
        vectors.extend(embed_chunk(chunk).await?);
    }
    debug!(
        "Embedded {} texts in {} requests",
        texts.len(),
        texts.len().div_ceil(chunk_size)
    );
    Ok(vectors)
}

/// Puts response items back in request order; the service may return them shuffled.
fn order_by_index(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Embedding>, LlmError> {
    if data.len() != expected {
        return Err(LlmError::Malformed(format!(
            "expected {expected} embeddings, got {}",
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    if let Some((position, item)) = data.iter().enumerate().find(|(i, d)| d.index != *i) {
        return Err(LlmError::Malformed(format!(
            "embedding index {} where {position} was expected",
            item.index
        )));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Embeds each text as `[byte length]` and records the batch sizes it was asked for.
    pub struct RecordingEmbedder {
        pub chunk_size: usize,
        pub batches: Mutex<Vec<usize>>,
    }

    impl RecordingEmbedder {
        pub fn new(chunk_size: usize) -> Self {
            Self {
                chunk_size,
                batches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Embedder for RecordingEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Embedding>, LlmError> {
            embed_in_chunks(texts, self.chunk_size, |chunk| {
                self.batches.lock().unwrap().push(chunk.len());
                let vectors: Vec<Embedding> = chunk.iter().map(|t| vec![t.len() as f32]).collect();
                async move { Ok(vectors) }
            })
            .await
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }
}
