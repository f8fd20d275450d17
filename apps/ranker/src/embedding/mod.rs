// Text embedding via the hosted embedding deployment.
// All model calls go through llm_client::embeddings.

pub mod handlers;

use serde::{Deserialize, Serialize};

use crate::llm_client::embeddings::Embedding;

/// Text embedded when a request omits `text`.
pub const DEFAULT_EMBED_TEXT: &str = "HELLO , MARWADI UNIVERSITY";

/// A single embedding and the length of its vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingReport {
    pub model: String,
    pub dimensions: usize,
    pub embedding: Embedding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingBatchReport {
    pub model: String,
    pub dimensions: usize,
    pub embeddings: Vec<Embedding>,
}
