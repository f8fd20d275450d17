//! Axum route handlers for the Embedding API.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::embedding::{EmbeddingBatchReport, EmbeddingReport, DEFAULT_EMBED_TEXT};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmbedBatchRequest {
    pub texts: Vec<String>,
}

/// POST /api/v1/embeddings
///
/// Embeds one text. An omitted `text` embeds the default sample text.
pub async fn handle_embed(
    State(state): State<AppState>,
    Json(request): Json<EmbedRequest>,
) -> Result<Json<EmbeddingReport>, AppError> {
    let text = request
        .text
        .unwrap_or_else(|| DEFAULT_EMBED_TEXT.to_string());
    if text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let embedding = state.embedder.embed_query(&text).await?;
    info!(
        "Generated embedding: {} dimensions with {}",
        embedding.len(),
        state.embedder.model_name()
    );

    Ok(Json(EmbeddingReport {
        model: state.embedder.model_name().to_string(),
        dimensions: embedding.len(),
        embedding,
    }))
}

/// POST /api/v1/embeddings/batch
///
/// Embeds several texts; the client splits them into chunk-size batches.
pub async fn handle_embed_batch(
    State(state): State<AppState>,
    Json(request): Json<EmbedBatchRequest>,
) -> Result<Json<EmbeddingBatchReport>, AppError> {
    if request.texts.is_empty() {
        return Err(AppError::Validation("texts cannot be empty".to_string()));
    }

    let embeddings = state.embedder.embed_documents(&request.texts).await?;

    Ok(Json(EmbeddingBatchReport {
        model: state.embedder.model_name().to_string(),
        dimensions: embeddings.first().map(Vec::len).unwrap_or(0),
        embeddings,
    }))
}
