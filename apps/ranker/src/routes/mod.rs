pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::embedding::handlers as embedding;
use crate::ranking::handlers as ranking;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Ranking API
        .route("/api/v1/rankings", post(ranking::handle_rank))
        .route("/api/v1/rankings/export", post(ranking::handle_export))
        // Embedding API
        .route("/api/v1/embeddings", post(embedding::handle_embed))
        .route("/api/v1/embeddings/batch", post(embedding::handle_embed_batch))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
