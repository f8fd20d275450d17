use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::embeddings::Embedder;
use crate::ranking::scorer::Scorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Wraps the chat model client built at startup.
    pub scorer: Arc<Scorer>,
    pub embedder: Arc<dyn Embedder>,
}
