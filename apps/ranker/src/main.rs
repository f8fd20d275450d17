mod config;
mod documents;
mod embedding;
mod errors;
mod llm_client;
mod ranking;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::embeddings::EmbeddingClient;
use crate::llm_client::LlmClient;
use crate::ranking::scorer::Scorer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Ranker v{}", env!("CARGO_PKG_VERSION"));

    // Initialize chat model client and scorer
    let llm = LlmClient::new(
        config.chat.clone(),
        config.chat_temperature,
        config.chat_max_tokens,
    )?;
    let scorer = Arc::new(Scorer::new(Arc::new(llm)));
    info!("Chat client initialized (deployment: {})", scorer.model_name());

    // Initialize embedding client
    let embedder = EmbeddingClient::new(config.embedding.clone(), config.embedding_chunk_size)?;
    info!(
        "Embedding client initialized (deployment: {}, chunk size: {})",
        config.embedding.deployment, config.embedding_chunk_size
    );

    if config.scorer_debug {
        info!("Scorer debug enabled: raw model output is returned with every ranking");
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        scorer,
        embedder: Arc::new(embedder),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
