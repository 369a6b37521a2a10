mod config;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::interview::{InterviewPipeline, SessionStore};
use crate::llm_client::cache::ResponseCache;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rehearse API v{}", env!("CARGO_PKG_VERSION"));

    // Shared response cache, injected into the client
    let cache = Arc::new(ResponseCache::new(config.cache_ttl()));
    info!("LLM response cache initialized (ttl: {}s)", config.cache_ttl_secs);

    let llm = LlmClient::new(config.llm_settings(), cache)?;
    if llm.is_available() {
        info!("LLM client initialized (model: {})", llm.model());
    } else {
        warn!("OPENROUTER_API_KEY not set: all LLM tasks will use local fallbacks");
    }

    let state = AppState {
        pipeline: Arc::new(InterviewPipeline::new(llm)),
        sessions: SessionStore::new(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
