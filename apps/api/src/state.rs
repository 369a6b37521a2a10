use std::sync::Arc;

use crate::config::Config;
use crate::interview::{InterviewPipeline, SessionStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InterviewPipeline>,
    pub sessions: SessionStore,
    pub config: Config,
}

/// State with no LLM credential, so every task resolves locally.
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let config = Config {
        openrouter_api_key: None,
        openrouter_model: "test-model".to_string(),
        openrouter_base: "http://127.0.0.1:9/unused".to_string(),
        llm_timeout_secs: 5,
        cache_ttl_secs: 3600,
        port: 0,
        rust_log: "info".to_string(),
    };
    AppState {
        pipeline: Arc::new(InterviewPipeline::new(
            crate::llm_client::test_support::offline_client(),
        )),
        sessions: SessionStore::new(),
        config,
    }
}
