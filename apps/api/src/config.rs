use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::LlmSettings;

const DEFAULT_MODEL: &str = "amazon/nova-2-lite-v1:free";
const DEFAULT_BASE: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Application configuration loaded from environment variables.
/// Nothing is required: a missing API key degrades every LLM task to its local tier.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub openrouter_base: String,
    pub llm_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            openrouter_model: optional_env("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openrouter_base: optional_env("OPENROUTER_BASE")
                .unwrap_or_else(|| DEFAULT_BASE.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30)?,
            cache_ttl_secs: parse_env("LLM_CACHE_TTL_SECS", 3600)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Settings handed to the completion client at startup.
    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            api_key: self.openrouter_api_key.clone(),
            model: self.openrouter_model.clone(),
            endpoint: self.openrouter_base.clone(),
            timeout: Duration::from_secs(self.llm_timeout_secs),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Reads an env var, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
