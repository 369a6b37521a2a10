/// LLM Client: the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// All LLM interactions MUST go through this module.
///
/// The client never returns an error to callers. Every failure mode (missing
/// credential, transport, status, content type, response shape) is logged and
/// collapsed into an empty string, which the fallback chain reads as "no result".
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod cache;
pub mod extract;
pub mod prompts;

use cache::{fingerprint, ResponseCache};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected content type: {0}")]
    ContentType(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response has no choices")]
    MissingChoices,

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Connection settings, built once from `Config` at startup.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Everything that determines a completion. Also the cache key material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completion client with an injected response cache.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
    cache: Arc<ResponseCache>,
}

impl LlmClient {
    pub fn new(settings: LlmSettings, cache: Arc<ResponseCache>) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            settings,
            cache,
        })
    }

    /// `false` when no credential is configured; every call then returns "" immediately.
    pub fn is_available(&self) -> bool {
        self.settings
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Returns the raw assistant text, or "" on any failure.
    /// Successful, non-empty outputs are cached by request fingerprint.
    pub async fn complete(&self, request: &CompletionRequest) -> String {
        let Some(api_key) = self.settings.api_key.as_deref().filter(|k| !k.trim().is_empty())
        else {
            debug!("No LLM credential configured, skipping remote call");
            return String::new();
        };

        let key = fingerprint(request);
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        match self.call(api_key, request).await {
            Ok(text) => {
                self.cache.put(key, text.clone());
                text
            }
            Err(e) => {
                warn!("LLM call failed: {e}");
                String::new()
            }
        }
    }

    async fn call(&self, api_key: &str, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = ChatCompletionBody {
            model: &self.settings.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .header("X-Title", "Rehearse Interview Coach")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("application/json") {
            return Err(LlmError::ContentType(content_type));
        }

        let bytes = response.bytes().await?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes)?;

        let text = parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .ok_or(LlmError::MissingChoices)?
            .message
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!("LLM call succeeded: {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn offline_client() -> LlmClient {
        client_for(None, "http://127.0.0.1:9/unused".to_string())
    }

    pub fn client_for(api_key: Option<&str>, endpoint: String) -> LlmClient {
        client_with_timeout(api_key, endpoint, Duration::from_secs(5))
    }

    pub fn client_with_timeout(
        api_key: Option<&str>,
        endpoint: String,
        timeout: Duration,
    ) -> LlmClient {
        let settings = LlmSettings {
            api_key: api_key.map(str::to_string),
            model: "test-model".to_string(),
            endpoint,
            timeout,
        };
        LlmClient::new(settings, Arc::new(ResponseCache::new(Duration::from_secs(3600))))
            .expect("client builds")
    }

    /// Endpoint that accepts connections and never writes a byte back.
    pub async fn silent_endpoint() -> (String, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("listener address");
        let handle = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        (format!("http://{addr}/chat/completions"), handle)
    }

    pub fn completion_body(content: &str) -> String {
        serde_json::json!({
            "id": "gen-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }
}
