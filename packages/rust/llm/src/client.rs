//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use newsgraph_shared::{NewsGraphError, Result};

/// Connection settings for the chat API.
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    /// API base URL (e.g. `https://api.openai.com/v1`).
    pub api_base: String,
    /// Model name sent with every request.
    pub model: String,
    /// Bearer token.
    pub api_key: String,
    /// Maximum completion tokens per call.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Thin client for `POST {api_base}/chat/completions`.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    config: ChatClientConfig,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl ChatClient {
    pub fn new(config: ChatClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NewsGraphError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Send one system+user exchange and return the completion text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NewsGraphError::Llm(format!("chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NewsGraphError::Llm(format!(
                "chat API returned HTTP {status}: {}",
                &detail[..detail.len().min(200)]
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| NewsGraphError::Llm(format!("invalid chat response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| NewsGraphError::Llm("chat response had no choices".into()))?;

        debug!(model = %self.config.model, len = content.len(), "chat completion received");
        Ok(content)
    }
}
