//! LLM client: OpenAI-compatible chat completions, one prompt in, text out.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;

/// Seam between the turn runner and the generative-language provider: a text
/// prompt in, a text completion out. No streaming, no structured output.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Request body for chat completions (OpenAI format).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Response: choices[0].message.content.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for chat completions.
pub struct LlmClient {
    client: reqwest::Client,
    inference_url: String,
    model: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(inference_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            inference_url,
            model,
            api_key,
        }
    }

    /// Client from resolved simulation config (API key from config or env).
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.inference_url.clone(),
            config.model.clone(),
            config.resolve_api_key(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionModel for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
        };
        let mut req = self
            .client
            .post(&self.inference_url)
            .json(&body)
            .header("Content-Type", "application/json");
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("LLM API error {}: {}", status, text));
        }
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("LLM response parse error: {}; body: {}", e, text))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("LLM response has no choices"))?;
        choice
            .message
            .content
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow::anyhow!("LLM response has no text content"))
    }
}
