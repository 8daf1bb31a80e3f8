//! Simulation configuration: inference endpoint, model id, turn throttling.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::RuntimeSettings;
use crate::simulation::DEFAULT_TURN_DELAY_MS;

/// Default chat-completions endpoint.
pub const DEFAULT_INFERENCE_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Resolved simulation config: inference API + inter-turn delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Chat completions endpoint (e.g. OpenAI or a LiteLLM proxy).
    pub inference_url: String,
    /// Model id (e.g. `gpt-4o-mini`).
    pub model: String,
    /// API key; if None, read from env depending on URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Inter-turn delay in milliseconds (provider rate throttling).
    #[serde(default = "default_turn_delay_ms")]
    pub turn_delay_ms: u64,
}

fn default_turn_delay_ms() -> u64 {
    DEFAULT_TURN_DELAY_MS
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            turn_delay_ms: default_turn_delay_ms(),
        }
    }
}

impl SimulationConfig {
    /// Resolve from merged runtime settings with env overrides:
    /// `LITELLM_PROXY_URL` for the endpoint, `CROWDSIM_MODEL` for the model.
    pub fn from_settings(settings: &RuntimeSettings) -> Self {
        let inference_url = std::env::var("LITELLM_PROXY_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| settings.llm.inference_url.clone())
            .unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string());
        let model = std::env::var("CROWDSIM_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| settings.llm.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self {
            inference_url,
            model,
            api_key: settings.llm.api_key.clone(),
            turn_delay_ms: settings
                .simulation
                .turn_delay_ms
                .unwrap_or_else(default_turn_delay_ms),
        }
    }

    /// Resolve API key: config value, or env (`OPENAI_API_KEY` /
    /// `ANTHROPIC_API_KEY` depending on URL). Local proxies get no key; the
    /// proxy holds it and forwards to the real provider.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }
        if self.inference_url.contains("127.0.0.1") || self.inference_url.contains("localhost") {
            return None;
        }
        if self.inference_url.contains("anthropic") || self.inference_url.contains("claude") {
            return std::env::var("ANTHROPIC_API_KEY").ok();
        }
        std::env::var("OPENAI_API_KEY").ok()
    }

    pub fn turn_delay(&self) -> Duration {
        Duration::from_millis(self.turn_delay_ms)
    }
}
