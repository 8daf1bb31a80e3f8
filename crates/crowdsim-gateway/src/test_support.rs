//! Test-only model doubles so integration tests can drive the runner and
//! gateway without a live provider.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::llm::CompletionModel;

/// Always returns the same completion; records every prompt it receives.
pub struct FixedModel {
    completion: String,
    prompts: Mutex<Vec<String>>,
}

impl FixedModel {
    pub fn new(completion: impl Into<String>) -> Self {
        Self {
            completion: completion.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionModel for FixedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if let Ok(mut g) = self.prompts.lock() {
            g.push(prompt.to_string());
        }
        Ok(self.completion.clone())
    }
}

/// Returns scripted steps in order (`Ok` completion or `Err` message);
/// errors once the script is exhausted.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedModel {
    pub fn new(steps: Vec<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
        }
    }

    /// `n` successful completions followed by one failure.
    pub fn failing_after(completion: &str, n: usize) -> Self {
        let mut steps: Vec<Result<String, String>> =
            std::iter::repeat_with(|| Ok(completion.to_string()))
                .take(n)
                .collect();
        steps.push(Err("provider unavailable".to_string()));
        Self::new(steps)
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        let step = self
            .script
            .lock()
            .map_err(|_| anyhow!("scripted model lock poisoned"))?
            .pop_front();
        match step {
            Some(Ok(completion)) => Ok(completion),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted model exhausted")),
        }
    }
}
