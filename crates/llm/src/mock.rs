//! Mock LLM Service Implementation
//!
//! Used by `LlmServiceFactory` when provider is `"mock"`. Returns
//! deterministic responses and records every prompt it accepts.
//! Thread-safe via `Arc<Mutex<>>`.

use std::sync::{Arc, Mutex};

use crate::{validate_prompt, LlmError, LlmService};

/// Mock LLM service for testing
#[derive(Debug, Clone, Default)]
pub struct MockLlmService {
    prompts: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<LlmError>>>,
}

impl MockLlmService {
    /// Create a new mock LLM service
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `error`
    pub fn fail_with(&self, error: LlmError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(error);
        }
    }

    /// Return to answering normally
    pub fn succeed(&self) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = None;
        }
    }

    /// Prompts received so far, oldest first
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        validate_prompt(prompt)?;

        tracing::debug!(prompt_len = prompt.len(), "Mock LLM: recording prompt");
        self.prompts
            .lock()
            .map_err(|e| LlmError::Upstream {
                message: format!("prompts lock poisoned: {e}"),
                payload: None,
            })?
            .push(prompt.to_string());

        let scripted = self.failure.lock().ok().and_then(|f| f.clone());
        if let Some(error) = scripted {
            return Err(error);
        }

        Ok(format!("Mock response to: {}", prompt))
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
