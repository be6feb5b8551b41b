//! Palaver LLM Service
//!
//! Forwards a single prompt to an external generative-language API and
//! relays the text result or a normalized error:
//! - Gemini `generateContent` integration for production
//! - Mock service for testing and development
//! - Provider, credential, model, base URL and timeout from the environment

pub mod gemini;
pub mod mock;

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

const DEFAULT_MODEL: &str = "gemini-flash-latest";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Configuration(String),

    /// Transport failure, timeout or non-2xx status from the AI service
    #[error("{message}")]
    Upstream {
        message: String,
        payload: Option<Value>,
    },

    #[error("{0}")]
    EmptyResponse(String),
}

impl From<LlmError> for palaver_common::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Validation(msg) => palaver_common::Error::Validation(msg),
            LlmError::Configuration(msg) => palaver_common::Error::Configuration(msg),
            LlmError::Upstream { message, payload } => {
                palaver_common::Error::Upstream { message, payload }
            }
            LlmError::EmptyResponse(msg) => palaver_common::Error::EmptyResponse(msg),
        }
    }
}

/// Reject prompts the AI service must never see
pub fn validate_prompt(prompt: &str) -> Result<(), LlmError> {
    if prompt.is_empty() {
        return Err(LlmError::Validation("Prompt is required".to_string()));
    }
    Ok(())
}

/// LLM service configuration.
#[derive(Clone)]
pub struct LlmConfig {
    /// LLM provider (gemini, mock)
    pub provider: String,
    /// Credential for the generative-language API. Checked per call, not at startup.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Bound on the whole upstream round trip
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl LlmConfig {
    /// Create LLM config from environment variables.
    pub fn from_env() -> Result<Self, LlmError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create LLM config through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timeout = match lookup("LLM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    LlmError::Configuration(format!("Invalid LLM_TIMEOUT_SECS: {}", raw))
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        Ok(Self {
            provider: lookup("LLM_PROVIDER").unwrap_or(defaults.provider),
            api_key: lookup("GEMINI_API_KEY").filter(|k| !k.is_empty()),
            model: lookup("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: lookup("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout,
        })
    }
}

/// LLM service trait for different implementations.
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Forward one prompt and return the generated text, never empty on success.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;
}

/// Factory for creating LlmService implementations.
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create an LlmService based on configuration.
    pub fn create(config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match config.provider.as_str() {
            "gemini" => {
                tracing::info!(model = %config.model, "Creating Gemini LLM service");
                if config.api_key.is_none() {
                    tracing::warn!("GEMINI_API_KEY is not set; generate requests will fail");
                }
                Ok(Box::new(gemini::GeminiService::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock LLM service");
                Ok(Box::new(mock::MockLlmService::new()))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}. Supported providers: gemini, mock",
                provider
            ))),
        }
    }
}
