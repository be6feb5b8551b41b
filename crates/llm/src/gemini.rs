//! Gemini API Implementation
//!
//! Calls the `generateContent` endpoint
//! (`{base}/v1beta/models/{model}:generateContent`) using reqwest.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{validate_prompt, LlmConfig, LlmError, LlmService};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// generateContent request body
#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// generateContent response body, reduced to the fields read here
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Non-empty texts of the first candidate, newline-joined
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}

/// Gemini LLM service implementation
pub struct GeminiService {
    client: Client,
    config: LlmConfig,
}

impl GeminiService {
    /// Create a new Gemini service with the configured request timeout
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait::async_trait]
impl LlmService for GeminiService {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        validate_prompt(prompt)?;

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Configuration("Gemini API key not configured".to_string()))?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "Sending Gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("AI service timed out after {:?}", self.config.timeout)
                } else {
                    format!("AI service request failed: {}", e)
                };
                tracing::warn!(error = %e, "Gemini request failed");
                LlmError::Upstream {
                    message,
                    payload: None,
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            let payload = if error_body.is_empty() {
                None
            } else {
                Some(serde_json::from_str::<Value>(&error_body).unwrap_or(Value::String(error_body)))
            };

            tracing::warn!(status = %status, "Gemini returned an error status");

            return Err(LlmError::Upstream {
                message: format!("AI generation failed: upstream returned {}", status),
                payload,
            });
        }

        let api_response: GenerateContentResponse =
            response.json().await.map_err(|e| LlmError::Upstream {
                message: format!("Failed to parse AI service response: {}", e),
                payload: None,
            })?;

        let text = api_response.text();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse(
                "Empty response from AI service".to_string(),
            ));
        }

        tracing::debug!(response_len = text.len(), "Gemini response received");
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
