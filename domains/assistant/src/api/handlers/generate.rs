//! AI proxy handler

use axum::{extract::State, Json};
use palaver_common::{Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::middleware::AssistantState;

/// Request for generating text
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    /// Missing prompts are rejected by the LLM service
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub text: String,
}

/// Forward a prompt to the AI service and relay its text
pub async fn generate(
    State(state): State<AssistantState>,
    ValidatedJson(req): ValidatedJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    tracing::info!(prompt_len = req.prompt.len(), "AI generate request received");

    let text = state.llm.generate(&req.prompt).await?;

    tracing::info!(response_len = text.len(), "AI generate response ready");
    Ok(Json(GenerateResponse { text }))
}
