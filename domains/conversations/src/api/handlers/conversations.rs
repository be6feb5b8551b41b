//! Conversation management API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use palaver_auth::AuthUser;
use palaver_common::{Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::ConversationResponse;
use crate::api::middleware::ConversationsState;

/// Request for creating a conversation
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    /// Optional conversation title
    #[validate(custom(function = "validate_trimmed_title", message = "Title is too long"))]
    pub title: Option<String>,

    /// Optional first message; answered with a greeting
    pub initial_message: Option<String>,
}

/// Request for updating a conversation
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateConversationRequest {
    #[validate(custom(function = "validate_trimmed_title", message = "Title is too long"))]
    pub title: Option<String>,
}

/// Titles are stored trimmed, so the length limit applies after trimming
fn validate_trimmed_title(title: &str) -> std::result::Result<(), validator::ValidationError> {
    crate::domain::entities::validate_title(title.trim())
        .map_err(|_| validator::ValidationError::new("length"))
}

#[derive(Debug, Serialize)]
pub struct DeleteConversationResponse {
    pub message: String,
}

/// Create a new conversation
pub async fn create_conversation(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ConversationResponse>)> {
    let created = state
        .service
        .create_conversation(
            ctx.owner(),
            req.title.as_deref(),
            req.initial_message.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List conversations for the authenticated user
pub async fn list_conversations(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
) -> Result<Json<Vec<ConversationResponse>>> {
    let convs = state.service.list_conversations(ctx.owner()).await?;

    let responses: Vec<ConversationResponse> = convs.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Get a single conversation by ID
pub async fn get_conversation(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationResponse>> {
    let conv = state.service.get_conversation(ctx.owner(), id).await?;
    Ok(Json(conv.into()))
}

/// Update a conversation title
pub async fn update_conversation(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateConversationRequest>,
) -> Result<Json<ConversationResponse>> {
    let updated = state
        .service
        .update_title(ctx.owner(), id, req.title.as_deref())
        .await?;

    Ok(Json(updated.into()))
}

/// Delete a conversation
pub async fn delete_conversation(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteConversationResponse>> {
    state.service.delete_conversation(ctx.owner(), id).await?;

    Ok(Json(DeleteConversationResponse {
        message: "Conversation deleted successfully".to_string(),
    }))
}
