//! Message API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use palaver_auth::AuthUser;
use palaver_common::{Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::ConversationResponse;
use crate::api::middleware::ConversationsState;

/// Request for adding a message
#[derive(Debug, Deserialize, Validate)]
pub struct AddMessageRequest {
    /// Message content; blank content is rejected by the service
    #[serde(default)]
    pub content: String,
}

/// Add a user message and its bot reply to a conversation
pub async fn add_message(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AddMessageRequest>,
) -> Result<Json<ConversationResponse>> {
    let updated = state
        .service
        .append_message(ctx.owner(), id, &req.content)
        .await?;

    Ok(Json(updated.into()))
}
