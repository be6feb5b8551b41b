//! Conversations domain state and auth backend integration

use crate::service::ConversationService;
use axum::extract::FromRef;
use palaver_auth::AuthBackend;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub service: ConversationService,
    pub auth: AuthBackend,
}

impl FromRef<ConversationsState> for AuthBackend {
    fn from_ref(state: &ConversationsState) -> Self {
        state.auth.clone()
    }
}
