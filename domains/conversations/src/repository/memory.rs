//! In-memory conversation store for development and tests

use std::collections::HashMap;
use std::sync::Arc;

use palaver_auth::OwnerId;
use palaver_common::Result;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ConversationStore;
use crate::domain::entities::Conversation;

#[derive(Clone, Default)]
pub struct InMemoryConversationStore {
    conversations: Arc<RwLock<HashMap<Uuid, Conversation>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn insert(&self, conv: &Conversation) -> Result<Conversation> {
        self.conversations
            .write()
            .await
            .insert(conv.id, conv.clone());
        Ok(conv.clone())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Conversation>> {
        Ok(self.conversations.read().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Conversation>> {
        let mut owned: Vec<Conversation> = self
            .conversations
            .read()
            .await
            .values()
            .filter(|c| c.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    async fn save(&self, conv: &Conversation) -> Result<Option<Conversation>> {
        let mut conversations = self.conversations.write().await;
        match conversations.get_mut(&conv.id) {
            Some(stored) => {
                stored.title = conv.title.clone();
                stored.messages = conv.messages.clone();
                stored.updated_at = conv.updated_at;
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.conversations.write().await.remove(&id).is_some())
    }
}
