//! Conversation lifecycle operations
//!
//! Every operation is scoped to the calling owner. Each performs at most one
//! store read and one store write; `append_message` saves the whole document
//! once, so concurrent appends to one conversation are last-write-wins.

use std::sync::Arc;

use palaver_auth::OwnerId;
use palaver_common::{Error, Result};
use uuid::Uuid;

use crate::domain::entities::{validate_content, validate_title, Conversation, Message};
use crate::domain::replies::ReplyGenerator;
use crate::repository::ConversationStore;

const NOT_FOUND: &str = "Conversation not found";

/// How a lookup reports a conversation owned by someone else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPolicy {
    /// Foreign conversations are indistinguishable from missing ones
    #[default]
    ConcealForeign,
    /// Foreign conversations are reported as forbidden
    RevealForeign,
}

impl LookupPolicy {
    fn foreign_error(self) -> Error {
        match self {
            LookupPolicy::ConcealForeign => Error::NotFound(NOT_FOUND.to_string()),
            LookupPolicy::RevealForeign => {
                Error::Forbidden("Conversation belongs to another user".to_string())
            }
        }
    }
}

#[derive(Clone)]
pub struct ConversationService {
    store: Arc<dyn ConversationStore>,
    replies: Arc<dyn ReplyGenerator>,
    lookup_policy: LookupPolicy,
}

impl ConversationService {
    pub fn new(store: Arc<dyn ConversationStore>, replies: Arc<dyn ReplyGenerator>) -> Self {
        Self {
            store,
            replies,
            lookup_policy: LookupPolicy::default(),
        }
    }

    pub fn with_lookup_policy(mut self, policy: LookupPolicy) -> Self {
        self.lookup_policy = policy;
        self
    }

    /// Load a conversation the caller owns
    async fn load_owned(&self, owner: &OwnerId, id: Uuid) -> Result<Conversation> {
        let conv = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| Error::NotFound(NOT_FOUND.to_string()))?;

        if !conv.is_owned_by(owner) {
            tracing::debug!(conversation_id = %id, "Lookup of foreign conversation");
            return Err(self.lookup_policy.foreign_error());
        }

        Ok(conv)
    }

    /// Create a conversation, optionally opening it with a first exchange
    pub async fn create_conversation(
        &self,
        owner: &OwnerId,
        title: Option<&str>,
        initial_message: Option<&str>,
    ) -> Result<Conversation> {
        let initial_message = initial_message.filter(|m| !m.trim().is_empty());
        let mut conv = Conversation::new(owner.clone(), title, initial_message)?;

        if let Some(first) = initial_message {
            let user = Message::user(first)?;
            let greeting = self.replies.opening_reply(first).await?;
            conv.push(user);
            conv.push(Message::bot(greeting));
        }

        let created = self.store.insert(&conv).await?;
        tracing::info!(conversation_id = %created.id, messages = created.messages.len(), "Conversation created");
        Ok(created)
    }

    /// Conversations of the caller, most recently updated first
    pub async fn list_conversations(&self, owner: &OwnerId) -> Result<Vec<Conversation>> {
        self.store.list_by_owner(owner).await
    }

    pub async fn get_conversation(&self, owner: &OwnerId, id: Uuid) -> Result<Conversation> {
        self.load_owned(owner, id).await
    }

    /// Append the caller's message and a bot reply in one write.
    ///
    /// The reply is produced before anything changes, so a failed reply
    /// leaves the stored conversation untouched.
    pub async fn append_message(
        &self,
        owner: &OwnerId,
        id: Uuid,
        content: &str,
    ) -> Result<Conversation> {
        validate_content(content)?;
        let mut conv = self.load_owned(owner, id).await?;

        let reply = self.replies.reply(&conv, content).await?;

        conv.push(Message::user(content)?);
        conv.push(Message::bot(reply));
        conv.touch();

        let saved = self
            .store
            .save(&conv)
            .await?
            .ok_or_else(|| Error::NotFound(NOT_FOUND.to_string()))?;

        tracing::info!(conversation_id = %saved.id, messages = saved.messages.len(), "Message added");
        Ok(saved)
    }

    /// Replace the title when a non-blank one is given; always refreshes `updated_at`
    pub async fn update_title(
        &self,
        owner: &OwnerId,
        id: Uuid,
        title: Option<&str>,
    ) -> Result<Conversation> {
        if let Some(title) = title {
            validate_title(title.trim())?;
        }
        let mut conv = self.load_owned(owner, id).await?;

        conv.rename(title)?;
        conv.touch();

        self.store
            .save(&conv)
            .await?
            .ok_or_else(|| Error::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn delete_conversation(&self, owner: &OwnerId, id: Uuid) -> Result<()> {
        self.load_owned(owner, id).await?;

        if !self.store.delete(id).await? {
            return Err(Error::NotFound(NOT_FOUND.to_string()));
        }

        tracing::info!(conversation_id = %id, "Conversation deleted");
        Ok(())
    }
}
