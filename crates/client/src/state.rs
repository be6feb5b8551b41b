//! Client conversation state
//!
//! `reduce` is a pure function from one immutable snapshot to the next.
//! `ClientStore` owns the current snapshot and is the only place that touches
//! durable storage: after every reduce it writes the conversation list, then
//! the active conversation pointer. The two writes are not batched; on load
//! the conversation list wins and a dangling pointer is dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use palaver_common::text::DEFAULT_TITLE;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClientError;
use crate::storage::DurableStorage;

pub const CONVERSATIONS_KEY: &str = "conversations";
pub const ACTIVE_CONVERSATION_KEY: &str = "activeConversationId";

/// Author of a locally stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    #[serde(alias = "ai")]
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: String,
    /// Rendered HTML, derived from `content` and never the source of truth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_content: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LocalMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            kind: MessageType::User,
            content: content.into(),
            formatted_content: None,
            timestamp: Utc::now(),
        }
    }

    pub fn bot(content: impl Into<String>, formatted_content: impl Into<String>) -> Self {
        Self {
            kind: MessageType::Bot,
            content: content.into(),
            formatted_content: Some(formatted_content.into()),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalConversation {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<LocalMessage>,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl LocalConversation {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created: now,
            last_updated: now,
        }
    }
}

impl Default for LocalConversation {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientSnapshot {
    /// Most recently created first
    pub conversations: Vec<LocalConversation>,
    pub active_id: Option<Uuid>,
}

impl ClientSnapshot {
    pub fn active(&self) -> Option<&LocalConversation> {
        let id = self.active_id?;
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn get(&self, id: Uuid) -> Option<&LocalConversation> {
        self.conversations.iter().find(|c| c.id == id)
    }
}

/// State transitions. Ids and clocks are resolved when the action is built,
/// so `reduce` stays pure.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Prepend a conversation and make it active
    NewConversation(LocalConversation),
    Switch(Uuid),
    /// Remove a conversation; `fallback` becomes active if nothing else is left
    Delete {
        id: Uuid,
        fallback: LocalConversation,
    },
    /// Append to the active conversation
    AppendMessage(LocalMessage),
    SetTitle { id: Uuid, title: String },
}

impl ClientAction {
    pub fn new_conversation() -> Self {
        ClientAction::NewConversation(LocalConversation::new())
    }

    pub fn delete(id: Uuid) -> Self {
        ClientAction::Delete {
            id,
            fallback: LocalConversation::new(),
        }
    }
}

/// Compute the next snapshot
pub fn reduce(snapshot: &ClientSnapshot, action: ClientAction) -> ClientSnapshot {
    let mut next = snapshot.clone();

    match action {
        ClientAction::NewConversation(conversation) => {
            next.active_id = Some(conversation.id);
            next.conversations.insert(0, conversation);
        }
        ClientAction::Switch(id) => {
            if next.get(id).is_some() {
                next.active_id = Some(id);
            }
        }
        ClientAction::Delete { id, fallback } => {
            next.conversations.retain(|c| c.id != id);
            if next.active_id == Some(id) {
                match next.conversations.first() {
                    Some(first) => next.active_id = Some(first.id),
                    None => {
                        next.active_id = Some(fallback.id);
                        next.conversations.push(fallback);
                    }
                }
            }
        }
        ClientAction::AppendMessage(message) => {
            let active_id = next.active_id;
            if let Some(conversation) = next
                .conversations
                .iter_mut()
                .find(|c| Some(c.id) == active_id)
            {
                conversation.last_updated = message.timestamp;
                conversation.messages.push(message);
            }
        }
        ClientAction::SetTitle { id, title } => {
            if let Some(conversation) = next.conversations.iter_mut().find(|c| c.id == id) {
                conversation.title = title;
            }
        }
    }

    next
}

/// Owner of the current snapshot and its durable mirror
pub struct ClientStore<S> {
    storage: S,
    snapshot: Arc<ClientSnapshot>,
}

impl<S: DurableStorage> ClientStore<S> {
    /// Restore state from storage
    pub fn load(storage: S) -> Result<Self, ClientError> {
        let conversations = match storage.get(CONVERSATIONS_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<LocalConversation>>(&raw) {
                Ok(conversations) => conversations,
                Err(e) => {
                    tracing::warn!(error = %e, "Stored conversations are unreadable, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let active_id = storage
            .get(ACTIVE_CONVERSATION_KEY)?
            .and_then(|raw| parse_active_pointer(&raw))
            .filter(|id| conversations.iter().any(|c| c.id == *id));

        tracing::debug!(
            conversation_count = conversations.len(),
            has_active = active_id.is_some(),
            "Client state loaded"
        );

        Ok(Self {
            storage,
            snapshot: Arc::new(ClientSnapshot {
                conversations,
                active_id,
            }),
        })
    }

    pub fn snapshot(&self) -> Arc<ClientSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Apply an action, then mirror the new snapshot to storage.
    ///
    /// The in-memory snapshot advances even if a write fails; the error is
    /// returned so the caller can retry or report it.
    pub fn dispatch(&mut self, action: ClientAction) -> Result<Arc<ClientSnapshot>, ClientError> {
        self.snapshot = Arc::new(reduce(&self.snapshot, action));
        self.persist()?;
        Ok(self.snapshot())
    }

    fn persist(&self) -> Result<(), ClientError> {
        let conversations = serde_json::to_string(&self.snapshot.conversations)?;
        self.storage.set(CONVERSATIONS_KEY, &conversations)?;

        match self.snapshot.active_id {
            Some(id) => self
                .storage
                .set(ACTIVE_CONVERSATION_KEY, &id.to_string()),
            None => self.storage.remove(ACTIVE_CONVERSATION_KEY),
        }
    }
}

/// The active pointer is a bare id; a JSON-quoted id is accepted too
fn parse_active_pointer(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim().trim_matches('"')).ok()
}
