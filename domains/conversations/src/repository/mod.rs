//! Repository implementations for Conversations domain
//!
//! Pure data access: no ownership checks happen here, the service decides
//! what a caller may see.

pub mod memory;
pub mod postgres;

use palaver_auth::OwnerId;
use palaver_common::Result;
use uuid::Uuid;

use crate::domain::entities::Conversation;

pub use memory::InMemoryConversationStore;
pub use postgres::PgConversationStore;

/// Document store for conversations
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist a new conversation
    async fn insert(&self, conversation: &Conversation) -> Result<Conversation>;

    /// Find conversation by ID, whoever owns it
    async fn find(&self, id: Uuid) -> Result<Option<Conversation>>;

    /// Conversations of one owner, most recently updated first
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Conversation>>;

    /// Replace title, messages and `updated_at` in one write.
    /// `None` when the conversation no longer exists.
    async fn save(&self, conversation: &Conversation) -> Result<Option<Conversation>>;

    /// Delete a conversation
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
