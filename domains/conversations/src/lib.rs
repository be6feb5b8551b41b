//! Conversations domain: owned chat threads and their messages

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Conversation, Message, SenderRole};
pub use domain::replies::{reply_generator, AssistantReplies, ReplyGenerator, SimulatedReplies};

// Re-export repository types
pub use repository::{ConversationStore, InMemoryConversationStore, PgConversationStore};

pub use service::{ConversationService, LookupPolicy};

// Re-export API types
pub use api::routes;
pub use api::ConversationsState;
