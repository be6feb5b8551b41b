//! Bot reply generation
//!
//! `SimulatedReplies` answers with canned texts. `AssistantReplies` relays the
//! user's text through the AI proxy; its failures abort the operation that
//! asked for the reply.

use std::sync::Arc;

use palaver_common::{ReplyMode, Result};
use palaver_llm::LlmService;

use crate::domain::entities::Conversation;

/// Greeting sent after the opening message of a new conversation
pub const GREETING: &str = "Hello! I'm your chat assistant. How can I help you today?";

/// Source of bot replies
#[async_trait::async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Reply to the first message of a conversation being created
    async fn opening_reply(&self, first_message: &str) -> Result<String>;

    /// Reply to `content` appended to `conversation`
    async fn reply(&self, conversation: &Conversation, content: &str) -> Result<String>;
}

/// Canned replies
#[derive(Debug, Clone, Default)]
pub struct SimulatedReplies;

#[async_trait::async_trait]
impl ReplyGenerator for SimulatedReplies {
    async fn opening_reply(&self, _first_message: &str) -> Result<String> {
        Ok(GREETING.to_string())
    }

    async fn reply(&self, _conversation: &Conversation, content: &str) -> Result<String> {
        Ok(format!(
            "I received your message: \"{}\". This is a simulated response.",
            content
        ))
    }
}

/// Replies generated by the AI proxy
#[derive(Clone)]
pub struct AssistantReplies {
    llm: Arc<dyn LlmService>,
}

impl AssistantReplies {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }
}

#[async_trait::async_trait]
impl ReplyGenerator for AssistantReplies {
    async fn opening_reply(&self, first_message: &str) -> Result<String> {
        Ok(self.llm.generate(first_message).await?)
    }

    async fn reply(&self, conversation: &Conversation, content: &str) -> Result<String> {
        tracing::debug!(
            conversation_id = %conversation.id,
            model = self.llm.model(),
            "Generating assistant reply"
        );
        Ok(self.llm.generate(content).await?)
    }
}

/// Build the reply generator selected by `mode`
pub fn reply_generator(mode: ReplyMode, llm: Arc<dyn LlmService>) -> Arc<dyn ReplyGenerator> {
    match mode {
        ReplyMode::Simulated => Arc::new(SimulatedReplies),
        ReplyMode::Assistant => Arc::new(AssistantReplies::new(llm)),
    }
}
