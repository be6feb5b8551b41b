//! The send-a-question flow
//!
//! The user's message is appended before the AI proxy is called and stays in
//! the transcript whatever the proxy does. Failures are logged and answered
//! with a fixed fallback reply instead of internal error detail.

use std::sync::Arc;

use async_trait::async_trait;
use palaver_common::text::derive_title;
use uuid::Uuid;

use crate::error::ClientError;
use crate::formatter::format;
use crate::state::{ClientAction, ClientSnapshot, ClientStore, LocalConversation, LocalMessage};
use crate::storage::DurableStorage;

/// Shown in place of an AI reply when the proxy call fails
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response. Please try again.";

/// Source of AI replies
#[async_trait]
pub trait GenerateClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ClientError>;
}

pub struct ChatSession<S, G> {
    store: ClientStore<S>,
    generator: G,
}

impl<S, G> ChatSession<S, G>
where
    S: DurableStorage,
    G: GenerateClient,
{
    pub fn new(store: ClientStore<S>, generator: G) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &ClientStore<S> {
        &self.store
    }

    /// For navigation actions (new chat, switch, delete)
    pub fn store_mut(&mut self) -> &mut ClientStore<S> {
        &mut self.store
    }

    /// Send a question in the active conversation, creating one if needed.
    ///
    /// Only storage failures are returned as errors.
    pub async fn send(&mut self, question: &str) -> Result<Arc<ClientSnapshot>, ClientError> {
        if question.trim().is_empty() {
            return Ok(self.store.snapshot());
        }

        let conversation_id = self.ensure_active()?;
        let first_exchange = self
            .store
            .snapshot()
            .active()
            .is_none_or(|c| c.messages.is_empty());

        self.store
            .dispatch(ClientAction::AppendMessage(LocalMessage::user(question)))?;

        match self.generator.generate(question).await {
            Ok(text) => {
                let formatted = format(&text);
                self.store
                    .dispatch(ClientAction::AppendMessage(LocalMessage::bot(text, formatted)))?;

                if first_exchange {
                    self.store.dispatch(ClientAction::SetTitle {
                        id: conversation_id,
                        title: derive_title(question),
                    })?;
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    conversation_id = %conversation_id,
                    "AI reply failed, showing fallback"
                );
                self.store.dispatch(ClientAction::AppendMessage(LocalMessage::bot(
                    FALLBACK_REPLY,
                    format(FALLBACK_REPLY),
                )))?;
            }
        }

        Ok(self.store.snapshot())
    }

    fn ensure_active(&mut self) -> Result<Uuid, ClientError> {
        if let Some(active) = self.store.snapshot().active() {
            return Ok(active.id);
        }

        let conversation = LocalConversation::new();
        let id = conversation.id;
        self.store
            .dispatch(ClientAction::NewConversation(conversation))?;
        Ok(id)
    }
}
