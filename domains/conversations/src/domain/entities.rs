//! Domain entities for Conversations domain
//!
//! A conversation is a single document: its messages live inside it, in the
//! order they were added, and are never edited or reordered afterwards.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use palaver_auth::OwnerId;
use palaver_common::text::{derive_title, non_blank, DEFAULT_TITLE};
use palaver_common::{Error, Result};

/// Maximum title length in characters
pub const MAX_TITLE_LENGTH: usize = 200;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    User,
    Bot,
}

impl std::fmt::Display for SenderRole {
    #[mutants::skip] // Log formatting only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SenderRole::User => write!(f, "user"),
            SenderRole::Bot => write!(f, "bot"),
        }
    }
}

/// Current time at the precision the store keeps (microseconds)
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: SenderRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a user-authored message; content must carry text
    pub fn user(content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        validate_content(&content)?;

        Ok(Message {
            sender: SenderRole::User,
            content,
            created_at: now(),
        })
    }

    /// Create an assistant reply
    pub fn bot(content: impl Into<String>) -> Self {
        Message {
            sender: SenderRole::Bot,
            content: content.into(),
            created_at: now(),
        }
    }
}

/// Reject blank user content
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::Validation(
            "Message content is required".to_string(),
        ));
    }
    Ok(())
}

/// Reject titles over the length limit
pub fn validate_title(title: &str) -> Result<()> {
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(Error::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation.
    ///
    /// Title resolution: an explicit non-blank title wins, then a title
    /// derived from `initial_message`, then the default title.
    pub fn new(
        owner_id: OwnerId,
        title: Option<&str>,
        initial_message: Option<&str>,
    ) -> Result<Self> {
        let title = match non_blank(title) {
            Some(explicit) => {
                validate_title(explicit)?;
                explicit.to_string()
            }
            None => match non_blank(initial_message) {
                Some(message) => derive_title(message),
                None => DEFAULT_TITLE.to_string(),
            },
        };

        let now = now();
        Ok(Conversation {
            id: Uuid::new_v4(),
            owner_id,
            title,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.owner_id == *owner
    }

    /// Append a message; the log is append-only
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Replace the title when the new one carries text, otherwise keep it
    pub fn rename(&mut self, title: Option<&str>) -> Result<()> {
        if let Some(title) = non_blank(title) {
            validate_title(title)?;
            self.title = title.to_string();
        }
        Ok(())
    }

    /// Refresh `updated_at`, strictly later than its previous value even
    /// when the clock has not moved at microsecond precision.
    pub fn touch(&mut self) {
        let now = now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}
