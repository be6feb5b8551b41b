//! Postgres conversation store
//!
//! One row per conversation; the ordered messages live in a JSONB column so
//! every mutation is a single-row write.

use chrono::{DateTime, Utc};
use palaver_auth::OwnerId;
use palaver_common::{Error, Result};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::ConversationStore;
use crate::domain::entities::{Conversation, Message};

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    owner_id: String,
    title: String,
    messages: Json<Vec<Message>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = Error;

    fn try_from(row: ConversationRow) -> Result<Self> {
        let owner_id = OwnerId::new(row.owner_id).map_err(|_| {
            Error::Persistence(format!("Conversation {} has no owner", row.id))
        })?;

        Ok(Conversation {
            id: row.id,
            owner_id,
            title: row.title,
            messages: row.messages.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationStore for PgConversationStore {
    async fn insert(&self, conv: &Conversation) -> Result<Conversation> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            INSERT INTO conversations (
                id, owner_id, title, messages, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, owner_id, title, messages, created_at, updated_at
            "#,
        )
        .bind(conv.id)
        .bind(conv.owner_id.as_str())
        .bind(&conv.title)
        .bind(Json(&conv.messages))
        .bind(conv.created_at)
        .bind(conv.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Conversation>> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, owner_id, title, messages, created_at, updated_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Conversation::try_from).transpose()
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, owner_id, title, messages, created_at, updated_at
            FROM conversations
            WHERE owner_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Conversation::try_from).collect()
    }

    async fn save(&self, conv: &Conversation) -> Result<Option<Conversation>> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            UPDATE conversations SET
                title = $2,
                messages = $3,
                updated_at = $4
            WHERE id = $1
            RETURNING id, owner_id, title, messages, created_at, updated_at
            "#,
        )
        .bind(conv.id)
        .bind(&conv.title)
        .bind(Json(&conv.messages))
        .bind(conv.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Conversation::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
