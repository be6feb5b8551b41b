//! Postgres conversation store tests
//!
//! Run against `TEST_DATABASE_URL` (or `DATABASE_URL`) with the workspace
//! migrations applied. Skipped when neither variable is set. Every test works
//! under a fresh owner id so runs never see each other's rows.

use std::env;

use chrono::Duration;
use palaver_auth::OwnerId;
use palaver_conversations::{Conversation, ConversationStore, Message, PgConversationStore};
use sqlx::PgPool;
use uuid::Uuid;

/// Connect and migrate, or `None` when no test database is configured
async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = env::var("TEST_DATABASE_URL").or_else(|_| env::var("DATABASE_URL"))
    else {
        eprintln!("TEST_DATABASE_URL not set; skipping Postgres store test");
        return None;
    };

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

fn fresh_owner() -> OwnerId {
    OwnerId::new(format!("store-test-{}", Uuid::new_v4())).unwrap()
}

#[tokio::test]
async fn test_insert_then_find_round_trips_messages() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgConversationStore::new(pool);

    let mut conv = Conversation::new(fresh_owner(), Some("Trip planning"), None).unwrap();
    conv.push(Message::user("Where should we go?").unwrap());
    conv.push(Message::bot("Somewhere <b>warm</b> & \"sunny\""));
    conv.touch();

    let inserted = store.insert(&conv).await.unwrap();
    assert_eq!(inserted, conv);

    let found = store.find(conv.id).await.unwrap().unwrap();
    assert_eq!(found, conv);
    assert_eq!(found.messages[0].created_at, conv.messages[0].created_at);
    assert_eq!(found.messages[1].content, "Somewhere <b>warm</b> & \"sunny\"");

    assert!(store.find(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_by_owner_filters_and_orders_by_updated_at() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgConversationStore::new(pool);
    let owner = fresh_owner();

    let mut older = Conversation::new(owner.clone(), Some("older"), None).unwrap();
    let middle = Conversation::new(owner.clone(), Some("middle"), None).unwrap();
    let mut newer = Conversation::new(owner.clone(), Some("newer"), None).unwrap();
    let foreign = Conversation::new(fresh_owner(), Some("foreign"), None).unwrap();

    older.updated_at -= Duration::minutes(5);
    newer.updated_at += Duration::minutes(5);
    for conv in [&middle, &foreign, &newer, &older] {
        store.insert(conv).await.unwrap();
    }

    let titles: Vec<String> = store
        .list_by_owner(&owner)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.title)
        .collect();
    assert_eq!(titles, vec!["newer", "middle", "older"]);

    assert!(store.list_by_owner(&fresh_owner()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_replaces_document_but_not_identity() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgConversationStore::new(pool);
    let conv = Conversation::new(fresh_owner(), None, None).unwrap();
    store.insert(&conv).await.unwrap();

    let mut changed = conv.clone();
    changed.title = "Renamed".to_string();
    changed.push(Message::user("hi").unwrap());
    changed.push(Message::bot("hello"));
    changed.touch();
    changed.created_at -= Duration::days(1);

    let saved = store.save(&changed).await.unwrap().unwrap();
    assert_eq!(saved.title, "Renamed");
    assert_eq!(saved.messages, changed.messages);
    assert_eq!(saved.updated_at, changed.updated_at);
    assert_eq!(saved.created_at, conv.created_at);
    assert_eq!(saved.owner_id, conv.owner_id);

    assert_eq!(store.find(conv.id).await.unwrap(), Some(saved));
}

#[tokio::test]
async fn test_save_returns_none_for_missing_or_deleted_row() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgConversationStore::new(pool);

    let never_stored = Conversation::new(fresh_owner(), None, None).unwrap();
    assert!(store.save(&never_stored).await.unwrap().is_none());

    let mut conv = Conversation::new(fresh_owner(), None, None).unwrap();
    store.insert(&conv).await.unwrap();
    assert!(store.delete(conv.id).await.unwrap());

    conv.push(Message::user("late write").unwrap());
    assert!(store.save(&conv).await.unwrap().is_none());
    assert!(store.find(conv.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_reports_whether_a_row_was_removed() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgConversationStore::new(pool);
    let conv = Conversation::new(fresh_owner(), None, None).unwrap();
    store.insert(&conv).await.unwrap();

    assert!(store.delete(conv.id).await.unwrap());
    assert!(!store.delete(conv.id).await.unwrap());
    assert!(store.find(conv.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_schema_rejects_blank_owner() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let result = sqlx::query(
        r#"
        INSERT INTO conversations (id, owner_id, title, messages, created_at, updated_at)
        VALUES ($1, '   ', 'New Conversation', '[]'::jsonb, now(), now())
        "#,
    )
    .bind(Uuid::new_v4())
    .execute(&pool)
    .await;

    assert!(result.is_err(), "blank owner_id should violate the CHECK");
}

#[tokio::test]
async fn test_overlong_title_is_a_persistence_error() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgConversationStore::new(pool);

    let mut conv = Conversation::new(fresh_owner(), None, None).unwrap();
    conv.title = "x".repeat(201);

    let err = store.insert(&conv).await.unwrap_err();
    assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
    assert!(store.find(conv.id).await.unwrap().is_none());
}
