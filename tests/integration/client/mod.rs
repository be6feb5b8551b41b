//! Chat client against a live listener
//!
//! The router is served on an ephemeral port so the HTTP client, the chat
//! session and the file-backed client state are exercised end to end.

use std::net::SocketAddr;

use palaver_client::{
    ApiClient, ChatSession, ClientAction, ClientError, ClientStore, FileStorage, MessageType,
    ProxyClient, FALLBACK_REPLY,
};
use palaver_llm::LlmError;
use uuid::Uuid;

use crate::common::{ConversationsTestApp, TestUser};

/// Serve the app on 127.0.0.1 and return its base URL
async fn spawn_server(app: &ConversationsTestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let router = app.test_router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(base_url: &str, user: &TestUser) -> ApiClient {
    ApiClient::new(base_url).unwrap().with_token(user.jwt.clone())
}

#[tokio::test]
async fn test_api_client_conversation_lifecycle() {
    let app = ConversationsTestApp::new().unwrap();
    let base_url = spawn_server(&app).await;
    let user = app.new_user();
    let client = client_for(&base_url, &user);

    let created = client.create_conversation(None, Some("hi")).await.unwrap();
    assert_eq!(created.owner_id, user.id);
    assert_eq!(created.title, "hi");
    assert_eq!(created.messages.len(), 2);

    let updated = client.add_message(created.id, "hello").await.unwrap();
    assert_eq!(updated.messages.len(), 4);
    assert_eq!(updated.messages[2].sender, MessageType::User);
    assert_eq!(updated.messages[3].sender, MessageType::Bot);
    assert!(updated.updated_at > created.updated_at);

    let renamed = client
        .update_conversation(created.id, Some("Greetings"))
        .await
        .unwrap();
    assert_eq!(renamed.title, "Greetings");

    let list = client.list_conversations().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0], renamed);

    let message = client.delete_conversation(created.id).await.unwrap();
    assert_eq!(message, "Conversation deleted successfully");

    let err = client.get_conversation(created.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }));
}

#[tokio::test]
async fn test_api_client_without_token_is_unauthorized() {
    let app = ConversationsTestApp::new().unwrap();
    let base_url = spawn_server(&app).await;
    let client = ApiClient::new(&base_url).unwrap();

    let err = client.list_conversations().await.unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Authorization header required");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_api_client_cannot_see_other_users_conversations() {
    let app = ConversationsTestApp::new().unwrap();
    let base_url = spawn_server(&app).await;
    let owner = client_for(&base_url, &app.new_user());
    let other = client_for(&base_url, &app.new_user());

    let created = owner.create_conversation(Some("private"), None).await.unwrap();

    let err = other.get_conversation(created.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }));
    let err = other.get_conversation(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }));
}

#[tokio::test]
async fn test_chat_session_through_proxy_with_file_storage() {
    let app = ConversationsTestApp::new().unwrap();
    let base_url = spawn_server(&app).await;
    let user = app.new_user();
    let dir = tempfile::tempdir().unwrap();

    let store = ClientStore::load(FileStorage::new(dir.path())).unwrap();
    let proxy = ProxyClient::new(client_for(&base_url, &user));
    let mut session = ChatSession::new(store, proxy);

    let snapshot = session.send("Tell me about **Rust**").await.unwrap();
    let active = snapshot.active().unwrap();
    assert_eq!(active.title, "Tell me about **Rust**");
    assert_eq!(active.messages.len(), 2);
    assert_eq!(active.messages[1].kind, MessageType::Bot);
    assert_eq!(
        active.messages[1].content,
        "Mock response to: Tell me about **Rust**"
    );
    assert_eq!(
        active.messages[1].formatted_content.as_deref(),
        Some("<p>Mock response to: Tell me about <strong>Rust</strong></p>")
    );

    // The proxy fails; the question stays and the fallback is shown
    app.llm.fail_with(LlmError::Upstream {
        message: "Gemini request timed out".to_string(),
        payload: None,
    });
    let snapshot = session.send("and Go?").await.unwrap();
    let active = snapshot.active().unwrap();
    assert_eq!(active.messages.len(), 4);
    assert_eq!(active.messages[2].content, "and Go?");
    assert_eq!(active.messages[3].content, FALLBACK_REPLY);

    // A fresh store restores the same state from disk
    let reloaded = ClientStore::load(FileStorage::new(dir.path())).unwrap();
    assert_eq!(*reloaded.snapshot(), *snapshot);
}

#[tokio::test]
async fn test_deleting_only_chat_starts_a_new_one() {
    let app = ConversationsTestApp::new().unwrap();
    let base_url = spawn_server(&app).await;
    let user = app.new_user();
    let dir = tempfile::tempdir().unwrap();

    let store = ClientStore::load(FileStorage::new(dir.path())).unwrap();
    let mut session = ChatSession::new(store, ProxyClient::new(client_for(&base_url, &user)));
    let first = session.send("hello").await.unwrap().active_id.unwrap();

    let snapshot = session
        .store_mut()
        .dispatch(ClientAction::delete(first))
        .unwrap();

    assert_eq!(snapshot.conversations.len(), 1);
    let active = snapshot.active().unwrap();
    assert_ne!(active.id, first);
    assert_eq!(active.title, "New Conversation");
    assert!(active.messages.is_empty());
}
