//! Conversation handler integration tests

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::assertions::{assert_error_code, assert_timestamp_advanced};
use crate::common::{authed_request, parse_body, ConversationsTestApp, TestUser};

const GREETING: &str = "Hello! I'm your chat assistant. How can I help you today?";

/// Helper: create a conversation and return the response body
async fn create_conversation(app: &ConversationsTestApp, user: &TestUser, body: Value) -> Value {
    let req = authed_request(Method::POST, "/v1/conversations", &user.jwt, Some(body));
    let resp = app.test_router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    parse_body(resp).await
}

mod test_create_conversation {
    use super::*;

    #[tokio::test]
    async fn test_create_without_initial_message() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let body = create_conversation(&app, &user, json!({})).await;

        assert_eq!(body["title"], "New Conversation");
        assert_eq!(body["ownerId"], user.id);
        assert_eq!(body["messages"].as_array().unwrap().len(), 0);
        assert_eq!(body["createdAt"], body["updatedAt"]);
        assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_create_with_initial_message_opens_exchange() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let body = create_conversation(&app, &user, json!({"initialMessage": "hi"})).await;

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["sender"], "user");
        assert_eq!(messages[0]["content"], "hi");
        assert_eq!(messages[1]["sender"], "bot");
        assert_eq!(messages[1]["content"], GREETING);
        assert_eq!(body["title"], "hi");
    }

    #[tokio::test]
    async fn test_title_derived_from_long_initial_message() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let body = create_conversation(
            &app,
            &user,
            json!({"initialMessage": "Explain the borrow checker to me like I am five"}),
        )
        .await;

        assert_eq!(body["title"], "Explain the borrow checker to ...");
    }

    #[tokio::test]
    async fn test_explicit_title_wins_and_is_trimmed() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let body = create_conversation(
            &app,
            &user,
            json!({"title": "  Rust questions  ", "initialMessage": "hi"}),
        )
        .await;

        assert_eq!(body["title"], "Rust questions");
    }

    #[tokio::test]
    async fn test_blank_initial_message_is_ignored() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let body = create_conversation(&app, &user, json!({"initialMessage": "   "})).await;

        assert_eq!(body["messages"].as_array().unwrap().len(), 0);
        assert_eq!(body["title"], "New Conversation");
    }

    #[tokio::test]
    async fn test_title_201_chars_returns_400() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let req = authed_request(
            Method::POST,
            "/v1/conversations",
            &user.jwt,
            Some(json!({"title": "a".repeat(201)})),
        );
        let resp = app.test_router().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_error_code(&parse_body(resp).await, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_title_200_chars_accepted() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let title = "a".repeat(200);
        let body = create_conversation(&app, &user, json!({"title": title})).await;
        assert_eq!(body["title"], title);
    }

    #[tokio::test]
    async fn test_padded_title_within_limit_after_trim_accepted() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let title = "a".repeat(199);
        let body =
            create_conversation(&app, &user, json!({"title": format!("   {}   ", title)})).await;
        assert_eq!(body["title"], title);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let req = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/v1/conversations")
            .header("authorization", format!("Bearer {}", user.jwt))
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let resp = app.test_router().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

mod test_list_conversations {
    use super::*;

    #[tokio::test]
    async fn test_list_only_returns_own_conversations() {
        let app = ConversationsTestApp::new().unwrap();
        let alice = app.new_user();
        let bob = app.new_user();

        create_conversation(&app, &alice, json!({"title": "alice 1"})).await;
        create_conversation(&app, &alice, json!({"title": "alice 2"})).await;
        create_conversation(&app, &bob, json!({"title": "bob 1"})).await;

        let req = authed_request(Method::GET, "/v1/conversations", &alice.jwt, None);
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|c| c["ownerId"] == alice.id));
    }

    #[tokio::test]
    async fn test_list_is_most_recently_updated_first() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let older = create_conversation(&app, &user, json!({"title": "older"})).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        create_conversation(&app, &user, json!({"title": "newer"})).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        // Touching the older conversation moves it to the front
        let req = authed_request(
            Method::POST,
            &format!("/v1/conversations/{}/messages", older["id"].as_str().unwrap()),
            &user.jwt,
            Some(json!({"content": "bump"})),
        );
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = authed_request(Method::GET, "/v1/conversations", &user.jwt, None);
        let body = parse_body(app.test_router().oneshot(req).await.unwrap()).await;

        let titles: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["older", "newer"]);
    }

    #[tokio::test]
    async fn test_list_empty_for_new_user() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let req = authed_request(Method::GET, "/v1/conversations", &user.jwt, None);
        let body = parse_body(app.test_router().oneshot(req).await.unwrap()).await;

        assert_eq!(body, json!([]));
    }
}

mod test_get_conversation {
    use super::*;

    #[tokio::test]
    async fn test_get_own_conversation() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();
        let created = create_conversation(&app, &user, json!({"initialMessage": "hi"})).await;

        let uri = format!("/v1/conversations/{}", created["id"].as_str().unwrap());
        let req = authed_request(Method::GET, &uri, &user.jwt, None);
        let resp = app.test_router().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await, created);
    }

    #[tokio::test]
    async fn test_foreign_and_missing_are_indistinguishable() {
        let app = ConversationsTestApp::new().unwrap();
        let owner = app.new_user();
        let other = app.new_user();
        let created = create_conversation(&app, &owner, json!({})).await;

        let foreign_uri = format!("/v1/conversations/{}", created["id"].as_str().unwrap());
        let foreign = app
            .test_router()
            .oneshot(authed_request(Method::GET, &foreign_uri, &other.jwt, None))
            .await
            .unwrap();

        let missing_uri = format!("/v1/conversations/{}", Uuid::new_v4());
        let missing = app
            .test_router()
            .oneshot(authed_request(Method::GET, &missing_uri, &other.jwt, None))
            .await
            .unwrap();

        assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(parse_body(foreign).await, parse_body(missing).await);
    }

    #[tokio::test]
    async fn test_invalid_id_returns_400() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();

        let req = authed_request(Method::GET, "/v1/conversations/not-a-uuid", &user.jwt, None);
        let resp = app.test_router().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

mod test_update_conversation {
    use super::*;

    #[tokio::test]
    async fn test_update_title() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();
        let created = create_conversation(&app, &user, json!({})).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        let uri = format!("/v1/conversations/{}", created["id"].as_str().unwrap());
        let req = authed_request(Method::PUT, &uri, &user.jwt, Some(json!({"title": "Renamed"})));
        let resp = app.test_router().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = parse_body(resp).await;
        assert_eq!(body["title"], "Renamed");
        assert_eq!(body["createdAt"], created["createdAt"]);
        assert_timestamp_advanced(&created["updatedAt"], &body["updatedAt"]);
    }

    #[tokio::test]
    async fn test_update_without_title_still_touches() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();
        let created = create_conversation(&app, &user, json!({"title": "Keep me"})).await;

        let uri = format!("/v1/conversations/{}", created["id"].as_str().unwrap());
        let req = authed_request(Method::PUT, &uri, &user.jwt, Some(json!({})));
        let resp = app.test_router().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = parse_body(resp).await;
        assert_eq!(body["title"], "Keep me");
        assert_timestamp_advanced(&created["updatedAt"], &body["updatedAt"]);
    }

    #[tokio::test]
    async fn test_update_foreign_conversation_returns_404() {
        let app = ConversationsTestApp::new().unwrap();
        let owner = app.new_user();
        let other = app.new_user();
        let created = create_conversation(&app, &owner, json!({"title": "Mine"})).await;

        let uri = format!("/v1/conversations/{}", created["id"].as_str().unwrap());
        let req = authed_request(Method::PUT, &uri, &other.jwt, Some(json!({"title": "Theirs"})));
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = authed_request(Method::GET, &uri, &owner.jwt, None);
        let body = parse_body(app.test_router().oneshot(req).await.unwrap()).await;
        assert_eq!(body["title"], "Mine");
    }

    #[tokio::test]
    async fn test_update_title_too_long_returns_400() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();
        let created = create_conversation(&app, &user, json!({})).await;

        let uri = format!("/v1/conversations/{}", created["id"].as_str().unwrap());
        let req = authed_request(
            Method::PUT,
            &uri,
            &user.jwt,
            Some(json!({"title": "x".repeat(201)})),
        );
        let resp = app.test_router().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_padded_title_is_trimmed_before_length_check() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();
        let created = create_conversation(&app, &user, json!({})).await;

        let title = "b".repeat(200);
        let uri = format!("/v1/conversations/{}", created["id"].as_str().unwrap());
        let req = authed_request(
            Method::PUT,
            &uri,
            &user.jwt,
            Some(json!({"title": format!("\t{}  ", title)})),
        );
        let resp = app.test_router().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await["title"], title);
    }
}

mod test_delete_conversation {
    use super::*;

    #[tokio::test]
    async fn test_delete_then_get_returns_404() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();
        let created = create_conversation(&app, &user, json!({})).await;
        let uri = format!("/v1/conversations/{}", created["id"].as_str().unwrap());

        let resp = app
            .test_router()
            .oneshot(authed_request(Method::DELETE, &uri, &user.jwt, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            parse_body(resp).await,
            json!({"message": "Conversation deleted successfully"})
        );

        let resp = app
            .test_router()
            .oneshot(authed_request(Method::GET, &uri, &user.jwt, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_error_code(&parse_body(resp).await, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_foreign_conversation_leaves_it_intact() {
        let app = ConversationsTestApp::new().unwrap();
        let owner = app.new_user();
        let other = app.new_user();
        let created = create_conversation(&app, &owner, json!({})).await;
        let uri = format!("/v1/conversations/{}", created["id"].as_str().unwrap());

        let resp = app
            .test_router()
            .oneshot(authed_request(Method::DELETE, &uri, &other.jwt, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .test_router()
            .oneshot(authed_request(Method::GET, &uri, &owner.jwt, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_twice_returns_404() {
        let app = ConversationsTestApp::new().unwrap();
        let user = app.new_user();
        let created = create_conversation(&app, &user, json!({})).await;
        let uri = format!("/v1/conversations/{}", created["id"].as_str().unwrap());

        let first = app
            .test_router()
            .oneshot(authed_request(Method::DELETE, &uri, &user.jwt, None))
            .await
            .unwrap();
        let second = app
            .test_router()
            .oneshot(authed_request(Method::DELETE, &uri, &user.jwt, None))
            .await
            .unwrap();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
    }
}
