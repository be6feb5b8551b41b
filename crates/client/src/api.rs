//! Typed HTTP client for the Palaver backend

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ClientError;
use crate::session::GenerateClient;
use crate::state::MessageType;

/// Longer than the server's own upstream timeout so its error reaches us
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMessage {
    pub sender: MessageType,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConversation {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<RemoteMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateConversationBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial_message: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

/// Client for the conversations and AI proxy endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach a bearer token to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Request failed").to_string()
                } else {
                    body
                }
            });
            tracing::debug!(status = status.as_u16(), %message, "Backend returned an error");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn create_conversation(
        &self,
        title: Option<&str>,
        initial_message: Option<&str>,
    ) -> Result<RemoteConversation, ClientError> {
        let body = CreateConversationBody {
            title,
            initial_message,
        };
        self.send(self.request(Method::POST, "/v1/conversations").json(&body))
            .await
    }

    pub async fn list_conversations(&self) -> Result<Vec<RemoteConversation>, ClientError> {
        self.send(self.request(Method::GET, "/v1/conversations"))
            .await
    }

    pub async fn get_conversation(&self, id: Uuid) -> Result<RemoteConversation, ClientError> {
        self.send(self.request(Method::GET, &format!("/v1/conversations/{}", id)))
            .await
    }

    pub async fn update_conversation(
        &self,
        id: Uuid,
        title: Option<&str>,
    ) -> Result<RemoteConversation, ClientError> {
        self.send(
            self.request(Method::PUT, &format!("/v1/conversations/{}", id))
                .json(&json!({ "title": title })),
        )
        .await
    }

    /// Returns the server's confirmation message
    pub async fn delete_conversation(&self, id: Uuid) -> Result<String, ClientError> {
        let response: DeleteResponse = self
            .send(self.request(Method::DELETE, &format!("/v1/conversations/{}", id)))
            .await?;
        Ok(response.message)
    }

    /// Append a message; the response carries the server's reply as well
    pub async fn add_message(
        &self,
        id: Uuid,
        content: &str,
    ) -> Result<RemoteConversation, ClientError> {
        self.send(
            self.request(Method::POST, &format!("/v1/conversations/{}/messages", id))
                .json(&json!({ "content": content })),
        )
        .await
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        let response: GenerateResponse = self
            .send(
                self.request(Method::POST, "/v1/ai/generate")
                    .json(&json!({ "prompt": prompt })),
            )
            .await?;
        Ok(response.text)
    }
}

/// `error.message` from a structured error body
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Chat sessions talk to the AI through the backend proxy
#[derive(Debug, Clone)]
pub struct ProxyClient {
    api: ApiClient,
}

impl ProxyClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl GenerateClient for ProxyClient {
    async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        self.api.generate(prompt).await
    }
}
