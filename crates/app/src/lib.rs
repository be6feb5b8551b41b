//! Palaver application composition root
//!
//! Composes all domain routers into a single application and provides the
//! shared HTTP middleware and logging setup used by the server binary.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use palaver_assistant::AssistantState;
use palaver_auth::{AuthBackend, AuthConfig};
use palaver_common::{Config, LogFormat};
use palaver_conversations::{
    reply_generator, ConversationService, ConversationStore, ConversationsState,
};
use palaver_llm::LlmService;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the main application router with all routes
pub fn create_app(
    config: &Config,
    store: Arc<dyn ConversationStore>,
    llm: Arc<dyn LlmService>,
) -> Router {
    let auth = AuthBackend::new(AuthConfig::from(config));

    let replies = reply_generator(config.reply_mode, llm.clone());
    tracing::info!(reply_mode = ?config.reply_mode, "Conversation replies configured");

    let conversations_state = ConversationsState {
        service: ConversationService::new(store, replies),
        auth,
    };

    let assistant_state = AssistantState { llm };

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Palaver API v0.0.1-SNAPSHOT" }),
        )
        .merge(palaver_conversations::routes().with_state(conversations_state))
        .merge(palaver_assistant::routes().with_state(assistant_state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// CORS for the browser client: `*` or a comma-separated origin list
pub fn build_cors_layer(origins: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Reject request bodies over `MAX_BODY_BYTES` with 413
pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(MAX_BODY_BYTES)
}

/// Wrap the router in the HTTP middleware stack used by the server.
///
/// The body limit sits outside CORS: `CorsLayer` needs a `Default` response
/// body from its inner service, which the limit's body is not.
pub fn with_http_layers(router: Router, cors_origins: &str) -> Router {
    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(cors_origins)),
        )
        .layer(body_limit_layer())
}

/// Initialize the tracing subscriber with structured logging
pub fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,palaver=debug,tower_http=debug"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_target(true))
            .init(),
    }
}
