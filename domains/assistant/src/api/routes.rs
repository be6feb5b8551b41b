//! Route definitions for Assistant domain API

use axum::{routing::post, Router};

use super::handlers::generate;
use super::middleware::AssistantState;

/// Create all Assistant domain API routes
pub fn routes() -> Router<AssistantState> {
    Router::new().route("/v1/ai/generate", post(generate::generate))
}
