//! Common error types and handling for Palaver

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Palaver backend
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// External AI service failure, including timeouts.
    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        payload: Option<Value>,
    },

    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}

impl Error {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::EmptyResponse(_) => StatusCode::BAD_GATEWAY,
            Error::Unexpected(_)
            | Error::Serialization(_)
            | Error::Persistence(_)
            | Error::Configuration(_)
            | Error::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unexpected(_) => "UNEXPECTED_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Authentication(_) => "AUTHENTICATION_ERROR",
            Error::Forbidden(_) => "FORBIDDEN",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Persistence(_) => "PERSISTENCE_ERROR",
            Error::Configuration(_) => "CONFIGURATION_ERROR",
            Error::Upstream { .. } => "UPSTREAM_ERROR",
            Error::EmptyResponse(_) => "EMPTY_RESPONSE",
        }
    }

    /// Upstream payload attached to the error, if any
    pub fn details(&self) -> Option<&Value> {
        match self {
            Error::Upstream { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Log server-side failures with full context
        if status.is_server_error() {
            tracing::error!(error = %self, code = error_code, "Request failed");
        }

        let mut error = json!({
            "code": error_code,
            "message": self.to_string(),
        });
        if let Some(details) = self.details() {
            error["details"] = details.clone();
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
