//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::{anyhow, Result};
use std::env;

const DEFAULT_PORT: u16 = 5001;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";

/// Backing store for conversations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreProvider {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "postgres" => Ok(StoreProvider::Postgres),
            "memory" => Ok(StoreProvider::Memory),
            other => Err(anyhow!(
                "Unknown STORE_PROVIDER: {}. Supported providers: postgres, memory",
                other
            )),
        }
    }
}

/// How the backend produces bot replies when messages are appended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyMode {
    /// Canned acknowledgement and echo texts
    #[default]
    Simulated,
    /// Replies generated through the AI proxy
    Assistant,
}

impl std::str::FromStr for ReplyMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "simulated" => Ok(ReplyMode::Simulated),
            "assistant" => Ok(ReplyMode::Assistant),
            other => Err(anyhow!(
                "Unknown REPLY_MODE: {}. Supported modes: simulated, assistant",
                other
            )),
        }
    }
}

/// Log output format for the server binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub store_provider: StoreProvider,
    /// Required when `store_provider` is Postgres
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
    pub cors_allowed_origins: String,
    pub reply_mode: ReplyMode,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("store_provider", &self.store_provider)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("reply_mode", &self.reply_mode)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_provider = lookup("STORE_PROVIDER")
            .map(|v| v.parse::<StoreProvider>())
            .transpose()?
            .unwrap_or(StoreProvider::Postgres);

        let database_url = lookup("DATABASE_URL").filter(|v| !v.is_empty());
        if store_provider == StoreProvider::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL is required for the postgres store"));
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET is required"))?;

        let reply_mode = lookup("REPLY_MODE")
            .map(|v| v.parse::<ReplyMode>())
            .transpose()?
            .unwrap_or_default();

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            store_provider,
            database_url,
            jwt_secret,
            jwt_issuer: lookup("JWT_ISSUER"),
            jwt_audience: lookup("JWT_AUDIENCE"),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
            reply_mode,
            log_format,
        })
    }
}
