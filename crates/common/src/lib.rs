//! Shared utilities, configuration, and error handling for Palaver
//!
//! This crate provides common functionality used across the Palaver workspace:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP mapping
//! - Request extractors
//! - Conversation title helpers

pub mod config;
pub mod error;
pub mod extractors;
pub mod text;

pub use config::{Config, LogFormat, ReplyMode, StoreProvider};
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
