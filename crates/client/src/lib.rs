//! Palaver chat client
//!
//! Everything the chat front end needs that is not drawing pixels:
//! - Response formatting: markdown-ish model output to sanitized HTML
//! - Durable local conversation state with a pure reducer
//! - The send-a-question flow against the AI proxy
//! - A typed HTTP client for the backend API

pub mod api;
pub mod error;
pub mod formatter;
pub mod session;
pub mod state;
pub mod storage;

pub use api::{ApiClient, ProxyClient, RemoteConversation, RemoteMessage};
pub use error::ClientError;
pub use formatter::format;
pub use session::{ChatSession, GenerateClient, FALLBACK_REPLY};
pub use state::{
    reduce, ClientAction, ClientSnapshot, ClientStore, LocalConversation, LocalMessage,
    MessageType,
};
pub use storage::{DurableStorage, FileStorage, MemoryStorage};
