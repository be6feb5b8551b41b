//! Authentication middleware for the Palaver API
//!
//! Validates bearer JWTs issued by the external identity provider and
//! exposes the caller's identity through axum extractors that work with
//! any domain state implementing `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;
mod owner;

pub use backend::AuthBackend;
pub use claims::TokenClaims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::AuthUser;
pub use owner::OwnerId;
