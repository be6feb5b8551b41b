//! Concrete authentication backend
//!
//! Holds the token validation settings. Identities are owned by the external
//! provider, so there is no user table to consult.

use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::jwt::validate_jwt_token;
use crate::owner::OwnerId;

/// Concrete authentication backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone, Debug)]
pub struct AuthBackend {
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Authenticate via JWT: validate the token and lift its subject into an owner identity
    pub async fn authenticate_jwt(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = validate_jwt_token(token, &self.config)?;

        let owner = OwnerId::new(claims.sub).map_err(|_| {
            tracing::debug!("JWT subject is blank");
            AuthError::InvalidUserId
        })?;

        Ok(AuthContext::new(owner))
    }
}
