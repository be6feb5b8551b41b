//! Authorization context for authenticated users

use crate::owner::OwnerId;

/// Represents an authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub owner: OwnerId,
}

impl AuthContext {
    pub fn new(owner: OwnerId) -> Self {
        Self { owner }
    }

    /// Identity that owns the caller's conversations
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }
}
