//! Request authentication context types.

use crate::types::Identity;

/// Authentication context attached to a request with a verified token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The verified identity behind the token.
    pub identity: Identity,

    /// The raw access token as presented, for downstream provider calls.
    pub access_token: String,
}

impl AuthContext {
    /// Creates a new authentication context.
    #[must_use]
    pub fn new(identity: Identity, access_token: impl Into<String>) -> Self {
        Self {
            identity,
            access_token: access_token.into(),
        }
    }

    /// Returns the subject identifier of the authenticated user.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.identity.sub
    }

    /// Returns the username of the authenticated user.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.identity.username
    }
}
