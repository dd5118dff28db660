//! Browser session state for the redirect flow.
//!
//! The session store itself is an external collaborator (typically
//! cookie-referenced server-side storage owned by the host); this module
//! defines the state this core reads and writes, the [`SessionStore`] seam
//! it goes through, and an in-memory implementation for development and
//! tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AuthError;
use crate::types::{Identity, TokenSet};

/// Per-browser authentication state.
///
/// `state` and `nonce` are written at authorize-redirect time and consumed
/// by the callback's anti-tampering checks; `tokens` and `user_info` are
/// written exactly once when a callback completes successfully.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Anti-CSRF value expected back from the authorize redirect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Anti-replay value expected in the ID token's `nonce` claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Tokens obtained by the completed login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenSet>,

    /// Identity fetched from the userinfo endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<Identity>,
}

impl AuthSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the `state` and `nonce` for an authorize redirect about to
    /// be issued. Any values from an earlier, unfinished login attempt are
    /// replaced.
    pub fn begin_login(&mut self, state: impl Into<String>, nonce: impl Into<String>) {
        self.state = Some(state.into());
        self.nonce = Some(nonce.into());
    }

    /// Writes the completed login into the session and consumes the
    /// one-time `state`/`nonce` values.
    ///
    /// This is the only place tokens and user info enter a session, which
    /// keeps the callback's write-exactly-once contract checkable.
    pub fn persist_login(&mut self, tokens: TokenSet, user_info: Identity) {
        self.tokens = Some(tokens);
        self.user_info = Some(user_info);
        self.state = None;
        self.nonce = None;
    }

    /// Returns `true` if a completed login is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_some() && self.user_info.is_some()
    }

    /// Returns `true` if an authorize redirect has been issued but no
    /// callback has completed yet.
    #[must_use]
    pub fn has_pending_login(&self) -> bool {
        self.state.is_some() && self.nonce.is_some()
    }
}

/// Generates a fresh session identifier.
#[must_use]
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Storage seam for browser sessions.
///
/// Implementations own durability and concurrency; this core assumes
/// writes to a single session are serialized by the store (the callback
/// handler is the only writer during a login flow).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the session for `session_id`, or `None` if absent.
    async fn load(&self, session_id: &str) -> Result<Option<AuthSession>, AuthError>;

    /// Saves `session` under `session_id`, replacing any previous value.
    async fn save(&self, session_id: &str, session: &AuthSession) -> Result<(), AuthError>;

    /// Removes the session for `session_id`. Removing an absent session is
    /// not an error.
    async fn remove(&self, session_id: &str) -> Result<(), AuthError>;
}

/// In-memory session store for development and tests.
///
/// Not for production: sessions vanish on restart and are never expired.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, AuthSession>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if no sessions are stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<AuthSession>, AuthError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, session: &AuthSession) -> Result<(), AuthError> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), session.clone());
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<(), AuthError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
