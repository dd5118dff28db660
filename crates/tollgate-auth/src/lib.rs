//! # tollgate-auth
//!
//! Authentication and session core for the Tollgate backend.
//!
//! This crate provides:
//! - Password sign-up, confirmation, and sign-in against a hosted user pool
//! - Client secret-hash computation for confidential pool clients
//! - OIDC discovery with a lazily initialized process-wide client
//! - Authorization-code redirect flow with state/nonce validation
//! - Bearer-token verification middleware for protected routes
//! - Cookie-backed session plumbing for the browser flow
//!
//! ## Overview
//!
//! Two authentication paths share one configuration. The password path talks
//! to the user-pool API directly and works even when the OIDC issuer is
//! unreachable. The redirect path discovers the issuer's endpoints once per
//! process and drives the browser through authorize, code exchange, and
//! userinfo before persisting the session.
//!
//! ## Modules
//!
//! - [`config`] - Pool, client, and session cookie configuration
//! - [`secret_hash`] - HMAC secret hash for confidential clients
//! - [`idp`] - User-pool adapter: sign-up, sign-in, refresh, verification
//! - [`oidc`] - Issuer discovery and the relying-party client singleton
//! - [`http`] - Axum handlers for the login, callback, and logout routes
//! - [`middleware`] - Bearer-token extractors for protected routes
//! - [`session`] - Session state and the pluggable session store
//! - [`types`] - Identity and token types shared across both paths

pub mod config;
pub mod error;
pub mod http;
pub mod idp;
pub mod middleware;
pub mod oidc;
pub mod secret_hash;
pub mod session;
pub mod types;

pub use config::{AuthConfig, ConfigError, SessionConfig};
pub use error::{AuthError, ErrorKind};
pub use http::{
    AuthFlowState, CallbackError, CallbackParams, callback_handler, complete_login, login_handler,
    logout_handler,
};
pub use idp::{CodeDelivery, SignUpOutcome, UserPoolClient};
pub use middleware::{AuthContext, AuthState, BearerAuth, OptionalBearerAuth};
pub use oidc::{
    DiscoveryClient, DiscoveryError, IdTokenClaims, OidcProvider, ProviderMetadata, RelyingParty,
    UserInfoClaims, id_token_claims,
};
pub use session::{AuthSession, MemorySessionStore, SessionStore, new_session_id};
pub use types::{Identity, TokenSet};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tollgate_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError, SessionConfig};
    pub use crate::error::{AuthError, ErrorKind};
    pub use crate::http::{
        AuthFlowState, CallbackError, CallbackParams, callback_handler, complete_login,
        login_handler, logout_handler,
    };
    pub use crate::idp::{CodeDelivery, SignUpOutcome, UserPoolClient};
    pub use crate::middleware::{AuthContext, AuthState, BearerAuth, OptionalBearerAuth};
    pub use crate::oidc::{OidcProvider, ProviderMetadata, RelyingParty, UserInfoClaims};
    pub use crate::session::{AuthSession, MemorySessionStore, SessionStore, new_session_id};
    pub use crate::types::{Identity, TokenSet};
}
