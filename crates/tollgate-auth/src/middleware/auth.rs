//! Bearer token authentication extractors.
//!
//! This module provides Axum extractors that verify Bearer tokens against
//! the identity provider and attach the resulting context to requests.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use tollgate_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> String {
//!     format!("Hello, {}!", auth.username())
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(auth_state);
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};

use crate::error::AuthError;
use crate::idp::UserPoolClient;

use super::types::AuthContext;

// =============================================================================
// Auth State
// =============================================================================

/// State required for bearer token verification.
///
/// Include this in your application state and make it available to the
/// extractors via `FromRef`.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone)]
/// struct AppState {
///     auth: AuthState,
///     // ... other state
/// }
///
/// impl FromRef<AppState> for AuthState {
///     fn from_ref(state: &AppState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthState {
    /// User-pool client used to verify presented tokens.
    pub user_pool: Arc<UserPoolClient>,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(user_pool: Arc<UserPoolClient>) -> Self {
        Self { user_pool }
    }
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor that requires a verified Bearer token.
///
/// This extractor:
/// 1. Extracts the `Authorization: Bearer <token>` header
/// 2. Verifies the token against the identity provider
/// 3. Attaches the verified [`AuthContext`] to the request
///
/// # Errors
///
/// Returns `AuthError` (which implements `IntoResponse`) as:
/// - [`AuthError::Unauthorized`] when the header is missing or malformed
/// - [`AuthError::Forbidden`] when the provider rejects the token
/// - a server-class error when verification itself fails, so an outage is
///   never reported to the caller as a bad credential
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        // 1. Extract the Bearer token from the Authorization header.
        let Some(token) = bearer_token(parts) else {
            return Err(AuthError::unauthorized("Missing bearer token"));
        };

        // 2. Verify it against the identity provider.
        let identity = match auth_state.user_pool.verify_token(&token).await {
            Ok(identity) => identity,
            Err(err) if matches!(err, AuthError::InvalidCredential { .. }) => {
                tracing::debug!(error = %err, "bearer token rejected");
                return Err(AuthError::forbidden("Token verification failed"));
            }
            // Provider or network failure: not the caller's fault.
            Err(err) => {
                tracing::warn!(error = %err, "bearer token verification errored");
                return Err(err);
            }
        };

        tracing::debug!(
            subject = %identity.sub,
            username = %identity.username,
            "bearer token verified"
        );

        Ok(BearerAuth(AuthContext::new(identity, token)))
    }
}

// =============================================================================
// Optional Bearer Auth Extractor
// =============================================================================

/// Axum extractor that attaches auth context when a valid token is present.
///
/// Runs the same verification as [`BearerAuth`] but never rejects the
/// request: a missing, invalid, or unverifiable token yields `None` and the
/// handler runs unauthenticated. Useful for endpoints that render
/// differently for signed-in users.
///
/// # Example
///
/// ```ignore
/// async fn handler(OptionalBearerAuth(auth): OptionalBearerAuth) -> String {
///     match auth {
///         Some(ctx) => format!("Hello, {}!", ctx.username()),
///         None => "Hello, anonymous!".to_string(),
///     }
/// }
/// ```
pub struct OptionalBearerAuth(pub Option<AuthContext>);

impl<S> FromRequestParts<S> for OptionalBearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match BearerAuth::from_request_parts(parts, state).await {
            Ok(BearerAuth(context)) => Ok(OptionalBearerAuth(Some(context))),
            Err(err) => {
                // An absent header is the normal anonymous case; anything
                // else is worth a log line before proceeding without auth.
                if !matches!(err, AuthError::Unauthorized { .. }) {
                    tracing::debug!(error = %err, "optional bearer auth continuing unauthenticated");
                }
                Ok(OptionalBearerAuth(None))
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Extracts a non-empty Bearer token from the Authorization header.
fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
}
