//! Authorization-code callback handling.
//!
//! The provider redirects the browser back here after the user
//! authenticates. [`complete_login`] walks the attempt through its stages
//! in order: state validation, code exchange, nonce validation, userinfo
//! fetch, session write. The first failing stage aborts the attempt;
//! tokens and user info reach the session only after every stage has
//! passed, in a single write.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::Deserialize;

use crate::error::AuthError;
use crate::http::cookies::{extract_session_cookie, login_redirect};
use crate::http::login::AuthFlowState;
use crate::http::see_other;
use crate::oidc::id_token_claims;
use crate::session::AuthSession;
use crate::types::Identity;

// =============================================================================
// Request Types
// =============================================================================

/// Query parameters delivered to the redirect URI by the provider.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Authorization code, present on success.
    #[serde(default)]
    pub code: Option<String>,

    /// Echo of the `state` value from the authorization request.
    #[serde(default)]
    pub state: Option<String>,

    /// OAuth error code, present when the provider rejected the request.
    #[serde(default)]
    pub error: Option<String>,

    /// Freeform provider description of the error. Logged, never surfaced.
    #[serde(default)]
    pub error_description: Option<String>,
}

// =============================================================================
// Failure Reasons
// =============================================================================

/// Failure reasons for the callback flow.
///
/// Exactly one of these is produced per failed callback. The browser only
/// ever sees the opaque code from [`CallbackError::as_query_code`]; the
/// underlying cause stays in the server log.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// Discovery has not produced a usable OIDC client.
    #[error("OIDC client is not ready")]
    ClientNotReady(#[source] AuthError),

    /// The callback's state or the token's nonce does not match the
    /// pending login. Treated as tampering: nothing is written.
    #[error("state or nonce mismatch")]
    StateMismatch,

    /// The token endpoint rejected or failed the code exchange.
    #[error("code exchange failed")]
    CodeExchange(#[source] AuthError),

    /// The userinfo fetch failed. Tokens are not persisted without it.
    #[error("userinfo fetch failed")]
    UserInfo(#[source] AuthError),

    /// The session store failed while completing the login.
    #[error("session store failure")]
    Session(#[source] AuthError),
}

impl CallbackError {
    /// Opaque code placed in the login-page redirect.
    #[must_use]
    pub fn as_query_code(&self) -> &'static str {
        match self {
            Self::ClientNotReady(_) => "provider_unavailable",
            Self::StateMismatch => "invalid_state",
            Self::CodeExchange(_) => "exchange_failed",
            Self::UserInfo(_) => "userinfo_failed",
            Self::Session(_) => "session_error",
        }
    }
}

// =============================================================================
// Flow
// =============================================================================

/// Completes a pending login from a received callback.
///
/// On success the tokens and user info are written into the session in a
/// single [`AuthSession::persist_login`] call and the signed-in identity is
/// returned. On any failure the session keeps its prior contents; a
/// mismatched state or nonce additionally clears nothing and grants
/// nothing, since it indicates a forged or replayed callback.
///
/// # Errors
///
/// Returns the [`CallbackError`] naming the stage that failed.
pub async fn complete_login(
    flow: &AuthFlowState,
    session_id: &str,
    mut session: AuthSession,
    params: &CallbackParams,
) -> Result<Identity, CallbackError> {
    // Step 1: the OIDC client must be ready (or become ready now).
    let client = flow
        .provider
        .get()
        .await
        .map_err(CallbackError::ClientNotReady)?;

    // Step 2: a provider-reported error aborts before any token traffic.
    if let Some(error) = params.error.as_deref() {
        tracing::warn!(
            error,
            description = params.error_description.as_deref().unwrap_or(""),
            "authorization callback carried a provider error"
        );
        return Err(CallbackError::CodeExchange(AuthError::identity_provider(
            format!("authorization request failed: {error}"),
        )));
    }

    // Step 3: validate the echoed state against the pending login.
    let (Some(code), Some(state_param)) = (params.code.as_deref(), params.state.as_deref()) else {
        return Err(CallbackError::StateMismatch);
    };
    let Some(expected_state) = session.state.as_deref() else {
        return Err(CallbackError::StateMismatch);
    };
    if expected_state != state_param {
        return Err(CallbackError::StateMismatch);
    }

    // Step 4: exchange the code for tokens.
    let tokens = client
        .exchange_code(code)
        .await
        .map_err(CallbackError::CodeExchange)?;

    // Step 5: the ID token's nonce must match the pending login.
    let claims = id_token_claims(&tokens.id_token).map_err(CallbackError::CodeExchange)?;
    let (Some(expected_nonce), Some(actual_nonce)) =
        (session.nonce.as_deref(), claims.nonce.as_deref())
    else {
        return Err(CallbackError::StateMismatch);
    };
    if expected_nonce != actual_nonce {
        return Err(CallbackError::StateMismatch);
    }

    // Step 6: resolve the signed-in identity.
    let identity = client
        .fetch_userinfo(&tokens.access_token)
        .await
        .map_err(CallbackError::UserInfo)?;

    // Step 7: write tokens and user info into the session, once.
    session.persist_login(tokens, identity.clone());
    flow.sessions
        .save(session_id, &session)
        .await
        .map_err(CallbackError::Session)?;

    tracing::debug!(session_id = %session_id, sub = %identity.sub, "login persisted");

    Ok(identity)
}

// =============================================================================
// Handler
// =============================================================================

/// Handler for `GET /auth/callback`.
///
/// Completes a pending login and redirects:
/// - on success, to the configured post-login path
/// - on failure, to the login page with an opaque `error` code
///
/// A callback without a session cookie, or for a session with no pending
/// login, is indistinguishable from tampering and fails the same way a
/// state mismatch does.
pub async fn callback_handler(
    State(flow): State<AuthFlowState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let outcome = match extract_session_cookie(&headers, &flow.config.session) {
        Some(session_id) => match flow.sessions.load(&session_id).await {
            Ok(Some(session)) => complete_login(&flow, &session_id, session, &params).await,
            Ok(None) => Err(CallbackError::StateMismatch),
            Err(err) => Err(CallbackError::Session(err)),
        },
        None => Err(CallbackError::StateMismatch),
    };

    match outcome {
        Ok(identity) => {
            tracing::info!(username = %identity.username, "login completed");
            see_other(&flow.config.session.post_login_path)
        }
        Err(err) => {
            tracing::warn!(reason = err.as_query_code(), error = ?err, "login callback failed");
            see_other(&login_redirect(
                &flow.config.session.login_path,
                err.as_query_code(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_codes_are_opaque() {
        let err = CallbackError::CodeExchange(AuthError::identity_provider(
            "token endpoint returned status 500",
        ));
        assert_eq!(err.as_query_code(), "exchange_failed");
        assert_eq!(CallbackError::StateMismatch.as_query_code(), "invalid_state");

        let err = CallbackError::ClientNotReady(AuthError::discovery("HTTP error: status 503"));
        assert_eq!(err.as_query_code(), "provider_unavailable");

        // The code never carries provider text.
        for err in [
            CallbackError::ClientNotReady(AuthError::discovery("x")),
            CallbackError::StateMismatch,
            CallbackError::CodeExchange(AuthError::identity_provider("x")),
            CallbackError::UserInfo(AuthError::identity_provider("x")),
            CallbackError::Session(AuthError::session("x")),
        ] {
            assert!(!err.as_query_code().contains(' '));
        }
    }

    #[test]
    fn test_callback_params_deserialize() {
        let params: CallbackParams =
            serde_json::from_value(serde_json::json!({ "code": "abc", "state": "xyz" })).unwrap();
        assert_eq!(params.code.as_deref(), Some("abc"));
        assert_eq!(params.state.as_deref(), Some("xyz"));
        assert!(params.error.is_none());

        let params: CallbackParams = serde_json::from_value(serde_json::json!({
            "error": "access_denied",
            "error_description": "User cancelled"
        }))
        .unwrap();
        assert!(params.code.is_none());
        assert_eq!(params.error.as_deref(), Some("access_denied"));
    }
}
