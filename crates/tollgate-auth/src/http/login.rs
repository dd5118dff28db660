//! Login entry point for the browser redirect flow.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::config::AuthConfig;
use crate::http::cookies::{extract_session_cookie, login_redirect, session_cookie};
use crate::http::{see_other, see_other_with_cookie};
use crate::idp::UserPoolClient;
use crate::oidc::OidcProvider;
use crate::session::{AuthSession, SessionStore, new_session_id};

// =============================================================================
// State Types
// =============================================================================

/// Shared state for the browser-flow handlers.
#[derive(Clone)]
pub struct AuthFlowState {
    /// Authentication configuration.
    pub config: Arc<AuthConfig>,
    /// Lazily discovered OIDC client.
    pub provider: Arc<OidcProvider>,
    /// Direct user-pool API client, used for global sign-out.
    pub user_pool: Arc<UserPoolClient>,
    /// Externally owned session store.
    pub sessions: Arc<dyn SessionStore>,
}

impl AuthFlowState {
    /// Creates the shared flow state.
    #[must_use]
    pub fn new(
        config: Arc<AuthConfig>,
        provider: Arc<OidcProvider>,
        user_pool: Arc<UserPoolClient>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            provider,
            user_pool,
            sessions,
        }
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Handler for `GET /auth/login`.
///
/// Starts an authorization-code login:
/// 1. Reuses the browser's session or issues a fresh session id
/// 2. Waits for the OIDC client, running discovery if this is the first use
/// 3. Generates fresh `state` and `nonce` values for this attempt
/// 4. Persists both in the session, replacing any earlier pending login
/// 5. Redirects to the provider's authorization endpoint
///
/// Failures send the browser back to the login page with an opaque
/// `error` code; the cause stays in the log.
pub async fn login_handler(State(flow): State<AuthFlowState>, headers: HeaderMap) -> Response {
    // Step 1: reuse the browser's session or start a new one.
    let session_id =
        extract_session_cookie(&headers, &flow.config.session).unwrap_or_else(new_session_id);

    // Step 2: the OIDC client must be ready before we hand out a redirect.
    let client = match flow.provider.get().await {
        Ok(client) => client,
        Err(err) => {
            tracing::warn!(error = %err, "login aborted: OIDC client not ready");
            return see_other(&login_redirect(
                &flow.config.session.login_path,
                "provider_unavailable",
            ));
        }
    };

    // Step 3: fresh state and nonce for this attempt.
    let state_token = flow_token();
    let nonce = flow_token();

    // Step 4: persist the pending login before redirecting.
    let mut session = match flow.sessions.load(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => AuthSession::default(),
        Err(err) => {
            tracing::warn!(error = %err, "login aborted: session load failed");
            return see_other(&login_redirect(
                &flow.config.session.login_path,
                "session_error",
            ));
        }
    };
    session.begin_login(state_token.clone(), nonce.clone());

    if let Err(err) = flow.sessions.save(&session_id, &session).await {
        tracing::warn!(error = %err, "login aborted: session save failed");
        return see_other(&login_redirect(
            &flow.config.session.login_path,
            "session_error",
        ));
    }

    // Step 5: send the browser to the provider.
    let authorize_url = client.authorization_url(&state_token, &nonce);
    tracing::debug!(session_id = %session_id, "redirecting to authorization endpoint");

    see_other_with_cookie(
        authorize_url.as_str(),
        &session_cookie(&flow.config.session, &session_id),
    )
}

/// Generates a URL-safe random token for `state` and `nonce` values.
fn flow_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_token_is_fresh_and_url_safe() {
        let first = flow_token();
        let second = flow_token();

        assert_ne!(first, second);
        // 32 random bytes encode to 43 base64url characters.
        assert_eq!(first.len(), 43);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
