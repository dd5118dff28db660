//! Logout endpoint for the browser flow.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;

use crate::http::cookies::{clear_session_cookie, extract_session_cookie};
use crate::http::login::AuthFlowState;
use crate::http::see_other_with_cookie;

/// Handler for `GET /auth/logout`.
///
/// This endpoint:
/// 1. Revokes the user's tokens at the provider via global sign-out
/// 2. Removes the server-side session
/// 3. Clears the session cookie and redirects to the login page
///
/// The endpoint is lenient: sign-out and session removal failures are
/// logged but never block the redirect, so the cookie is always cleared
/// on the client.
pub async fn logout_handler(State(flow): State<AuthFlowState>, headers: HeaderMap) -> Response {
    if let Some(session_id) = extract_session_cookie(&headers, &flow.config.session) {
        // Step 1: best-effort global sign-out at the provider.
        match flow.sessions.load(&session_id).await {
            Ok(Some(session)) => {
                if let Some(tokens) = session.tokens.as_ref() {
                    match flow.user_pool.sign_out(&tokens.access_token).await {
                        Ok(()) => {
                            tracing::debug!(session_id = %session_id, "global sign-out completed");
                        }
                        Err(err) => {
                            tracing::debug!(error = %err, "global sign-out failed during logout");
                        }
                    }
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(error = %err, "session load failed during logout");
            }
        }

        // Step 2: drop the server-side session.
        if let Err(err) = flow.sessions.remove(&session_id).await {
            tracing::debug!(error = %err, "session removal failed during logout");
        } else {
            tracing::info!(session_id = %session_id, "session ended");
        }
    }

    // Step 3: clear the cookie and return to the login page.
    see_other_with_cookie(
        &flow.config.session.login_path,
        &clear_session_cookie(&flow.config.session),
    )
}
