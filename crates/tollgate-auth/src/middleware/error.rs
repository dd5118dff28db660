//! Error response handling for authentication middleware.
//!
//! This module implements `IntoResponse` for `AuthError` so extractors and
//! handlers can propagate typed errors straight to HTTP responses.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, oauth_error) = response_parts(&self);
        let message = self.to_string();

        let body = json!({
            "error": self.kind().as_str(),
            "message": message,
        });

        let mut headers = HeaderMap::new();

        // RFC 6750: bearer challenges accompany 401 responses.
        if status == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(oauth_error, &message);
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        (status, headers, Json(body)).into_response()
    }
}

/// Maps an `AuthError` to its HTTP status and OAuth error code.
///
/// Configuration and session faults are the server's own (500); provider
/// faults are upstream (502); discovery unavailability is retryable (503);
/// credential problems split into missing (401 unauthenticated), rejected
/// (401/403), and tampering (400).
fn response_parts(error: &AuthError) -> (StatusCode, &'static str) {
    match error {
        AuthError::Configuration { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "server_error"),
        AuthError::IdentityProvider { .. } => (StatusCode::BAD_GATEWAY, "server_error"),
        AuthError::InvalidCredential { .. } => (StatusCode::UNAUTHORIZED, "invalid_token"),
        AuthError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
        AuthError::Forbidden { .. } => (StatusCode::FORBIDDEN, "access_denied"),
        AuthError::Discovery { .. } => (StatusCode::SERVICE_UNAVAILABLE, "temporarily_unavailable"),
        AuthError::StateMismatch => (StatusCode::BAD_REQUEST, "invalid_request"),
        AuthError::Session { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "server_error"),
    }
}

/// Builds the WWW-Authenticate header value for 401 responses.
///
/// Format: `Bearer realm="tollgate", error="invalid_token", error_description="..."`
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped_desc = description.replace('\"', "\\\"");
    format!(
        "Bearer realm=\"tollgate\", error=\"{}\", error_description=\"{}\"",
        error, escaped_desc
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_unauthorized_response() {
        let error = AuthError::unauthorized("Missing bearer token");
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let headers = response.headers();
        assert!(headers.contains_key(header::WWW_AUTHENTICATE));

        let www_auth = headers
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(www_auth.contains("Bearer"));
        assert!(www_auth.contains("realm=\"tollgate\""));
        assert!(www_auth.contains("error=\"unauthorized\""));
    }

    #[tokio::test]
    async fn test_forbidden_response_has_no_challenge() {
        let error = AuthError::forbidden("Token verification failed");
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_provider_error_maps_to_bad_gateway() {
        let error = AuthError::identity_provider("pool request failed");
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_discovery_error_maps_to_service_unavailable() {
        let error = AuthError::discovery("HTTP error: status 500");
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_state_mismatch_maps_to_bad_request() {
        let response = AuthError::StateMismatch.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_response_body_shape() {
        let error = AuthError::invalid_credential("authentication failed");
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "invalid_credential");
        assert!(
            json["message"]
                .as_str()
                .unwrap()
                .contains("authentication failed")
        );
    }

    #[test]
    fn test_www_authenticate_header_escaping() {
        let header = build_www_authenticate_header("invalid_token", "Token contains \"quotes\"");
        assert!(header.contains("\\\"quotes\\\""));
    }
}
