//! OpenID Connect discovery client.
//!
//! Fetches provider metadata for the configured issuer from its
//! `.well-known/openid-configuration` endpoint and validates the response.
//!
//! # Security Considerations
//!
//! - Only HTTPS issuer URLs are allowed unless [`AuthConfig::allow_http`] is set
//! - The issuer claim in the discovery document must match the configured issuer
//! - HTTP timeouts prevent hanging on slow endpoints
//! - Response size is limited to prevent resource exhaustion
//!
//! # References
//!
//! - [OpenID Connect Discovery 1.0](https://openid.net/specs/openid-connect-discovery-1_0.html)
//! - [RFC 8414 - OAuth 2.0 Authorization Server Metadata](https://tools.ietf.org/html/rfc8414)

use std::sync::Arc;

use url::Url;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::oidc::metadata::ProviderMetadata;

/// Maximum accepted size of a discovery document, in bytes.
const MAX_METADATA_BYTES: usize = 1024 * 1024; // 1 MB

/// Errors that can occur during OIDC discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// A network error occurred while fetching the discovery document.
    #[error("Network error: {0}")]
    Network(String),

    /// The HTTP request returned a non-success status code.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// The discovery document could not be parsed as JSON.
    #[error("Failed to parse discovery document: {0}")]
    Parse(String),

    /// The issuer in the discovery document does not match the configured issuer.
    #[error("Issuer mismatch: expected {expected}, got {actual}")]
    IssuerMismatch {
        /// The configured issuer URL.
        expected: String,
        /// The issuer URL asserted by the discovery document.
        actual: String,
    },

    /// The issuer URL scheme is not allowed (must be HTTPS in production).
    #[error("Invalid URL scheme: {0} (only HTTPS is allowed)")]
    InvalidScheme(String),

    /// A URL in the discovery document could not be parsed.
    #[error("Invalid {field} URL in discovery document: {message}")]
    InvalidEndpoint {
        /// The metadata field holding the malformed URL.
        field: &'static str,
        /// The parse failure.
        message: String,
    },

    /// The response exceeded the maximum allowed size.
    #[error("Response exceeds maximum size of {max_size} bytes")]
    ResponseTooLarge {
        /// The maximum allowed size.
        max_size: usize,
    },
}

impl From<DiscoveryError> for AuthError {
    fn from(err: DiscoveryError) -> Self {
        AuthError::discovery(err.to_string())
    }
}

/// Client for fetching the configured issuer's OIDC discovery document.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    http_client: reqwest::Client,
    config: Arc<AuthConfig>,
}

impl DiscoveryClient {
    /// Creates a new discovery client for the configured issuer.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] when the configuration is invalid
    /// or the HTTP client cannot be constructed.
    pub fn new(config: Arc<AuthConfig>) -> Result<Self, AuthError> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| {
                AuthError::configuration(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Fetches and validates the discovery document for the configured issuer.
    ///
    /// This method:
    /// 1. Validates the issuer URL scheme
    /// 2. Builds the well-known discovery URL
    /// 3. Fetches and parses the document
    /// 4. Verifies that the asserted issuer matches the configured issuer
    ///
    /// # Errors
    ///
    /// Returns a [`DiscoveryError`] describing which of the steps above failed.
    /// No state is cached here; retry policy belongs to the caller.
    pub async fn discover(&self) -> Result<ProviderMetadata, DiscoveryError> {
        let issuer = &self.config.issuer;

        self.validate_issuer_scheme(issuer)?;

        let discovery_url = well_known_url(issuer);

        let response = self
            .http_client
            .get(discovery_url.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(issuer = %issuer, error = %err, "failed to fetch discovery document");
                DiscoveryError::Network(err.to_string())
            })?;

        if !response.status().is_success() {
            return Err(DiscoveryError::HttpStatus(response.status().as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > MAX_METADATA_BYTES
        {
            return Err(DiscoveryError::ResponseTooLarge {
                max_size: MAX_METADATA_BYTES,
            });
        }

        let metadata: ProviderMetadata = response.json().await.map_err(|err| {
            tracing::warn!(issuer = %issuer, error = %err, "failed to parse discovery document");
            DiscoveryError::Parse(err.to_string())
        })?;

        validate_issuer(&metadata, issuer)?;

        tracing::debug!(issuer = %metadata.issuer, "discovered provider configuration");

        Ok(metadata)
    }

    /// Validates that the issuer URL uses an allowed scheme.
    fn validate_issuer_scheme(&self, issuer: &Url) -> Result<(), DiscoveryError> {
        let scheme = issuer.scheme();

        if scheme == "https" {
            return Ok(());
        }

        if scheme == "http" && self.config.allow_http {
            return Ok(());
        }

        Err(DiscoveryError::InvalidScheme(scheme.to_string()))
    }
}

/// Builds the discovery URL from an issuer URL.
///
/// Per OIDC Discovery, the document is located at
/// `{issuer}/.well-known/openid-configuration`.
fn well_known_url(issuer: &Url) -> Url {
    let mut discovery_url = issuer.clone();
    let path = issuer.path().trim_end_matches('/');
    discovery_url.set_path(&format!("{path}/.well-known/openid-configuration"));
    discovery_url
}

/// Validates that the issuer asserted by the document matches the configured one.
///
/// OIDC Discovery Section 4.3: "The issuer value returned MUST be identical
/// to the Issuer URL that was directly used to retrieve the configuration
/// information." Comparison normalizes trailing slashes only.
fn validate_issuer(metadata: &ProviderMetadata, expected: &Url) -> Result<(), DiscoveryError> {
    let asserted = Url::parse(&metadata.issuer).map_err(|err| DiscoveryError::InvalidEndpoint {
        field: "issuer",
        message: err.to_string(),
    })?;

    let expected_normalized = expected.as_str().trim_end_matches('/');
    let asserted_normalized = asserted.as_str().trim_end_matches('/');

    if expected_normalized != asserted_normalized {
        return Err(DiscoveryError::IssuerMismatch {
            expected: expected_normalized.to_string(),
            actual: asserted_normalized.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(issuer: &str, allow_http: bool) -> Arc<AuthConfig> {
        let config: AuthConfig = serde_json::from_value(serde_json::json!({
            "issuer": issuer,
            "user_pool_id": "local_pool",
            "client_id": "client-1234",
            "redirect_uri": "https://app.example.com/auth/callback",
            "allow_http": allow_http,
        }))
        .unwrap();
        Arc::new(config)
    }

    fn test_metadata(issuer: &str) -> ProviderMetadata {
        ProviderMetadata {
            issuer: issuer.to_string(),
            authorization_endpoint: format!("{issuer}/authorize"),
            token_endpoint: format!("{issuer}/token"),
            jwks_uri: format!("{issuer}/.well-known/jwks.json"),
            response_types_supported: vec!["code".to_string()],
            subject_types_supported: vec!["public".to_string()],
            id_token_signing_alg_values_supported: vec!["RS256".to_string()],
            userinfo_endpoint: None,
            scopes_supported: None,
            grant_types_supported: None,
            token_endpoint_auth_methods_supported: None,
            end_session_endpoint: None,
        }
    }

    #[test]
    fn test_well_known_url() {
        let issuer = Url::parse("https://auth.example.com").unwrap();
        assert_eq!(
            well_known_url(&issuer).as_str(),
            "https://auth.example.com/.well-known/openid-configuration"
        );

        let issuer = Url::parse("https://auth.example.com/").unwrap();
        assert_eq!(
            well_known_url(&issuer).as_str(),
            "https://auth.example.com/.well-known/openid-configuration"
        );

        let issuer = Url::parse("https://auth.example.com/tenant/abc").unwrap();
        assert_eq!(
            well_known_url(&issuer).as_str(),
            "https://auth.example.com/tenant/abc/.well-known/openid-configuration"
        );
    }

    #[test]
    fn test_validate_issuer_scheme() {
        let client = DiscoveryClient::new(test_config("https://auth.example.com", false)).unwrap();

        let https_issuer = Url::parse("https://auth.example.com").unwrap();
        assert!(client.validate_issuer_scheme(&https_issuer).is_ok());

        let http_issuer = Url::parse("http://auth.example.com").unwrap();
        assert!(matches!(
            client.validate_issuer_scheme(&http_issuer),
            Err(DiscoveryError::InvalidScheme(_))
        ));

        let client = DiscoveryClient::new(test_config("http://auth.example.com", true)).unwrap();
        assert!(client.validate_issuer_scheme(&http_issuer).is_ok());
    }

    #[test]
    fn test_validate_issuer_accepts_trailing_slash_difference() {
        let expected = Url::parse("https://auth.example.com/").unwrap();
        let metadata = test_metadata("https://auth.example.com");
        assert!(validate_issuer(&metadata, &expected).is_ok());
    }

    #[test]
    fn test_validate_issuer_rejects_mismatch() {
        let expected = Url::parse("https://auth.example.com").unwrap();
        let metadata = test_metadata("https://rogue.example.com");

        let err = validate_issuer(&metadata, &expected).unwrap_err();
        assert!(matches!(err, DiscoveryError::IssuerMismatch { .. }));
    }

    #[test]
    fn test_validate_issuer_rejects_malformed_issuer() {
        let expected = Url::parse("https://auth.example.com").unwrap();
        let metadata = test_metadata("not a url");

        let err = validate_issuer(&metadata, &expected).unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::InvalidEndpoint { field: "issuer", .. }
        ));
    }

    #[test]
    fn test_discovery_error_display() {
        let err = DiscoveryError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");

        let err = DiscoveryError::HttpStatus(404);
        assert_eq!(err.to_string(), "HTTP error: status 404");

        let err = DiscoveryError::IssuerMismatch {
            expected: "https://a.com".to_string(),
            actual: "https://b.com".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Issuer mismatch: expected https://a.com, got https://b.com"
        );

        let err = DiscoveryError::InvalidScheme("http".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid URL scheme: http (only HTTPS is allowed)"
        );
    }

    #[test]
    fn test_discovery_error_converts_to_auth_error() {
        let err: AuthError = DiscoveryError::HttpStatus(503).into();
        assert!(matches!(err, AuthError::Discovery { .. }));
    }
}
