//! Authentication configuration types.
//!
//! The host process owns configuration loading; this module defines the
//! typed surface it deserializes into and the validation that runs at
//! startup. Required values have no fallback defaults on purpose: a config
//! without a client id or issuer must fail [`AuthConfig::validate`] and
//! abort startup instead of limping along with empty strings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::secret_hash;

/// Root configuration for the authentication core.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "https://id.example.com/pool-main"
/// user_pool_id = "pool-main"
/// client_id = "tollgate-web"
/// client_secret = "s3cr3t"
/// redirect_uri = "https://app.example.com/auth/callback"
/// request_timeout = "10s"
///
/// [auth.session]
/// cookie_name = "tollgate_session"
/// login_path = "/login"
/// post_login_path = "/"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// OIDC issuer URL. Discovery fetches
    /// `{issuer}/.well-known/openid-configuration`; the user-pool API
    /// endpoint is the issuer's origin (see [`AuthConfig::endpoint`]).
    pub issuer: Url,

    /// User pool identifier within the provider.
    pub user_pool_id: String,

    /// OAuth client id registered with the provider.
    pub client_id: String,

    /// OAuth client secret for confidential clients.
    ///
    /// When set, every provider call that references a username carries a
    /// secret hash; when unset, none may (see [`crate::secret_hash`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Redirect URI registered for the authorization code flow.
    pub redirect_uri: Url,

    /// Accepted OAuth response types. Only `code` is supported.
    #[serde(default = "default_response_types")]
    pub response_types: Vec<String>,

    /// Scopes requested in the authorization redirect.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Deadline applied to every outbound IdP and issuer call.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Permit plain-HTTP issuer and redirect URLs.
    /// Intended for local development and tests only.
    #[serde(default)]
    pub allow_http: bool,

    /// Browser session settings.
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_response_types() -> Vec<String> {
    vec!["code".to_string()]
}

fn default_scopes() -> Vec<String> {
    vec![
        "openid".to_string(),
        "email".to_string(),
        "profile".to_string(),
    ]
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Browser session settings for the redirect flow.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,

    /// Mark the session cookie `Secure`.
    /// Disable only for plain-HTTP local development.
    pub cookie_secure: bool,

    /// `SameSite` attribute for the session cookie.
    ///
    /// Must stay `Lax` (not `Strict`) for the provider's callback
    /// navigation to carry the cookie.
    pub cookie_same_site: String,

    /// Path the browser is sent to when a flow fails or after logout.
    /// This is the host application's login page, not the flow entry
    /// endpoint.
    pub login_path: String,

    /// Path the browser is sent to after a successful callback.
    pub post_login_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "tollgate_session".to_string(),
            cookie_secure: true,
            cookie_same_site: "Lax".to_string(),
            login_path: "/login".to_string(),
            post_login_path: "/".to_string(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// Hosts must treat a validation failure as fatal at startup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the client id, pool id, or
    /// response types are empty, and `ConfigError::InvalidValue` if:
    /// - the issuer or redirect URI is not HTTPS (unless `allow_http`)
    /// - a response type other than `code` is listed
    /// - the `openid` scope is absent
    /// - the request timeout is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Missing("client_id".to_string()));
        }

        if self.user_pool_id.trim().is_empty() {
            return Err(ConfigError::Missing("user_pool_id".to_string()));
        }

        if !self.allow_http {
            if self.issuer.scheme() != "https" {
                return Err(ConfigError::InvalidValue(format!(
                    "issuer must use https, got '{}'",
                    self.issuer.scheme()
                )));
            }

            if self.redirect_uri.scheme() != "https" {
                return Err(ConfigError::InvalidValue(format!(
                    "redirect_uri must use https, got '{}'",
                    self.redirect_uri.scheme()
                )));
            }
        }

        if self.response_types.is_empty() {
            return Err(ConfigError::Missing("response_types".to_string()));
        }

        for response_type in &self.response_types {
            if response_type != "code" {
                return Err(ConfigError::InvalidValue(format!(
                    "Unsupported response type: '{}'. Only 'code' is supported",
                    response_type
                )));
            }
        }

        if !self.scopes.iter().any(|s| s == "openid") {
            return Err(ConfigError::InvalidValue(
                "scopes must include 'openid'".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "request_timeout must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the user-pool API endpoint: the issuer origin with an empty
    /// path.
    #[must_use]
    pub fn endpoint(&self) -> Url {
        let mut endpoint = self.issuer.clone();
        endpoint.set_path("");
        endpoint.set_query(None);
        endpoint.set_fragment(None);
        endpoint
    }

    /// Returns `true` if a client secret is configured.
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        self.client_secret.is_some()
    }

    /// Computes the secret hash for `username`, or `None` for public
    /// clients. See [`crate::secret_hash::compute`].
    #[must_use]
    pub fn secret_hash(&self, username: &str) -> Option<String> {
        secret_hash::compute(username, &self.client_id, self.client_secret.as_deref())
    }

    /// Returns the space-joined scope string for authorization requests.
    #[must_use]
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }

    /// Returns the space-joined response type string for authorization
    /// requests.
    #[must_use]
    pub fn response_type_param(&self) -> String {
        self.response_types.join(" ")
    }
}

impl From<ConfigError> for crate::error::AuthError {
    fn from(err: ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AuthConfig {
        AuthConfig {
            issuer: Url::parse("https://id.example.com/pool-main").unwrap(),
            user_pool_id: "pool-main".to_string(),
            client_id: "tollgate-web".to_string(),
            client_secret: Some("example-client-secret".to_string()),
            redirect_uri: Url::parse("https://app.example.com/auth/callback").unwrap(),
            response_types: default_response_types(),
            scopes: default_scopes(),
            request_timeout: default_request_timeout(),
            allow_http: false,
            session: SessionConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_empty_client_id_rejected() {
        let mut config = valid_config();
        config.client_id = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("client_id"));
    }

    #[test]
    fn test_empty_pool_id_rejected() {
        let mut config = valid_config();
        config.user_pool_id = String::new();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_http_issuer_rejected_by_default() {
        let mut config = valid_config();
        config.issuer = Url::parse("http://id.example.com/pool-main").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));

        config.allow_http = true;
        // redirect_uri is still https, so only the issuer check is relaxed
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_response_type_rejected() {
        let mut config = valid_config();
        config.response_types = vec!["code".to_string(), "token".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn test_missing_openid_scope_rejected() {
        let mut config = valid_config();
        config.scopes = vec!["email".to_string()];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = valid_config();
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_strips_pool_path() {
        let config = valid_config();
        assert_eq!(config.endpoint().as_str(), "https://id.example.com/");

        let mut config = valid_config();
        config.issuer = Url::parse("http://127.0.0.1:9099/pool-main").unwrap();
        assert_eq!(config.endpoint().as_str(), "http://127.0.0.1:9099/");
    }

    #[test]
    fn test_secret_hash_follows_secret_presence() {
        let config = valid_config();
        assert!(config.is_confidential());
        assert!(config.secret_hash("alice").is_some());

        let mut public = valid_config();
        public.client_secret = None;
        assert!(!public.is_confidential());
        assert!(public.secret_hash("alice").is_none());
    }

    #[test]
    fn test_deserialize_minimal_toml() {
        let config: AuthConfig = serde_json::from_value(serde_json::json!({
            "issuer": "https://id.example.com/pool-main",
            "user_pool_id": "pool-main",
            "client_id": "tollgate-web",
            "redirect_uri": "https://app.example.com/auth/callback"
        }))
        .unwrap();

        assert_eq!(config.response_types, vec!["code"]);
        assert_eq!(config.scopes, vec!["openid", "email", "profile"]);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!config.allow_http);
        assert!(config.client_secret.is_none());
        assert_eq!(config.session.cookie_name, "tollgate_session");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_required_field_fails_deserialization() {
        // No silent fallback for required values: absence is a hard error.
        let result = serde_json::from_value::<AuthConfig>(serde_json::json!({
            "issuer": "https://id.example.com/pool-main",
            "user_pool_id": "pool-main",
            "redirect_uri": "https://app.example.com/auth/callback"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_session_defaults() {
        let session = SessionConfig::default();
        assert_eq!(session.cookie_name, "tollgate_session");
        assert!(session.cookie_secure);
        assert_eq!(session.cookie_same_site, "Lax");
        assert_eq!(session.login_path, "/login");
        assert_eq!(session.post_login_path, "/");
    }

    #[test]
    fn test_scope_and_response_type_params() {
        let config = valid_config();
        assert_eq!(config.scope_param(), "openid email profile");
        assert_eq!(config.response_type_param(), "code");
    }
}
