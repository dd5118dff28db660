//! Relying-party client and process-wide OIDC provider state.
//!
//! [`RelyingParty`] performs the outbound legs of the authorization-code
//! flow: building the authorization redirect URL, exchanging the returned
//! code at the token endpoint, and fetching the user's claims from the
//! userinfo endpoint. [`OidcProvider`] wraps it in a lazily-discovered
//! process-wide singleton so the well-known document is fetched at most
//! once per process lifetime.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tokio::sync::OnceCell;
use url::Url;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::oidc::discovery::{DiscoveryClient, DiscoveryError};
use crate::oidc::metadata::ProviderMetadata;
use crate::types::{Identity, TokenSet};

// =============================================================================
// Wire Types
// =============================================================================

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: u64,
}

/// OAuth 2.0 token endpoint error body (RFC 6749 Section 5.2).
#[derive(Debug, Deserialize)]
struct TokenEndpointError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Claims returned by the userinfo endpoint.
///
/// Boolean claims are accepted as JSON booleans or as the strings
/// `"true"`/`"false"`; Cognito's userinfo endpoint serializes them as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoClaims {
    /// Subject identifier.
    pub sub: String,

    /// Pool-local username, when the provider exposes one.
    #[serde(default)]
    pub username: Option<String>,

    /// Preferred display username.
    #[serde(default)]
    pub preferred_username: Option<String>,

    /// Email address.
    #[serde(default)]
    pub email: Option<String>,

    /// Whether the email address has been verified.
    #[serde(default, deserialize_with = "bool_or_string")]
    pub email_verified: Option<bool>,

    /// Full display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Given name.
    #[serde(default)]
    pub given_name: Option<String>,

    /// Family name.
    #[serde(default)]
    pub family_name: Option<String>,

    /// Phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
}

fn bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    Ok(Option::<BoolOrString>::deserialize(deserializer)?.map(|value| match value {
        BoolOrString::Bool(flag) => flag,
        BoolOrString::String(text) => text == "true",
    }))
}

impl From<UserInfoClaims> for Identity {
    fn from(claims: UserInfoClaims) -> Self {
        let username = claims
            .username
            .or_else(|| claims.preferred_username.clone())
            .or_else(|| claims.email.clone())
            .unwrap_or_else(|| claims.sub.clone());

        Self {
            sub: claims.sub,
            username,
            email: claims.email,
            email_verified: claims.email_verified,
            name: claims.name,
            given_name: claims.given_name,
            family_name: claims.family_name,
            preferred_username: claims.preferred_username,
            phone_number: claims.phone_number,
        }
    }
}

/// Claims read from an ID token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    /// Subject identifier.
    #[serde(default)]
    pub sub: Option<String>,

    /// Replay-protection nonce echoed back by the provider.
    #[serde(default)]
    pub nonce: Option<String>,
}

/// Reads the claims from an ID token payload.
///
/// The payload is read without verifying the signature: the token arrives
/// over the direct TLS exchange with the token endpoint, which is what
/// authenticates it here.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredential`] when the token is not a
/// three-segment JWT or the payload is not valid base64url JSON.
pub fn id_token_claims(id_token: &str) -> Result<IdTokenClaims, AuthError> {
    let segments: Vec<&str> = id_token.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::invalid_credential("malformed ID token"));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|_| AuthError::invalid_credential("malformed ID token payload"))?;

    serde_json::from_slice(&payload)
        .map_err(|_| AuthError::invalid_credential("malformed ID token payload"))
}

// =============================================================================
// Relying Party
// =============================================================================

/// Outbound OIDC client built from discovered provider metadata.
#[derive(Debug)]
pub struct RelyingParty {
    http_client: reqwest::Client,
    config: Arc<AuthConfig>,
    metadata: ProviderMetadata,
    authorization_endpoint: Url,
    token_endpoint: Url,
    userinfo_endpoint: Option<Url>,
}

impl RelyingParty {
    /// Builds a relying-party client from discovered metadata.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Discovery`] when an endpoint URL in the metadata
    /// cannot be parsed, or [`AuthError::Configuration`] when the HTTP client
    /// cannot be constructed.
    pub fn new(metadata: ProviderMetadata, config: Arc<AuthConfig>) -> Result<Self, AuthError> {
        let authorization_endpoint =
            parse_endpoint("authorization_endpoint", &metadata.authorization_endpoint)?;
        let token_endpoint = parse_endpoint("token_endpoint", &metadata.token_endpoint)?;
        let userinfo_endpoint = metadata
            .userinfo_endpoint
            .as_deref()
            .map(|raw| parse_endpoint("userinfo_endpoint", raw))
            .transpose()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| {
                AuthError::configuration(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            http_client,
            config,
            metadata,
            authorization_endpoint,
            token_endpoint,
            userinfo_endpoint,
        })
    }

    /// Returns the discovered provider metadata.
    #[must_use]
    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    /// Builds the authorization redirect URL for a login attempt.
    ///
    /// The `state` and `nonce` values must be freshly generated for the
    /// attempt and persisted in the caller's session before redirecting.
    #[must_use]
    pub fn authorization_url(&self, state: &str, nonce: &str) -> Url {
        let mut url = self.authorization_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("response_type", &self.config.response_type_param())
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("scope", &self.config.scope_param())
            .append_pair("state", state)
            .append_pair("nonce", nonce);
        url
    }

    /// Exchanges an authorization code for tokens at the token endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredential`] when the provider rejects the
    /// code and [`AuthError::IdentityProvider`] for transport failures or
    /// unexpected responses. Freeform provider error descriptions are logged
    /// at debug level, not carried in the returned error.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, AuthError> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
        ];
        if let Some(secret) = self.config.client_secret.as_deref() {
            params.push(("client_secret", secret));
        }

        let response = self
            .http_client
            .post(self.token_endpoint.clone())
            .form(&params)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "token endpoint request failed");
                AuthError::identity_provider(format!("token endpoint request failed: {err}"))
            })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|err| {
            AuthError::identity_provider(format!("failed to read token endpoint response: {err}"))
        })?;

        if !(200..300).contains(&status) {
            return Err(token_endpoint_error(status, &body));
        }

        let tokens: TokenEndpointResponse = serde_json::from_slice(&body).map_err(|err| {
            AuthError::identity_provider(format!("unexpected token endpoint payload: {err}"))
        })?;

        Ok(TokenSet::new(
            tokens.access_token,
            tokens.id_token,
            tokens.refresh_token,
            tokens.expires_in,
        ))
    }

    /// Fetches the user's claims from the userinfo endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredential`] when the endpoint rejects the
    /// access token and [`AuthError::IdentityProvider`] for transport
    /// failures, unexpected responses, or a provider without a userinfo
    /// endpoint.
    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<Identity, AuthError> {
        let Some(endpoint) = self.userinfo_endpoint.clone() else {
            return Err(AuthError::identity_provider(
                "issuer does not advertise a userinfo endpoint",
            ));
        };

        let response = self
            .http_client
            .get(endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "userinfo request failed");
                AuthError::identity_provider(format!("userinfo request failed: {err}"))
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(AuthError::invalid_credential(
                "userinfo endpoint rejected the access token",
            ));
        }
        if !(200..300).contains(&status) {
            return Err(AuthError::identity_provider(format!(
                "userinfo endpoint returned status {status}"
            )));
        }

        let claims: UserInfoClaims = response.json().await.map_err(|err| {
            AuthError::identity_provider(format!("unexpected userinfo payload: {err}"))
        })?;

        Ok(Identity::from(claims))
    }
}

fn parse_endpoint(field: &'static str, raw: &str) -> Result<Url, DiscoveryError> {
    Url::parse(raw).map_err(|err| DiscoveryError::InvalidEndpoint {
        field,
        message: err.to_string(),
    })
}

fn token_endpoint_error(status: u16, body: &[u8]) -> AuthError {
    if status >= 500 {
        return AuthError::identity_provider(format!("token endpoint returned status {status}"));
    }

    match serde_json::from_slice::<TokenEndpointError>(body) {
        Ok(oauth_error) => {
            tracing::debug!(
                error = %oauth_error.error,
                description = oauth_error.error_description.as_deref().unwrap_or(""),
                "token endpoint rejected the code exchange"
            );
            AuthError::invalid_credential(format!("code exchange failed: {}", oauth_error.error))
        }
        Err(_) => AuthError::identity_provider(format!("token endpoint returned status {status}")),
    }
}

// =============================================================================
// Provider Singleton
// =============================================================================

/// Process-wide OIDC client with lazy, memoized discovery.
///
/// The underlying [`RelyingParty`] is built on first use: the initial caller
/// runs discovery while concurrent callers await the same attempt, so the
/// well-known endpoint sees at most one in-flight request. A successful
/// build is terminal and reused for the life of the process. A failed
/// attempt leaves the slot empty; the error propagates to the caller that
/// ran it, remaining waiters take over one at a time, and later calls start
/// a fresh attempt.
#[derive(Debug)]
pub struct OidcProvider {
    discovery: DiscoveryClient,
    config: Arc<AuthConfig>,
    client: OnceCell<Arc<RelyingParty>>,
}

impl OidcProvider {
    /// Creates a provider for the configured issuer without contacting it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] when the configuration is
    /// invalid. Network reachability is not checked until [`Self::get`].
    pub fn new(config: Arc<AuthConfig>) -> Result<Self, AuthError> {
        let discovery = DiscoveryClient::new(config.clone())?;

        Ok(Self {
            discovery,
            config,
            client: OnceCell::new(),
        })
    }

    /// Returns the ready relying-party client, running discovery on first use.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Discovery`] when the discovery fetch or the
    /// discovered metadata is unusable. The failure is not sticky.
    pub async fn get(&self) -> Result<Arc<RelyingParty>, AuthError> {
        self.client
            .get_or_try_init(|| async {
                let metadata = self.discovery.discover().await?;
                let client = RelyingParty::new(metadata, self.config.clone())?;
                Ok(Arc::new(client))
            })
            .await
            .cloned()
    }

    /// Readiness fast path: `true` once discovery has succeeded.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.client.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Arc<AuthConfig> {
        let config: AuthConfig = serde_json::from_value(serde_json::json!({
            "issuer": "https://auth.example.com",
            "user_pool_id": "local_pool",
            "client_id": "client-1234",
            "redirect_uri": "https://app.example.com/auth/callback",
        }))
        .unwrap();
        Arc::new(config)
    }

    fn test_metadata() -> ProviderMetadata {
        ProviderMetadata {
            issuer: "https://auth.example.com".to_string(),
            authorization_endpoint: "https://auth.example.com/authorize".to_string(),
            token_endpoint: "https://auth.example.com/token".to_string(),
            jwks_uri: "https://auth.example.com/.well-known/jwks.json".to_string(),
            response_types_supported: vec!["code".to_string()],
            subject_types_supported: vec!["public".to_string()],
            id_token_signing_alg_values_supported: vec!["RS256".to_string()],
            userinfo_endpoint: Some("https://auth.example.com/userinfo".to_string()),
            scopes_supported: None,
            grant_types_supported: None,
            token_endpoint_auth_methods_supported: None,
            end_session_endpoint: None,
        }
    }

    fn fake_id_token(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        let signature = URL_SAFE_NO_PAD.encode("signature");
        format!("{header}.{body}.{signature}")
    }

    #[test]
    fn test_authorization_url_carries_flow_parameters() {
        let party = RelyingParty::new(test_metadata(), test_config()).unwrap();
        let url = party.authorization_url("state-abc", "nonce-xyz");

        assert_eq!(url.host_str(), Some("auth.example.com"));
        assert_eq!(url.path(), "/authorize");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let lookup = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(lookup("response_type"), Some("code"));
        assert_eq!(lookup("client_id"), Some("client-1234"));
        assert_eq!(
            lookup("redirect_uri"),
            Some("https://app.example.com/auth/callback")
        );
        assert_eq!(lookup("scope"), Some("openid email profile"));
        assert_eq!(lookup("state"), Some("state-abc"));
        assert_eq!(lookup("nonce"), Some("nonce-xyz"));
    }

    #[test]
    fn test_relying_party_rejects_malformed_endpoint() {
        let mut metadata = test_metadata();
        metadata.token_endpoint = "not a url".to_string();

        let err = RelyingParty::new(metadata, test_config()).unwrap_err();
        assert!(matches!(err, AuthError::Discovery { .. }));
    }

    #[test]
    fn test_id_token_claims_reads_nonce() {
        let token = fake_id_token(serde_json::json!({
            "sub": "user-1",
            "nonce": "nonce-xyz",
            "aud": "client-1234",
        }));

        let claims = id_token_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.nonce.as_deref(), Some("nonce-xyz"));
    }

    #[test]
    fn test_id_token_claims_without_nonce() {
        let token = fake_id_token(serde_json::json!({ "sub": "user-1" }));

        let claims = id_token_claims(&token).unwrap();
        assert!(claims.nonce.is_none());
    }

    #[test]
    fn test_id_token_claims_rejects_malformed_token() {
        let err = id_token_claims("only-one-segment").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredential { .. }));

        let err = id_token_claims("two.segments").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredential { .. }));

        let err = id_token_claims("a.!!!not-base64!!!.c").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredential { .. }));
    }

    #[test]
    fn test_userinfo_claims_into_identity_username_fallback() {
        let claims: UserInfoClaims = serde_json::from_value(serde_json::json!({
            "sub": "user-1",
            "email": "alice@example.com",
        }))
        .unwrap();
        let identity = Identity::from(claims);
        assert_eq!(identity.username, "alice@example.com");

        let claims: UserInfoClaims = serde_json::from_value(serde_json::json!({
            "sub": "user-1",
            "username": "alice",
            "email": "alice@example.com",
        }))
        .unwrap();
        let identity = Identity::from(claims);
        assert_eq!(identity.username, "alice");

        let claims: UserInfoClaims =
            serde_json::from_value(serde_json::json!({ "sub": "user-1" })).unwrap();
        let identity = Identity::from(claims);
        assert_eq!(identity.username, "user-1");
    }

    #[test]
    fn test_userinfo_claims_accepts_string_booleans() {
        let claims: UserInfoClaims = serde_json::from_value(serde_json::json!({
            "sub": "user-1",
            "email_verified": "true",
        }))
        .unwrap();
        assert_eq!(claims.email_verified, Some(true));

        let claims: UserInfoClaims = serde_json::from_value(serde_json::json!({
            "sub": "user-1",
            "email_verified": false,
        }))
        .unwrap();
        assert_eq!(claims.email_verified, Some(false));
    }

    #[tokio::test]
    async fn test_provider_starts_unready() {
        let provider = OidcProvider::new(test_config()).unwrap();
        assert!(!provider.ready());
    }
}
