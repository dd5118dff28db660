//! OpenID Connect provider metadata types.
//!
//! This module defines the subset of the OIDC Discovery document that the
//! redirect login flow consumes, as specified in
//! [OpenID Connect Discovery 1.0](https://openid.net/specs/openid-connect-discovery-1_0.html).

use serde::{Deserialize, Serialize};

/// OpenID Connect provider metadata.
///
/// Contains the provider configuration returned from the
/// `.well-known/openid-configuration` endpoint. Only the fields the
/// authorization-code flow consumes are modeled; unknown fields in the
/// response are ignored.
///
/// # Example
///
/// ```ignore
/// use tollgate_auth::oidc::ProviderMetadata;
///
/// let json = r#"{
///     "issuer": "https://auth.example.com",
///     "authorization_endpoint": "https://auth.example.com/authorize",
///     "token_endpoint": "https://auth.example.com/token",
///     "jwks_uri": "https://auth.example.com/.well-known/jwks.json",
///     "response_types_supported": ["code"],
///     "subject_types_supported": ["public"],
///     "id_token_signing_alg_values_supported": ["RS256"]
/// }"#;
///
/// let metadata: ProviderMetadata = serde_json::from_str(json)?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    // ----- Required Fields -----
    /// URL that the provider asserts as its Issuer Identifier.
    pub issuer: String,

    /// URL of the provider's Authorization Endpoint.
    pub authorization_endpoint: String,

    /// URL of the provider's Token Endpoint.
    pub token_endpoint: String,

    /// URL of the provider's JSON Web Key Set document.
    pub jwks_uri: String,

    /// OAuth 2.0 `response_type` values this provider supports.
    pub response_types_supported: Vec<String>,

    /// Subject Identifier types this provider supports
    /// (`pairwise` and/or `public`).
    pub subject_types_supported: Vec<String>,

    /// JWS signing algorithms supported for the ID Token.
    pub id_token_signing_alg_values_supported: Vec<String>,

    // ----- Recommended Fields -----
    /// URL of the provider's UserInfo Endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,

    /// OAuth 2.0 scope values this provider supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes_supported: Option<Vec<String>>,

    // ----- Optional Fields -----
    /// OAuth 2.0 grant type values this provider supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_types_supported: Option<Vec<String>>,

    /// Client authentication methods supported by the token endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_methods_supported: Option<Vec<String>>,

    /// URL at the provider to which a relying party can redirect to log
    /// the end-user out at the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<String>,
}

impl ProviderMetadata {
    /// Returns `true` if this provider supports the specified response type.
    #[must_use]
    pub fn supports_response_type(&self, response_type: &str) -> bool {
        self.response_types_supported
            .iter()
            .any(|rt| rt == response_type)
    }

    /// Returns `true` if this provider supports the specified scope.
    #[must_use]
    pub fn supports_scope(&self, scope: &str) -> bool {
        self.scopes_supported
            .as_ref()
            .is_some_and(|scopes| scopes.iter().any(|s| s == scope))
    }

    /// Returns `true` if this provider supports the `authorization_code`
    /// grant type.
    ///
    /// If `grant_types_supported` is absent, the OIDC Discovery default is
    /// that `authorization_code` and `implicit` are supported.
    #[must_use]
    pub fn supports_authorization_code(&self) -> bool {
        match &self.grant_types_supported {
            Some(grants) => grants.iter().any(|g| g == "authorization_code"),
            None => true,
        }
    }

    /// Returns `true` if this provider advertises a UserInfo endpoint.
    #[must_use]
    pub fn has_userinfo_endpoint(&self) -> bool {
        self.userinfo_endpoint.is_some()
    }
}
