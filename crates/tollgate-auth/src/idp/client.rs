//! Request/response adapter for the user-pool API.
//!
//! Every operation is a stateless round-trip: build the payload, POST it
//! to the pool endpoint with the operation selector header, map the
//! response. Failures always come back as [`AuthError`] values — provider
//! rejections are normal outcomes here, never panics.
//!
//! # Secret hash rule
//!
//! For confidential clients every operation that references a username
//! carries the computed secret hash; for public clients the field is
//! omitted entirely. The refresh grant references no username and hashes
//! the client id as subject instead. Token-based operations (sign-out,
//! get-user) carry no hash.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::idp::types::{
    Attribute, AuthenticationResult, CodeDelivery, ConfirmSignUpRequest, EmptyResponse,
    GetUserRequest, GetUserResponse, GlobalSignOutRequest, InitiateAuthRequest,
    InitiateAuthResponse, PasswordAuthParameters, RefreshAuthParameters,
    ResendConfirmationRequest, ResendConfirmationResponse, SignUpOutcome, SignUpRequest,
    SignUpResponse, classify_api_error,
};
use crate::types::{Identity, TokenSet};

/// Operation selector header of the pool wire protocol.
const TARGET_HEADER: &str = "x-amz-target";

/// Service prefix for the operation selector.
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

/// Content type the pool API expects.
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Stateless client for the user-pool API.
///
/// Cheap to clone-by-`Arc` and safe to share across request handlers; the
/// underlying `reqwest::Client` pools connections internally.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use tollgate_auth::{AuthConfig, UserPoolClient};
///
/// let client = UserPoolClient::new(Arc::new(config))?;
/// let tokens = client.sign_in("alice", "correct horse").await?;
/// ```
#[derive(Debug, Clone)]
pub struct UserPoolClient {
    http_client: reqwest::Client,
    endpoint: Url,
    config: Arc<AuthConfig>,
}

impl UserPoolClient {
    /// Creates a client for the configured pool.
    ///
    /// Validates the configuration first so that a misconfigured process
    /// aborts here, before any network call is attempted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if validation fails or the HTTP
    /// client cannot be built.
    pub fn new(config: Arc<AuthConfig>) -> Result<Self, AuthError> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint(),
            config,
        })
    }

    /// Returns the configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Registers a new user.
    ///
    /// The confirmation code, when the pool requires one, is delivered to
    /// the given email address.
    pub async fn sign_up(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let request = SignUpRequest {
            client_id: self.config.client_id.clone(),
            secret_hash: self.config.secret_hash(username),
            username: username.to_string(),
            password: password.to_string(),
            user_attributes: vec![Attribute {
                name: "email".to_string(),
                value: email.to_string(),
            }],
        };

        let response: SignUpResponse = self.call("SignUp", &request).await?;
        tracing::debug!(username = %username, confirmed = response.user_confirmed, "user signed up");

        Ok(SignUpOutcome {
            user_sub: response.user_sub,
            user_confirmed: response.user_confirmed,
            code_delivery: response.code_delivery_details.map(CodeDelivery::from),
        })
    }

    /// Confirms a sign-up with the code delivered to the user.
    pub async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<(), AuthError> {
        let request = ConfirmSignUpRequest {
            client_id: self.config.client_id.clone(),
            secret_hash: self.config.secret_hash(username),
            username: username.to_string(),
            confirmation_code: code.to_string(),
        };

        let _: EmptyResponse = self.call("ConfirmSignUp", &request).await?;
        tracing::debug!(username = %username, "sign-up confirmed");
        Ok(())
    }

    /// Requests a new confirmation code for an unconfirmed user.
    pub async fn resend_confirmation(
        &self,
        username: &str,
    ) -> Result<Option<CodeDelivery>, AuthError> {
        let request = ResendConfirmationRequest {
            client_id: self.config.client_id.clone(),
            secret_hash: self.config.secret_hash(username),
            username: username.to_string(),
        };

        let response: ResendConfirmationResponse =
            self.call("ResendConfirmationCode", &request).await?;
        Ok(response.code_delivery_details.map(CodeDelivery::from))
    }

    /// Authenticates with username and password.
    ///
    /// On success returns the full token set. Every credential-shaped
    /// rejection collapses into one generic failure so provider internals
    /// (which distinguish wrong passwords from unknown users) never reach
    /// the caller's clients. The real reason is logged at debug level.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<TokenSet, AuthError> {
        let request = InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id: self.config.client_id.clone(),
            auth_parameters: PasswordAuthParameters {
                username: username.to_string(),
                password: password.to_string(),
                secret_hash: self.config.secret_hash(username),
            },
        };

        let response: InitiateAuthResponse = match self.call("InitiateAuth", &request).await {
            Ok(response) => response,
            Err(err) if err.is_credential_error() => {
                tracing::debug!(username = %username, error = %err, "password sign-in rejected");
                return Err(AuthError::invalid_credential("authentication failed"));
            }
            Err(err) => return Err(err),
        };

        match response.authentication_result {
            Some(result) => Ok(token_set_from(result)),
            None => {
                // The pool wants a challenge round (MFA or similar); this
                // core does not negotiate challenges.
                tracing::debug!(
                    username = %username,
                    challenge = response.challenge_name.as_deref().unwrap_or("unknown"),
                    "sign-in requires an unsupported challenge"
                );
                Err(AuthError::invalid_credential("authentication failed"))
            }
        }
    }

    /// Signs the user out of every device by invalidating their refresh
    /// tokens at the provider.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let request = GlobalSignOutRequest {
            access_token: access_token.to_string(),
        };

        let _: EmptyResponse = self.call("GlobalSignOut", &request).await?;
        Ok(())
    }

    /// Exchanges a refresh token for a fresh access/id token pair.
    ///
    /// The provider does not rotate refresh tokens, so the returned set
    /// carries `refresh_token: None`; callers keep the token they hold.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthError> {
        let request = InitiateAuthRequest {
            auth_flow: "REFRESH_TOKEN_AUTH",
            client_id: self.config.client_id.clone(),
            auth_parameters: RefreshAuthParameters {
                refresh_token: refresh_token.to_string(),
                // The refresh grant carries no username; the hash subject
                // is the client id.
                secret_hash: self.config.secret_hash(&self.config.client_id),
            },
        };

        let response: InitiateAuthResponse = self.call("InitiateAuth", &request).await?;
        match response.authentication_result {
            Some(result) => Ok(token_set_from(result)),
            None => Err(AuthError::identity_provider(
                "refresh response carried no authentication result",
            )),
        }
    }

    /// Fetches the profile of the user the access token belongs to.
    pub async fn get_user(&self, access_token: &str) -> Result<Identity, AuthError> {
        let request = GetUserRequest {
            access_token: access_token.to_string(),
        };

        let response: GetUserResponse = self.call("GetUser", &request).await?;
        let identity = Identity::from_attributes(
            response.username,
            response
                .user_attributes
                .iter()
                .map(|attribute| (attribute.name.as_str(), attribute.value.as_str())),
        );

        if identity.sub.is_empty() {
            return Err(AuthError::identity_provider(
                "user profile response carried no subject attribute",
            ));
        }

        Ok(identity)
    }

    /// Verifies an access token by using the get-user operation as a
    /// liveness probe.
    ///
    /// Every credential-shaped failure (expired, revoked, malformed)
    /// collapses into one uniform verification failure. Transport and 5xx
    /// failures stay distinguishable as `IdentityProvider` errors so
    /// callers can tell "bad token" from "provider down".
    pub async fn verify_token(&self, access_token: &str) -> Result<Identity, AuthError> {
        match self.get_user(access_token).await {
            Ok(identity) => Ok(identity),
            Err(err) if err.is_credential_error() => {
                tracing::debug!(error = %err, "bearer token failed verification");
                Err(AuthError::invalid_credential("token verification failed"))
            }
            Err(err) => Err(err),
        }
    }

    /// Performs one wire call against the pool endpoint.
    async fn call<Req, Resp>(&self, operation: &str, request: &Req) -> Result<Resp, AuthError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_vec(request).map_err(|e| {
            AuthError::identity_provider(format!("failed to encode {operation} request: {e}"))
        })?;

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(TARGET_HEADER, format!("{TARGET_PREFIX}.{operation}"))
            .header(CONTENT_TYPE, AMZ_JSON)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                AuthError::identity_provider(format!("{operation} request failed: {e}"))
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            AuthError::identity_provider(format!("{operation} response could not be read: {e}"))
        })?;

        if !status.is_success() {
            return Err(classify_api_error(operation, status.as_u16(), &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            AuthError::identity_provider(format!("{operation} returned an unparseable body: {e}"))
        })
    }
}

fn token_set_from(result: AuthenticationResult) -> TokenSet {
    TokenSet::new(
        result.access_token,
        result.id_token,
        result.refresh_token,
        result.expires_in,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;

    fn test_config(secret: Option<&str>) -> Arc<AuthConfig> {
        Arc::new(AuthConfig {
            issuer: Url::parse("https://id.example.com/pool-main").unwrap(),
            user_pool_id: "pool-main".to_string(),
            client_id: "example-client-id".to_string(),
            client_secret: secret.map(str::to_string),
            redirect_uri: Url::parse("https://app.example.com/auth/callback").unwrap(),
            response_types: vec!["code".to_string()],
            scopes: vec!["openid".to_string()],
            request_timeout: std::time::Duration::from_secs(5),
            allow_http: false,
            session: SessionConfig::default(),
        })
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = (*test_config(None)).clone();
        config.client_id = String::new();
        let err = UserPoolClient::new(Arc::new(config)).unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }

    #[test]
    fn test_new_uses_issuer_origin_as_endpoint() {
        let client = UserPoolClient::new(test_config(Some("secret"))).unwrap();
        assert_eq!(client.endpoint.as_str(), "https://id.example.com/");
    }

    #[test]
    fn test_config_accessor_exposes_secret_presence() {
        let confidential = UserPoolClient::new(test_config(Some("secret"))).unwrap();
        assert!(confidential.config().is_confidential());

        let public = UserPoolClient::new(test_config(None)).unwrap();
        assert!(!public.config().is_confidential());
    }
}
