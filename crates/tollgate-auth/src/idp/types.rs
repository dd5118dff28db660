//! Wire types for the user-pool API.
//!
//! Requests and responses follow the Cognito-compatible JSON protocol:
//! PascalCase field names, an operation selector in the `x-amz-target`
//! header, and error bodies of the form `{"__type": "...", "message":
//! "..."}`. Request structs omit `SecretHash` entirely when the client is
//! public — an empty-string proof is rejected as malformed by the
//! provider.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SignUpRequest {
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_attributes: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ConfirmSignUpRequest {
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,
    pub username: String,
    pub confirmation_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ResendConfirmationRequest {
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,
    pub username: String,
}

/// `InitiateAuth` request, generic over the flow's parameter block.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InitiateAuthRequest<P> {
    pub auth_flow: &'static str,
    pub client_id: String,
    pub auth_parameters: P,
}

/// Parameters for the `USER_PASSWORD_AUTH` flow.
#[derive(Debug, Serialize)]
pub(crate) struct PasswordAuthParameters {
    #[serde(rename = "USERNAME")]
    pub username: String,
    #[serde(rename = "PASSWORD")]
    pub password: String,
    #[serde(rename = "SECRET_HASH", skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,
}

/// Parameters for the `REFRESH_TOKEN_AUTH` flow.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshAuthParameters {
    #[serde(rename = "REFRESH_TOKEN")]
    pub refresh_token: String,
    #[serde(rename = "SECRET_HASH", skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GlobalSignOutRequest {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetUserRequest {
    pub access_token: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Name/value attribute pair as the pool API represents user attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SignUpResponse {
    pub user_sub: String,
    #[serde(default)]
    pub user_confirmed: bool,
    #[serde(default)]
    pub code_delivery_details: Option<CodeDeliveryDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ResendConfirmationResponse {
    #[serde(default)]
    pub code_delivery_details: Option<CodeDeliveryDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CodeDeliveryDetails {
    #[serde(default)]
    pub attribute_name: Option<String>,
    #[serde(default)]
    pub delivery_medium: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InitiateAuthResponse {
    #[serde(default)]
    pub authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    pub challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AuthenticationResult {
    pub access_token: String,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetUserResponse {
    pub username: String,
    #[serde(default)]
    pub user_attributes: Vec<Attribute>,
}

/// Responses that carry no payload (`ConfirmSignUp`, `GlobalSignOut`).
#[derive(Debug, Deserialize)]
pub(crate) struct EmptyResponse {}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of a successful sign-up.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    /// Subject identifier assigned to the new user.
    pub user_sub: String,
    /// Whether the account is already confirmed (pools without a
    /// confirmation step).
    pub user_confirmed: bool,
    /// Where the confirmation code was sent, if one was issued.
    pub code_delivery: Option<CodeDelivery>,
}

/// Where a confirmation code was delivered.
#[derive(Debug, Clone)]
pub struct CodeDelivery {
    /// Attribute the code confirms, e.g. `email`.
    pub attribute_name: Option<String>,
    /// Delivery channel, e.g. `EMAIL` or `SMS`.
    pub medium: Option<String>,
    /// Masked destination, e.g. `a***@e***.com`.
    pub destination: Option<String>,
}

impl From<CodeDeliveryDetails> for CodeDelivery {
    fn from(details: CodeDeliveryDetails) -> Self {
        Self {
            attribute_name: details.attribute_name,
            medium: details.delivery_medium,
            destination: details.destination,
        }
    }
}

// =============================================================================
// Error payloads
// =============================================================================

/// Error body the pool API returns with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(rename = "__type", default)]
    pub kind: Option<String>,
    #[serde(alias = "Message", default)]
    pub message: Option<String>,
}

/// Maps a pool API error response onto the crate taxonomy.
///
/// Credential-shaped rejections (wrong password, unconfirmed user, bad
/// code, unknown user) are normal failure outcomes. A pool or client the
/// provider does not know is a deployment problem and maps to
/// `Configuration`. Throttling, 5xx statuses, and bodies we cannot parse
/// are provider faults.
pub(crate) fn classify_api_error(operation: &str, status: u16, body: &[u8]) -> AuthError {
    if status >= 500 {
        return AuthError::identity_provider(format!("{operation} failed with HTTP {status}"));
    }

    let Ok(parsed) = serde_json::from_slice::<ApiErrorBody>(body) else {
        return AuthError::identity_provider(format!(
            "{operation} failed with HTTP {status} and an unparseable error body"
        ));
    };

    // The type may arrive namespaced ("com.example#NotAuthorizedException").
    let kind = parsed
        .kind
        .as_deref()
        .and_then(|k| k.rsplit('#').next())
        .unwrap_or("");
    let message = parsed
        .message
        .unwrap_or_else(|| format!("{operation} was rejected ({kind})"));

    match kind {
        "NotAuthorizedException"
        | "UserNotFoundException"
        | "UserNotConfirmedException"
        | "CodeMismatchException"
        | "ExpiredCodeException"
        | "PasswordResetRequiredException"
        | "UsernameExistsException"
        | "AliasExistsException"
        | "InvalidPasswordException"
        | "InvalidParameterException"
        | "CodeDeliveryFailureException" => AuthError::invalid_credential(message),
        "ResourceNotFoundException" => AuthError::configuration(format!(
            "provider does not recognize the configured pool or client: {message}"
        )),
        "TooManyRequestsException" | "LimitExceededException" | "InternalErrorException" => {
            AuthError::identity_provider(message)
        }
        _ => AuthError::identity_provider(format!(
            "{operation} failed with HTTP {status}: {message}"
        )),
    }
}
