//! Authentication error types.
//!
//! This module defines the single error taxonomy used across the crate.
//! Every fallible operation returns [`AuthError`] through the
//! [`AuthResult`](crate::AuthResult) alias; nothing in this crate panics
//! across its public boundary.

use std::fmt;

/// Errors that can occur during authentication and session operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A required setting is missing or invalid.
    ///
    /// Configuration failures are the only variant a host process should
    /// treat as fatal: they indicate the core cannot operate at all and
    /// must fail closed at startup rather than limp along with defaults.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The identity provider failed: network error, timeout, unexpected
    /// 5xx, or an unparseable response. Surfaced as a server error and
    /// never retried automatically.
    #[error("Identity provider error: {message}")]
    IdentityProvider {
        /// Description of the provider failure.
        message: String,
    },

    /// The presented credential was rejected: bad password, bad
    /// confirmation code, unconfirmed or unknown user, or an
    /// expired/revoked/malformed token.
    ///
    /// Messages never contain passwords, secrets, or token material.
    #[error("Invalid credentials: {message}")]
    InvalidCredential {
        /// Safe description of the rejection.
        message: String,
    },

    /// No credential was presented where one is required.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of what was missing.
        message: String,
    },

    /// A credential was presented but failed verification; used by the
    /// strict bearer middleware to reject the request.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Safe description of the verification failure.
        message: String,
    },

    /// OIDC issuer discovery failed: issuer unreachable, non-success
    /// status, or a malformed discovery document.
    ///
    /// Discovery failures block the redirect-flow singleton only; the
    /// password flow never depends on discovery and keeps working through
    /// an issuer outage.
    #[error("Discovery error: {message}")]
    Discovery {
        /// Description of the discovery failure.
        message: String,
    },

    /// The callback's `state` or `nonce` did not match the values stored
    /// in the session. Treated as a tampering signal: the flow hard-fails
    /// with no retry and no partial session write.
    #[error("State or nonce mismatch")]
    StateMismatch,

    /// The session store reported a failure.
    #[error("Session error: {message}")]
    Session {
        /// Description of the store failure.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `IdentityProvider` error.
    #[must_use]
    pub fn identity_provider(message: impl Into<String>) -> Self {
        Self::IdentityProvider {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidCredential` error.
    #[must_use]
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::InvalidCredential {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new `Discovery` error.
    #[must_use]
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
        }
    }

    /// Creates a new `Session` error.
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Returns `true` if the failure is attributable to the caller's
    /// credential (4xx category).
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredential { .. }
                | Self::Unauthorized { .. }
                | Self::Forbidden { .. }
                | Self::StateMismatch
        )
    }

    /// Returns `true` if the failure is on the server side (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::IdentityProvider { .. }
                | Self::Discovery { .. }
                | Self::Session { .. }
        )
    }

    /// Returns `true` if the error may be resolved by retrying later
    /// (provider or issuer availability).
    ///
    /// Nothing in this crate retries automatically; the predicate exists
    /// for callers that implement their own backoff.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::IdentityProvider { .. } | Self::Discovery { .. })
    }

    /// Returns the stable machine-readable tag for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::IdentityProvider { .. } => ErrorKind::IdentityProvider,
            Self::InvalidCredential { .. } => ErrorKind::InvalidCredential,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Discovery { .. } => ErrorKind::Discovery,
            Self::StateMismatch => ErrorKind::StateMismatch,
            Self::Session { .. } => ErrorKind::Session,
        }
    }
}

/// Stable tags identifying each [`AuthError`] variant.
///
/// Used as the `error` field of JSON failure bodies and as a structured
/// field in log events, so the strings are part of the crate's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid required setting.
    Configuration,
    /// Provider network/availability failure.
    IdentityProvider,
    /// Rejected credential.
    InvalidCredential,
    /// No credential presented.
    Unauthorized,
    /// Credential presented but verification failed.
    Forbidden,
    /// Issuer discovery failure.
    Discovery,
    /// Callback state/nonce mismatch.
    StateMismatch,
    /// Session store failure.
    Session,
}

impl ErrorKind {
    /// Returns the wire representation of this tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration_error",
            Self::IdentityProvider => "identity_provider_error",
            Self::InvalidCredential => "invalid_credential",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::Discovery => "discovery_error",
            Self::StateMismatch => "state_mismatch",
            Self::Session => "session_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::configuration("client_id cannot be empty");
        assert_eq!(
            err.to_string(),
            "Configuration error: client_id cannot be empty"
        );

        let err = AuthError::invalid_credential("authentication failed");
        assert_eq!(err.to_string(), "Invalid credentials: authentication failed");

        let err = AuthError::StateMismatch;
        assert_eq!(err.to_string(), "State or nonce mismatch");

        let err = AuthError::identity_provider("connection refused");
        assert_eq!(
            err.to_string(),
            "Identity provider error: connection refused"
        );
    }

    #[test]
    fn test_error_predicates() {
        let err = AuthError::invalid_credential("bad password");
        assert!(err.is_credential_error());
        assert!(!err.is_server_error());
        assert!(!err.is_transient());

        let err = AuthError::identity_provider("timeout");
        assert!(err.is_server_error());
        assert!(err.is_transient());
        assert!(!err.is_credential_error());

        let err = AuthError::StateMismatch;
        assert!(err.is_credential_error());
        assert!(!err.is_transient());

        let err = AuthError::discovery("issuer unreachable");
        assert!(err.is_server_error());
        assert!(err.is_transient());

        let err = AuthError::configuration("missing pool id");
        assert!(err.is_server_error());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            AuthError::configuration("x").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            AuthError::invalid_credential("x").kind(),
            ErrorKind::InvalidCredential
        );
        assert_eq!(AuthError::StateMismatch.kind(), ErrorKind::StateMismatch);
        assert_eq!(AuthError::session("x").kind(), ErrorKind::Session);
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Configuration.to_string(), "configuration_error");
        assert_eq!(
            ErrorKind::IdentityProvider.to_string(),
            "identity_provider_error"
        );
        assert_eq!(ErrorKind::InvalidCredential.to_string(), "invalid_credential");
        assert_eq!(ErrorKind::StateMismatch.to_string(), "state_mismatch");
        assert_eq!(ErrorKind::Discovery.to_string(), "discovery_error");
    }
}
