//! Core identity and token types shared across the crate.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A verified identity produced by the core.
///
/// Built from the user-pool attribute array (bearer flow) or from OIDC
/// userinfo claims (redirect flow). Only the enumerated attributes below
/// are carried; unrecognized keys are dropped at the mapping boundary
/// instead of being passed through as an open-ended map.
///
/// An `Identity` lives for one request (bearer flow) or one session
/// (redirect flow); this core produces it but never stores it elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable subject identifier assigned by the provider.
    pub sub: String,

    /// Username within the user pool.
    pub username: String,

    /// Email address, when released by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Whether the provider has verified the email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    /// Full display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    /// Preferred username, when distinct from the pool username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    /// Phone number in E.164 form, when released.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl Identity {
    /// Creates an identity carrying only the subject and username.
    #[must_use]
    pub fn new(sub: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            username: username.into(),
            email: None,
            email_verified: None,
            name: None,
            given_name: None,
            family_name: None,
            preferred_username: None,
            phone_number: None,
        }
    }

    /// Builds an identity from a user-pool attribute list.
    ///
    /// Recognized attribute names map onto the typed fields; everything
    /// else is dropped. The subject is taken from the `sub` attribute and
    /// may be empty if the provider omitted it — callers that require a
    /// subject must check.
    #[must_use]
    pub fn from_attributes<'a>(
        username: impl Into<String>,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut identity = Self::new(String::new(), username);

        for (name, value) in attributes {
            match name {
                "sub" => identity.sub = value.to_string(),
                "email" => identity.email = Some(value.to_string()),
                "email_verified" => identity.email_verified = Some(value == "true"),
                "name" => identity.name = Some(value.to_string()),
                "given_name" => identity.given_name = Some(value.to_string()),
                "family_name" => identity.family_name = Some(value.to_string()),
                "preferred_username" => identity.preferred_username = Some(value.to_string()),
                "phone_number" => identity.phone_number = Some(value.to_string()),
                // Unrecognized attributes are dropped, not forwarded.
                _ => {}
            }
        }

        identity
    }

    /// Returns the best human-readable name available.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.preferred_username.as_deref())
            .unwrap_or(&self.username)
    }
}

/// Tokens returned by a successful authentication.
///
/// Owned by the session (redirect flow) or returned directly to the caller
/// (password flow). The refresh token, when present, never leaves the
/// session through this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    /// Access token presented on subsequent API calls.
    pub access_token: String,

    /// ID token carrying identity claims.
    pub id_token: String,

    /// Refresh token, when the provider issued one. Refresh responses
    /// carry `None`; callers keep the token they already hold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Provider-reported token lifetime in seconds.
    pub expires_in: u64,

    /// Absolute expiry computed when the tokens were received.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl TokenSet {
    /// Creates a token set, computing the absolute expiry from
    /// `expires_in` at the moment of receipt. Lifetimes beyond the
    /// representable calendar clamp to its far end.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        id_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: u64,
    ) -> Self {
        // `expires_in` comes off the wire; clamp to the representable range.
        let lifetime = i64::try_from(expires_in).unwrap_or(i64::MAX);
        let expires_at = OffsetDateTime::now_utc()
            .checked_add(time::Duration::seconds(lifetime))
            .unwrap_or(time::PrimitiveDateTime::MAX.assume_utc());

        Self {
            access_token: access_token.into(),
            id_token: id_token.into(),
            refresh_token,
            expires_in,
            expires_at,
        }
    }

    /// Returns `true` if the access token is past its expiry.
    ///
    /// Nothing in this crate refreshes automatically; callers notice
    /// expiry and call the refresh operation themselves.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }
}
