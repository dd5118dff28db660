//! OpenID Connect discovery and relying-party client.
//!
//! This module owns the browser-facing half of authentication: discovering
//! the configured issuer's endpoints and driving the authorization-code
//! flow against them.
//!
//! # Lifecycle
//!
//! The process-wide [`OidcProvider`] moves through four states:
//!
//! 1. **Uninitialized** - constructed, no network traffic yet
//! 2. **Discovering** - one in-flight fetch of the well-known document,
//!    shared by every concurrent caller
//! 3. **Ready** - terminal; the built [`RelyingParty`] is reused for the
//!    life of the process
//! 4. **Failed** - not sticky; the next caller starts a fresh attempt
//!
//! Discovery failures affect only this module. The password flow in
//! [`crate::idp`] talks to the user pool API directly and keeps working
//! while the issuer's well-known endpoint is unreachable.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tollgate_auth::oidc::OidcProvider;
//!
//! let provider = OidcProvider::new(config)?;
//!
//! // First call runs discovery; later calls reuse the client.
//! let client = provider.get().await?;
//! let url = client.authorization_url(&state, &nonce);
//! ```

pub mod discovery;
pub mod metadata;
pub mod provider;

pub use discovery::{DiscoveryClient, DiscoveryError};
pub use metadata::ProviderMetadata;
pub use provider::{IdTokenClaims, OidcProvider, RelyingParty, UserInfoClaims, id_token_claims};
