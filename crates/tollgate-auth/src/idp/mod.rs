//! Identity provider adapter for the user-pool API.
//!
//! This module wraps the pool's request/response operations:
//!
//! - Registration: sign-up, confirmation, resend-confirmation
//! - Authentication: password sign-in, refresh, global sign-out
//! - Introspection: get-user and the verify-token liveness probe
//!
//! Every operation returns a typed result; provider rejections are normal
//! failure values, never panics. The adapter holds no state between calls
//! and never depends on OIDC discovery, so an issuer outage leaves the
//! password flow working.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tollgate_auth::{AuthConfig, UserPoolClient};
//!
//! let pool = UserPoolClient::new(Arc::new(config))?;
//! let outcome = pool.sign_up("alice", "correct horse", "alice@example.com").await?;
//! pool.confirm_sign_up("alice", "123456").await?;
//! let tokens = pool.sign_in("alice", "correct horse").await?;
//! ```

pub mod client;
pub mod types;

pub use client::UserPoolClient;
pub use types::{CodeDelivery, SignUpOutcome};
