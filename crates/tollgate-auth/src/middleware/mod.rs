//! HTTP middleware for bearer token authentication.
//!
//! This module provides Axum extractors for:
//!
//! - Required bearer token verification ([`BearerAuth`])
//! - Optional bearer token verification ([`OptionalBearerAuth`])
//! - JSON error responses with RFC 6750 challenges
//!
//! Verification goes through the identity provider on every request; there
//! is no local signature check, so a revoked or signed-out token stops
//! working immediately.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use tollgate_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> String {
//!     format!("Hello, {}!", auth.username())
//! }
//!
//! let auth_state = AuthState::new(user_pool);
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(auth_state);
//! ```

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{AuthState, BearerAuth, OptionalBearerAuth};
pub use types::AuthContext;
