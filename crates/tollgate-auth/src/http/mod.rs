//! Axum handlers for the browser login flow.
//!
//! Three endpoints drive the redirect-based login:
//!
//! - [`login_handler`] starts a login by redirecting to the provider
//! - [`callback_handler`] completes it when the provider redirects back
//! - [`logout_handler`] signs out and clears the session
//!
//! All three share an [`AuthFlowState`] and identify the browser through
//! the session cookie configured in
//! [`SessionConfig`](crate::config::SessionConfig).
//!
//! # Mounting
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use tollgate_auth::http::{
//!     AuthFlowState, callback_handler, login_handler, logout_handler,
//! };
//!
//! let app = Router::new()
//!     .route("/auth/login", get(login_handler))
//!     .route("/auth/callback", get(callback_handler))
//!     .route("/auth/logout", get(logout_handler))
//!     .with_state(flow_state);
//! ```
//!
//! The callback route must match the configured `redirect_uri`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub mod callback;
mod cookies;
pub mod login;
pub mod logout;

pub use callback::{CallbackError, CallbackParams, callback_handler, complete_login};
pub use login::{AuthFlowState, login_handler};
pub use logout::logout_handler;

/// 303 redirect with caching disabled.
pub(crate) fn see_other(location: &str) -> Response {
    (
        StatusCode::SEE_OTHER,
        [("Location", location), ("Cache-Control", "no-store")],
    )
        .into_response()
}

/// 303 redirect that also sets a session cookie.
pub(crate) fn see_other_with_cookie(location: &str, cookie: &str) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            ("Location", location),
            ("Set-Cookie", cookie),
            ("Cache-Control", "no-store"),
        ],
    )
        .into_response()
}
