//! Session cookie helpers shared by the browser-flow handlers.

use axum::http::{HeaderMap, header::COOKIE};

use crate::config::SessionConfig;

/// Extracts the session id from the request's `Cookie` header.
pub(crate) fn extract_session_cookie(
    headers: &HeaderMap,
    config: &SessionConfig,
) -> Option<String> {
    let cookie_header = headers.get(COOKIE)?.to_str().ok()?;
    let cookie_name = &config.cookie_name;

    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=')
            && name.trim() == cookie_name
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

/// Builds a `Set-Cookie` header value carrying the session id.
pub(crate) fn session_cookie(config: &SessionConfig, session_id: &str) -> String {
    let secure = if config.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}={}; Path=/; HttpOnly; SameSite={}{}",
        config.cookie_name, session_id, config.cookie_same_site, secure
    )
}

/// Builds a `Set-Cookie` header value that clears the session cookie.
pub(crate) fn clear_session_cookie(config: &SessionConfig) -> String {
    let secure = if config.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; SameSite={}{}",
        config.cookie_name, config.cookie_same_site, secure
    )
}

/// Appends an opaque error code to the login page path.
pub(crate) fn login_redirect(login_path: &str, error_code: &str) -> String {
    if login_path.contains('?') {
        format!("{login_path}&error={error_code}")
    } else {
        format!("{login_path}?error={error_code}")
    }
}
