//! Confidential-client secret hash computation.
//!
//! Confidential clients must prove knowledge of their client secret on
//! every user-pool operation that references a username. The proof is the
//! standard-alphabet base64 encoding of `HMAC-SHA256(username + client_id)`
//! keyed by the client secret.
//!
//! The function is pure and deterministic: identical inputs always produce
//! the identical digest. Public clients (no secret configured) get `None`,
//! and callers must omit the wire field entirely — some providers reject an
//! empty-string proof as malformed rather than ignoring it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the secret hash for `username`, or `None` when no client
/// secret is configured.
#[must_use]
pub fn compute(username: &str, client_id: &str, client_secret: Option<&str>) -> Option<String> {
    let secret = client_secret?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());

    Some(STANDARD.encode(mac.finalize().into_bytes()))
}
