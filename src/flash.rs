//! Signed one-shot flash messages.
//!
//! Validation failures redirect to `/` with a user-facing message carried in
//! a cookie. The cookie is signed with SHA-256 over `secret || message` so a
//! client cannot forge arbitrary banner text into the page; it is cleared on
//! the next index render.
//!
//! Token format: `base64url(message) "." base64url(sha256(secret || message))`.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use sha2::{Digest, Sha256};

pub const COOKIE_NAME: &str = "flash";

fn digest(secret: &str, message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(message.as_bytes());
    B64.encode(hasher.finalize())
}

/// Sign a message into a cookie-safe token.
pub fn sign(secret: &str, message: &str) -> String {
    format!("{}.{}", B64.encode(message), digest(secret, message))
}

/// Verify a token and recover the message. Tampered, truncated, or
/// wrong-secret tokens yield `None`.
pub fn verify(secret: &str, token: &str) -> Option<String> {
    let (payload, signature) = token.split_once('.')?;
    let message = String::from_utf8(B64.decode(payload).ok()?).ok()?;
    if digest(secret, &message) == signature {
        Some(message)
    } else {
        None
    }
}

/// Extract and verify a flash message from a `Cookie` request header.
pub fn from_cookie_header(secret: &str, header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == COOKIE_NAME {
            verify(secret, value)
        } else {
            None
        }
    })
}
