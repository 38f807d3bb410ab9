//! Session token utilities
//!
//! # Token Format
//!
//! Session tokens follow the pattern `tp_{48 chars}`:
//! - Prefix: "tp_" (3 chars)
//! - Random part: 48 alphanumeric chars (base62: [A-Za-z0-9])
//!
//! Tokens are opaque: they carry no user data and are only meaningful to the
//! session store that issued them. The session store keys its entries by the
//! SHA-256 of the token, so a dump of session storage does not reveal usable
//! tokens.
//!
//! # Example
//!
//! ```
//! use taskpad_shared::auth::token::{generate_session_token, hash_token, validate_token_format};
//!
//! let token = generate_session_token();
//! assert!(token.starts_with("tp_"));
//! assert!(validate_token_format(&token));
//! assert_eq!(hash_token(&token).len(), 64);
//! ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of the token (characters)
const TOKEN_RANDOM_LENGTH: usize = 48;

/// Session token prefix
const TOKEN_PREFIX: &str = "tp_";

/// Total length of a session token (prefix + random)
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a new session token
///
/// Uses `rand::thread_rng()`; key space is 62^48 (about 2^285).
pub fn generate_session_token() -> String {
    format!("{}{}", TOKEN_PREFIX, generate_random_string(TOKEN_RANDOM_LENGTH))
}

/// Generates a random alphanumeric string
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes a token using SHA-256
///
/// # Returns
///
/// Hex-encoded SHA-256 hash (64 characters)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Checks that `token` looks like a session token
///
/// A well-formed token is not necessarily a live one; this only lets callers
/// reject garbage before touching session storage.
pub fn validate_token_format(token: &str) -> bool {
    if token.len() != TOKEN_LENGTH || !token.starts_with(TOKEN_PREFIX) {
        return false;
    }

    token[TOKEN_PREFIX.len()..]
        .chars()
        .all(|c| c.is_ascii_alphanumeric())
}
