//! ID generation utilities with prefix support
//!
//! Identifiers are generated with 96 bits of entropy and a short type prefix
//! (`usr_`, `tnt_`), URL-safe and opaque to callers.

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, TryRngCore};

/// Generate a prefixed ID with 96 bits of entropy.
///
/// The ID format is `{prefix}_{random}` where the random part is base64
/// URL-safe encoded without padding.
///
/// # Panics
///
/// Panics if the OS random number generator fails. This indicates a critical
/// system failure from which recovery is not possible for security-sensitive
/// operations.
pub fn generate_prefixed_id(prefix: &str) -> String {
    let mut bytes = [0u8; 12];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");

    let encoded = BASE64_URL_SAFE_NO_PAD.encode(bytes);

    format!("{prefix}_{encoded}")
}

/// Validate that a prefixed ID has the expected format and entropy.
pub fn validate_prefixed_id(id: &str, expected_prefix: &str) -> bool {
    let Some(random_part) = id
        .strip_prefix(expected_prefix)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };

    match BASE64_URL_SAFE_NO_PAD.decode(random_part) {
        Ok(decoded) => decoded.len() >= 12,
        Err(_) => false,
    }
}
