//! One-time-code generation and validation.
//!
//! A code is a 6-digit numeric string in [100000, 999999] (always six
//! digits, leading digit never zero) generated from the OS CSPRNG.
//! Predictable codes are a direct account-takeover risk, so nothing weaker
//! than `OsRng` is acceptable here.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, TryRngCore};
use subtle::ConstantTimeEq;

use crate::error::AuthError;

/// Inclusive lower bound of a generated code.
pub const OTP_MIN: u64 = 100_000;
/// Inclusive upper bound of a generated code.
pub const OTP_MAX: u64 = 999_999;

/// Default lifetime of a generated code.
pub fn default_ttl() -> Duration {
    Duration::minutes(10)
}

/// Generate a fresh 6-digit code.
///
/// # Panics
///
/// Panics if the OS random number generator fails; there is no safe fallback
/// for security-sensitive randomness.
pub fn generate_code() -> String {
    let mut bytes = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");

    // Modulo over a full u64 of entropy; the bias toward low codes is on the
    // order of 2^-44 and irrelevant next to the 1-in-900000 guess rate.
    let code = OTP_MIN + u64::from_le_bytes(bytes) % (OTP_MAX - OTP_MIN + 1);
    code.to_string()
}

/// Compute the expiry for a code generated at `now`.
pub fn expiry_from(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now + ttl
}

/// Validate a submitted code against the stored pair.
///
/// Accepted iff the submitted value equals the stored code (constant-time)
/// and `now` is strictly before the stored expiry. Every other case (no
/// pending code, mismatched value, expired code, or a code without an expiry)
/// fails uniformly with [`AuthError::InvalidOrExpiredOtp`] so the response
/// never reveals which check failed.
pub fn verify(
    stored_code: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    submitted: &str,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    // Code and expiry are stored together; treat a half-set pair as absent.
    let (code, expires_at) = match (stored_code, expires_at) {
        (Some(code), Some(expires_at)) => (code, expires_at),
        _ => return Err(AuthError::InvalidOrExpiredOtp),
    };

    let matches = code.as_bytes().len() == submitted.as_bytes().len()
        && bool::from(code.as_bytes().ct_eq(submitted.as_bytes()));

    if !matches || now >= expires_at {
        return Err(AuthError::InvalidOrExpiredOtp);
    }

    Ok(())
}
