//! Stateless bearer token issuance and validation.
//!
//! Tokens are JWTs signed with the owning tenant's secret. The algorithm is
//! fixed process-wide at HS256; it is not part of the tenant record, so
//! issuer and validator always agree. Validity is purely signature + expiry;
//! there is no revocation store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::AuthError, tenant::SigningSecret, user::UserId, Error};

/// Default token lifetime: 7 days from issuance.
pub fn default_ttl() -> Duration {
    Duration::days(7)
}

/// Claims embedded in a bearer token: the minimum needed to re-identify the
/// user, plus issuance and expiry instants.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - user ID
    pub sub: String,
    /// Issued at in seconds (as UTC timestamp)
    pub iat: i64,
    /// Expiration time in seconds (as UTC timestamp)
    pub exp: i64,
}

impl TokenClaims {
    pub fn user_id(&self) -> UserId {
        UserId::new(&self.sub)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Issue a signed token for `user_id`, valid for `ttl` from now.
pub fn issue(user_id: &UserId, secret: &SigningSecret, ttl: Duration) -> Result<String, Error> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.as_str().to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.expose()),
    )
    .map_err(|e| AuthError::InvalidToken(format!("Failed to encode token: {e}")))?;

    Ok(token)
}

/// Verify a token against a tenant's secret and return its claims.
///
/// Fails with [`AuthError::InvalidToken`] for malformed encoding, signature
/// mismatch, or an expiry in the past. Expiry is checked with zero leeway.
/// Callers must resolve the secret through the tenant directory at call time
/// so that secret rotation takes effect on the next validation.
pub fn verify(token: &str, secret: &SigningSecret) -> Result<TokenClaims, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.expose()),
        &validation,
    )
    .map_err(|e| AuthError::InvalidToken(format!("Token validation failed: {e}")))?;

    Ok(data.claims)
}
