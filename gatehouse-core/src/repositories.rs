//! Repository trait for the per-tenant credential store.
//!
//! Storage backends implement [`CredentialRepository`] once; an instance is
//! always scoped to a single tenant's already-resolved connection handle, so
//! no operation here ever names a tenant. Cross-tenant isolation falls out of
//! the fact that a repository simply cannot reach any other tenant's data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Error, User, UserId};

/// Input for creating a user record. The password arrives already hashed;
/// cleartext never crosses this boundary.
#[derive(Clone)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: UserId::new_random(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// The full stored row for a user, including credential material.
///
/// This type stays inside the core and its storage backends; flows return
/// [`User`] summaries instead. `Debug` redacts the hash and any pending code.
#[derive(Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
    pub otp_code: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("user", &self.user)
            .field("password_hash", &"<redacted>")
            .field("otp_code", &self.otp_code.as_ref().map(|_| "<redacted>"))
            .field("otp_expires_at", &self.otp_expires_at)
            .finish()
    }
}

/// Per-tenant repository of user credential records.
///
/// Implementations must make every operation a single atomic store operation:
/// there is no multi-statement transition anywhere in the OTP lifecycle, which
/// is what keeps concurrent logins for the same user linearizable.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Look up the full stored row by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredCredentials>, Error>;

    /// Create a user, unverified, with no pending code.
    ///
    /// Uniqueness of the email must be enforced by a store-level constraint,
    /// not an application pre-check; a concurrent duplicate creation fails
    /// with [`crate::error::AuthError::DuplicateEmail`].
    async fn create(&self, new_user: NewUser) -> Result<User, Error>;

    /// Store a pending one-time code and its expiry, overwriting any previous
    /// pair (last writer wins). Code and expiry are always written together.
    ///
    /// Fails with [`crate::error::AuthError::UserNotFound`] when the email has
    /// no record.
    async fn set_otp(
        &self,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error>;

    /// Atomically clear the pending code and mark the user verified, but only
    /// where the stored code equals `code` and its expiry is still after
    /// `now`.
    ///
    /// Returns the updated user, or `None` when no row matched: the code was
    /// absent, different, expired, or already consumed by a concurrent
    /// request. The guard is what makes validate-then-clear a single
    /// linearization point per user row.
    async fn clear_otp_and_verify(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, Error>;

    /// Replace the password hash and clear any pending code in the same
    /// statement.
    ///
    /// Fails with [`crate::error::AuthError::UserNotFound`] when the email has
    /// no record.
    async fn set_password(&self, email: &str, password_hash: &str) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_credential_material() {
        let new_user = NewUser::new("Alice", "a@x.com", "$argon2id$fakehash");
        let rendered = format!("{new_user:?}");
        assert!(rendered.contains("a@x.com"));
        assert!(!rendered.contains("argon2"));

        let stored = StoredCredentials {
            user: User {
                id: UserId::new_random(),
                name: "Alice".to_string(),
                email: "a@x.com".to_string(),
                is_verified: false,
                created_at: Utc::now(),
            },
            password_hash: "$argon2id$fakehash".to_string(),
            otp_code: Some("123456".to_string()),
            otp_expires_at: Some(Utc::now()),
        };
        let rendered = format!("{stored:?}");
        assert!(!rendered.contains("argon2"));
        assert!(!rendered.contains("123456"));
    }
}
