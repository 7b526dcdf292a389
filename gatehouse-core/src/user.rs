//! User model for tenant-scoped accounts.
//!
//! A user record lives in exactly one tenant's data store and is never
//! visible across tenants. The [`User`] struct here is the public summary
//! returned from flows: it carries no password hash and no one-time-code
//! state. The full stored row is [`crate::repositories::StoredCredentials`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{generate_prefixed_id, validate_prefixed_id};

/// A unique, stable identifier for a user within one tenant.
///
/// Treat the value as opaque; it happens to be a `usr_`-prefixed random
/// string but callers must not rely on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: &str) -> Self {
        UserId(id.to_string())
    }

    pub fn new_random() -> Self {
        UserId(generate_prefixed_id("usr"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "usr")
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public summary of a user account.
///
/// | Field         | Type       | Description                                   |
/// | ------------- | ---------- | --------------------------------------------- |
/// | `id`          | `UserId`   | The unique identifier for the user.           |
/// | `name`        | `String`   | The display name of the user.                 |
/// | `email`       | `String`   | The email, unique within the tenant.          |
/// | `is_verified` | `bool`     | Whether a login one-time code was confirmed.  |
/// | `created_at`  | `DateTime` | The timestamp when the user was created.      |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}
