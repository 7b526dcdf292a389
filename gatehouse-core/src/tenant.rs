//! Tenant identification and the control-plane directory contract.
//!
//! A tenant is an isolated project: it owns its own user database and its own
//! token-signing secret. Tenant records live in a single shared control-plane
//! store, distinct from any tenant's user store, and are read-only from the
//! core's perspective except at tenant-creation time.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::TenantError,
    id::{generate_prefixed_id, validate_prefixed_id},
    Error,
};

/// Minimum length of a tenant signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 10;

/// Strongly-typed tenant identifier.
///
/// Identifiers are opaque, globally unique and never reused. Validation
/// rules: non-empty, at most 64 characters, ASCII alphanumeric plus hyphens
/// and underscores, case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a `TenantId` from an externally supplied string, validating it.
    pub fn new(id: impl Into<String>) -> Result<Self, TenantError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(TenantId(id))
    }

    /// Generates a fresh `tnt_`-prefixed identifier with 96 bits of entropy.
    pub fn generate() -> Self {
        TenantId(generate_prefixed_id("tnt"))
    }

    /// Creates a `TenantId` without validation, for values already known to
    /// be well-formed (e.g. read back from the control-plane store).
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        TenantId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this identifier was produced by [`TenantId::generate`].
    pub fn is_generated(&self) -> bool {
        validate_prefixed_id(&self.0, "tnt")
    }

    fn validate(id: &str) -> Result<(), TenantError> {
        if id.is_empty() {
            return Err(TenantError::InvalidTenantId {
                id: id.to_string(),
                reason: "Tenant ID cannot be empty".to_string(),
            });
        }

        if id.len() > 64 {
            return Err(TenantError::InvalidTenantId {
                id: id.to_string(),
                reason: "Tenant ID cannot exceed 64 characters".to_string(),
            });
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TenantError::InvalidTenantId {
                id: id.to_string(),
                reason: "Tenant ID can only contain ASCII alphanumeric characters, hyphens, and underscores".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A tenant's token-signing secret.
///
/// Opaque bytes, at least [`MIN_SECRET_LEN`] long. The `Debug` impl is
/// redacted; the raw bytes are only reachable through [`SigningSecret::expose`]
/// at the token issue/verify call sites.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, TenantError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(TenantError::InvalidSecret(format!(
                "signing secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        Ok(SigningSecret(secret))
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret(..)")
    }
}

/// A registered tenant as resolved from the control-plane store.
#[derive(Debug, Clone)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub database_url: String,
    pub signing_secret: SigningSecret,
    pub created_at: DateTime<Utc>,
}

/// Input for tenant registration; the identifier and timestamp are assigned
/// by the directory.
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub name: String,
    pub database_url: String,
    pub signing_secret: SigningSecret,
}

/// The control-plane directory resolving tenant identifiers to their
/// connection descriptor and signing context.
#[async_trait]
pub trait TenantDirectory: Send + Sync + 'static {
    /// Resolve a tenant identifier. Fails with [`TenantError::NotFound`]
    /// when no record matches; the error carries no detail that would
    /// distinguish an unknown id from a malformed one.
    async fn resolve(&self, id: &TenantId) -> Result<Tenant, Error>;

    /// Register a new tenant. This is the single sanctioned write to the
    /// control-plane store; everything else treats tenant records as
    /// read-only.
    async fn register(&self, tenant: NewTenant) -> Result<Tenant, Error>;
}
