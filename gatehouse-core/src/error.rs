use thiserror::Error;

/// Top-level error type returned by every gatehouse operation.
///
/// All expected failures are typed; only storage faults represent conditions
/// the caller cannot recover from. The boundary layer maps [`Error::code`] to
/// transport status codes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Tenant error: {0}")]
    Tenant(#[from] TenantError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are deliberately not
    /// distinguishable from the login flow.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already registered")]
    DuplicateEmail,

    /// Absent, mismatched and expired codes all collapse into this variant
    /// so a caller probing codes learns nothing about which case it hit.
    #[error("Invalid or expired one-time code")]
    InvalidOrExpiredOtp,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Error)]
pub enum TenantError {
    #[error("Tenant not found")]
    NotFound,

    /// Transient: the tenant's database could not be reached. Never cached;
    /// the next request retries resolution.
    #[error("Tenant unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid tenant ID '{id}': {reason}")]
    InvalidTenantId { id: String, reason: String },

    #[error("Invalid signing secret: {0}")]
    InvalidSecret(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl Error {
    /// Stable machine-readable code for this error.
    ///
    /// These codes are part of the external contract: the boundary layer maps
    /// them to HTTP status codes and they must not change between releases.
    /// Storage faults intentionally collapse into `internal` so no backend
    /// detail reaches the caller.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Auth(AuthError::InvalidCredentials) => "invalid_credentials",
            Error::Auth(AuthError::UserNotFound) => "user_not_found",
            Error::Auth(AuthError::DuplicateEmail) => "duplicate_email",
            Error::Auth(AuthError::InvalidOrExpiredOtp) => "invalid_or_expired_otp",
            Error::Auth(AuthError::InvalidToken(_)) => "invalid_token",
            Error::Tenant(TenantError::NotFound) => "tenant_not_found",
            Error::Tenant(TenantError::Unavailable(_)) => "tenant_unavailable",
            Error::Tenant(TenantError::InvalidTenantId { .. })
            | Error::Tenant(TenantError::InvalidSecret(_)) => "validation_failed",
            Error::Validation(_) => "validation_failed",
            Error::Storage(_) => "internal",
        }
    }

    /// True for failures the caller is expected to handle (everything except
    /// storage faults).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Storage(_))
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    pub fn is_tenant_error(&self) -> bool {
        matches!(self, Error::Tenant(_))
    }
}
