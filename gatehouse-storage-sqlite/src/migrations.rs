//! Schema setup helpers.
//!
//! Full migration tooling is out of scope; these create the tables the
//! engine requires when pointed at a fresh database. Both are idempotent.

use gatehouse_core::{error::StorageError, Error};
use sqlx::SqlitePool;

const CREATE_TENANTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tenants (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    database_url TEXT NOT NULL,
    signing_secret BLOB NOT NULL,
    created_at INTEGER NOT NULL
)
"#;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_verified INTEGER NOT NULL DEFAULT 0,
    otp_code TEXT,
    otp_expires_at INTEGER,
    created_at INTEGER NOT NULL
)
"#;

/// Create the control-plane schema (the shared `tenants` table).
pub async fn setup_control_plane(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::query(CREATE_TENANTS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create tenants table");
            StorageError::Migration("Failed to create tenants table".to_string())
        })?;

    tracing::debug!("control-plane schema ready");
    Ok(())
}

/// Create one tenant's user-store schema.
///
/// The UNIQUE constraint on `email` is load-bearing: it is what makes
/// check-then-insert registration atomic with respect to concurrent
/// creations of the same address.
pub async fn setup_tenant(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::query(CREATE_USERS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create users table");
            StorageError::Migration("Failed to create users table".to_string())
        })?;

    tracing::debug!("tenant schema ready");
    Ok(())
}
