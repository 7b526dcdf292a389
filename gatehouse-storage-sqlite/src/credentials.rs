use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use gatehouse_core::{
    error::{AuthError, StorageError},
    repositories::{CredentialRepository, NewUser, StoredCredentials},
    Error, User, UserId,
};

/// Credential store for one tenant, scoped by an already-resolved pool.
///
/// Every state transition here is a single statement; the guarded updates
/// rely on the store serializing writes per row, which SQLite's write lock
/// provides.
#[derive(Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    is_verified: bool,
    otp_code: Option<String>,
    otp_expires_at: Option<i64>,
    created_at: i64,
}

impl UserRow {
    fn into_user(self) -> Result<User, Error> {
        // A creation timestamp outside chrono's range means the row is
        // corrupt; surface it rather than substituting a bogus instant.
        let created_at = DateTime::from_timestamp(self.created_at, 0).ok_or_else(|| {
            tracing::error!(timestamp = self.created_at, "Invalid created_at in user row");
            Error::Storage(StorageError::Database(
                "Invalid timestamp in user row".to_string(),
            ))
        })?;

        Ok(User {
            id: UserId::new(&self.id),
            name: self.name,
            email: self.email,
            is_verified: self.is_verified,
            created_at,
        })
    }
}

impl TryFrom<UserRow> for StoredCredentials {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self, Error> {
        let password_hash = row.password_hash.clone();
        let otp_code = row.otp_code.clone();
        // An undecodable expiry fails closed: the pair reads as half-set and
        // no code is accepted against it.
        let otp_expires_at = row
            .otp_expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0));

        Ok(StoredCredentials {
            user: row.into_user()?,
            password_hash,
            otp_code,
            otp_expires_at,
        })
    }
}

#[async_trait]
impl CredentialRepository for SqliteCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredCredentials>, Error> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to look up user");
                Error::Storage(StorageError::Database("Failed to look up user".to_string()))
            })?;

        row.map(StoredCredentials::try_from).transpose()
    }

    async fn create(&self, new_user: NewUser) -> Result<User, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash, is_verified, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            RETURNING *
            "#,
        )
        .bind(new_user.id.as_str())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The UNIQUE constraint on email is the atomic duplicate check.
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                return Error::Auth(AuthError::DuplicateEmail);
            }
            tracing::error!(error = %e, "Failed to create user");
            Error::Storage(StorageError::Database("Failed to create user".to_string()))
        })?;

        row.into_user()
    }

    async fn set_otp(
        &self,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let result = sqlx::query(
            "UPDATE users SET otp_code = ?1, otp_expires_at = ?2 WHERE email = ?3",
        )
        .bind(code)
        .bind(expires_at.timestamp())
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to store one-time code");
            Error::Storage(StorageError::Database(
                "Failed to store one-time code".to_string(),
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound.into());
        }

        Ok(())
    }

    async fn clear_otp_and_verify(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, Error> {
        // Guarded single-statement clear: only the row still holding exactly
        // this unexpired code matches, so a code is consumable once even
        // under concurrent submission.
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET otp_code = NULL, otp_expires_at = NULL, is_verified = 1
            WHERE email = ?1 AND otp_code = ?2 AND otp_expires_at > ?3
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(now.timestamp())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to consume one-time code");
            Error::Storage(StorageError::Database(
                "Failed to consume one-time code".to_string(),
            ))
        })?;

        row.map(UserRow::into_user).transpose()
    }

    async fn set_password(&self, email: &str, password_hash: &str) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?1, otp_code = NULL, otp_expires_at = NULL
            WHERE email = ?2
            "#,
        )
        .bind(password_hash)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to update password");
            Error::Storage(StorageError::Database(
                "Failed to update password".to_string(),
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound.into());
        }

        Ok(())
    }
}
