use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use gatehouse_core::{
    error::{StorageError, TenantError},
    Error, NewTenant, SigningSecret, Tenant, TenantDirectory, TenantId,
};

/// Control-plane tenant directory backed by the shared `tenants` table.
pub struct SqliteTenantDirectory {
    pool: SqlitePool,
}

impl SqliteTenantDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool to the control-plane store at `url`.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new().connect(url).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to control-plane store");
            StorageError::Connection("Failed to connect to control-plane store".to_string())
        })?;

        Ok(Self::new(pool))
    }
}

#[derive(sqlx::FromRow)]
struct TenantRow {
    id: String,
    name: String,
    database_url: String,
    signing_secret: Vec<u8>,
    created_at: i64,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = Error;

    fn try_from(row: TenantRow) -> Result<Self, Error> {
        let created_at = DateTime::from_timestamp(row.created_at, 0).ok_or_else(|| {
            tracing::error!(timestamp = row.created_at, "Invalid created_at in tenant row");
            Error::Storage(StorageError::Database(
                "Invalid timestamp in tenant row".to_string(),
            ))
        })?;

        Ok(Tenant {
            id: TenantId::new_unchecked(row.id),
            name: row.name,
            database_url: row.database_url,
            signing_secret: SigningSecret::new(row.signing_secret).map_err(Error::Tenant)?,
            created_at,
        })
    }
}

#[async_trait]
impl TenantDirectory for SqliteTenantDirectory {
    async fn resolve(&self, id: &TenantId) -> Result<Tenant, Error> {
        let row = sqlx::query_as::<_, TenantRow>(
            r#"
            SELECT id, name, database_url, signing_secret, created_at
            FROM tenants
            WHERE id = ?1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to resolve tenant");
            Error::Storage(StorageError::Database("Failed to resolve tenant".to_string()))
        })?;

        row.ok_or(Error::Tenant(TenantError::NotFound))?.try_into()
    }

    async fn register(&self, tenant: NewTenant) -> Result<Tenant, Error> {
        let id = TenantId::generate();
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, database_url, signing_secret, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(id.as_str())
        .bind(&tenant.name)
        .bind(&tenant.database_url)
        .bind(tenant.signing_secret.expose())
        .bind(created_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to register tenant");
            Error::Storage(StorageError::Database("Failed to register tenant".to_string()))
        })?;

        Ok(Tenant {
            id,
            name: tenant.name,
            database_url: tenant.database_url,
            signing_secret: tenant.signing_secret,
            created_at,
        })
    }
}
