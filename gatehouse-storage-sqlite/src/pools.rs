use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use gatehouse_core::{error::TenantError, Error, TenantDirectory, TenantId};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Cache of pooled connections to tenant user stores.
///
/// The only long-lived shared mutable structure in the engine. A pool is
/// created lazily on the first request for a tenant and reused until
/// [`TenantPools::invalidate`] or [`TenantPools::shutdown`]; there is no
/// cross-tenant locking, so a slow open for one tenant never blocks another.
///
/// Miss policy: concurrent misses for the same tenant may redundantly open a
/// pool, but only one winner is ever registered; losers are closed
/// immediately. A failed open surfaces [`TenantError::Unavailable`] and is
/// never cached, so the next call retries resolution from scratch.
pub struct TenantPools {
    directory: Arc<dyn TenantDirectory>,
    pools: DashMap<TenantId, SqlitePool>,
    max_connections: u32,
}

impl TenantPools {
    pub fn new(directory: Arc<dyn TenantDirectory>) -> Self {
        Self {
            directory,
            pools: DashMap::new(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Get the pooled handle for a tenant, opening it on first access.
    ///
    /// A cache hit returns without touching the tenant directory.
    pub async fn acquire(&self, id: &TenantId) -> Result<SqlitePool, Error> {
        if let Some(pool) = self.pools.get(id) {
            return Ok(pool.clone());
        }

        let tenant = self.directory.resolve(id).await?;

        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&tenant.database_url)
            .await
            .map_err(|e| {
                tracing::warn!(tenant = %id, error = %e, "failed to open tenant store");
                Error::Tenant(TenantError::Unavailable(e.to_string()))
            })?;

        let (handle, redundant) = match self.pools.entry(id.clone()) {
            // Another request won the race while we were connecting; keep
            // the registered pool and close ours.
            Entry::Occupied(occupied) => (occupied.get().clone(), Some(pool)),
            Entry::Vacant(vacant) => {
                vacant.insert(pool.clone());
                (pool, None)
            }
        };

        if let Some(loser) = redundant {
            tracing::debug!(tenant = %id, "discarding redundant tenant pool");
            loser.close().await;
        }

        Ok(handle)
    }

    /// Number of tenants with a registered pool.
    pub fn cached(&self) -> usize {
        self.pools.len()
    }

    /// Drop and close a tenant's cached pool, if any.
    pub async fn invalidate(&self, id: &TenantId) {
        if let Some((_, pool)) = self.pools.remove(id) {
            pool.close().await;
        }
    }

    /// Close every cached pool. Only used at process shutdown.
    pub async fn shutdown(&self) {
        let pools: Vec<SqlitePool> = self.pools.iter().map(|e| e.value().clone()).collect();
        self.pools.clear();
        for pool in pools {
            pool.close().await;
        }
    }
}
