//! SQLite storage backend for the gatehouse authentication engine.
//!
//! Two kinds of database live behind this crate: the single shared
//! control-plane store holding tenant records ([`SqliteTenantDirectory`]),
//! and one user store per tenant, reached through the pooled handles cached
//! by [`TenantPools`] and queried via [`SqliteCredentialStore`].

mod credentials;
mod directory;
pub mod migrations;
mod pools;

pub use credentials::SqliteCredentialStore;
pub use directory::SqliteTenantDirectory;
pub use pools::TenantPools;
