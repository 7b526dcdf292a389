//! # Gatehouse
//!
//! Gatehouse is a multi-tenant authentication engine: one process serves many
//! isolated tenants, and every tenant owns its own user database and its own
//! token-signing secret. End users of a tenant sign in with a password
//! followed by an emailed one-time code, and come away with a bearer token
//! signed with their tenant's secret.
//!
//! The [`Gatehouse`] facade is the main entry point. Every operation names
//! the tenant it acts for; the facade resolves the tenant through the
//! control-plane directory, borrows a pooled connection to that tenant's
//! user store, and runs the flow against it. Nothing a flow touches can
//! reach another tenant's data.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gatehouse::{Gatehouse, RegisterRequest, SqliteTenantDirectory, TenantId};
//!
//! #[tokio::main]
//! async fn main() {
//!     let directory = SqliteTenantDirectory::connect("sqlite:control.db")
//!         .await
//!         .unwrap();
//!     let gatehouse = Gatehouse::new(Arc::new(directory));
//!
//!     let tenant = TenantId::new("tnt_example").unwrap();
//!     gatehouse
//!         .register(
//!             &tenant,
//!             RegisterRequest {
//!                 name: "Alice".to_string(),
//!                 email: "alice@example.com".to_string(),
//!                 password: "correct horse battery staple".to_string(),
//!             },
//!         )
//!         .await
//!         .unwrap();
//! }
//! ```

use std::sync::Arc;

use gatehouse_core::{services::AuthService, token};
use gatehouse_storage_sqlite::SqliteCredentialStore;

/// Re-export core types.
///
/// These are the types callers handle when working with the Gatehouse API.
pub use gatehouse_core::{
    error::{AuthError, StorageError, TenantError, ValidationError},
    services::{
        AuthConfig, FlowMessage, LogMailer, LoginRequest, MailerError, OtpMailer,
        RegisterRequest, ResetPasswordRequest, VerifiedLogin, VerifyOtpRequest,
    },
    Error, NewTenant, SigningSecret, Tenant, TenantDirectory, TenantId, TokenClaims, User,
    UserId,
};

/// Re-export the SQLite storage backend.
pub use gatehouse_storage_sqlite::{migrations, SqliteTenantDirectory, TenantPools};

/// Multi-tenant authentication engine.
///
/// Holds the control-plane directory, the cache of per-tenant connection
/// pools, and the mail collaborator. All state is shared and internally
/// synchronized; clone the `Arc` you wrap it in rather than the engine.
pub struct Gatehouse {
    directory: Arc<dyn TenantDirectory>,
    pools: TenantPools,
    mailer: Arc<dyn OtpMailer>,
    config: AuthConfig,
}

impl Gatehouse {
    /// Create an engine resolving tenants through `directory`.
    ///
    /// One-time codes are logged (recipient only) rather than delivered;
    /// call [`Gatehouse::with_mailer`] to wire up real delivery.
    pub fn new(directory: Arc<dyn TenantDirectory>) -> Self {
        Self {
            pools: TenantPools::new(directory.clone()),
            directory,
            mailer: Arc::new(LogMailer),
            config: AuthConfig::default(),
        }
    }

    /// Replace the mail collaborator used to deliver one-time codes.
    pub fn with_mailer(mut self, mailer: Arc<dyn OtpMailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Override the code and token lifetimes.
    pub fn with_config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a new user in `tenant`'s user store.
    pub async fn register(
        &self,
        tenant: &TenantId,
        request: RegisterRequest,
    ) -> Result<FlowMessage, Error> {
        self.service(tenant).await?.register(request).await
    }

    /// Password step of login: on success a one-time code is generated,
    /// stored and dispatched. No token is issued yet.
    pub async fn login(
        &self,
        tenant: &TenantId,
        request: LoginRequest,
    ) -> Result<FlowMessage, Error> {
        self.service(tenant).await?.login(request).await
    }

    /// One-time-code step of login: consumes the code and returns a bearer
    /// token signed with `tenant`'s secret.
    pub async fn verify_login(
        &self,
        tenant: &TenantId,
        request: VerifyOtpRequest,
    ) -> Result<VerifiedLogin, Error> {
        let record = self.resolve(tenant).await?;
        self.service(tenant)
            .await?
            .verify_login(request, &record.signing_secret)
            .await
    }

    /// Replace a user's pending one-time code with a fresh one.
    pub async fn reset_otp(&self, tenant: &TenantId, email: &str) -> Result<FlowMessage, Error> {
        self.service(tenant).await?.reset_otp(email).await
    }

    /// Start password recovery for `email`.
    pub async fn forgot_password(
        &self,
        tenant: &TenantId,
        email: &str,
    ) -> Result<FlowMessage, Error> {
        self.service(tenant).await?.forgot_password(email).await
    }

    /// Check a recovery code without consuming it; the code stays pending
    /// until [`Gatehouse::reset_password`] clears it.
    pub async fn verify_forgot_otp(
        &self,
        tenant: &TenantId,
        request: VerifyOtpRequest,
    ) -> Result<FlowMessage, Error> {
        self.service(tenant).await?.verify_forgot_otp(request).await
    }

    /// Replace a user's password and clear any pending code.
    pub async fn reset_password(
        &self,
        tenant: &TenantId,
        request: ResetPasswordRequest,
    ) -> Result<FlowMessage, Error> {
        self.service(tenant).await?.reset_password(request).await
    }

    /// Validate a bearer token against `tenant`'s current signing secret and
    /// return the user it identifies.
    ///
    /// The secret is re-resolved through the directory on every call, so a
    /// rotated secret invalidates outstanding tokens immediately.
    pub async fn authenticate(&self, tenant: &TenantId, token: &str) -> Result<UserId, Error> {
        let record = self.resolve(tenant).await?;
        let claims = token::verify(token, &record.signing_secret)?;
        Ok(claims.user_id())
    }

    /// Close every cached tenant pool. Call once at process shutdown.
    pub async fn shutdown(&self) {
        self.pools.shutdown().await;
        tracing::info!("gatehouse shut down");
    }

    async fn resolve(&self, tenant: &TenantId) -> Result<Tenant, Error> {
        self.directory.resolve(tenant).await
    }

    /// Build the flow orchestrator for one tenant. Cheap: the pool is cached
    /// and the service itself is a request-scoped composition of handles.
    async fn service(
        &self,
        tenant: &TenantId,
    ) -> Result<AuthService<SqliteCredentialStore>, Error> {
        let pool = self.pools.acquire(tenant).await?;
        Ok(AuthService::with_config(
            SqliteCredentialStore::new(pool),
            self.mailer.clone(),
            self.config.clone(),
        ))
    }
}
