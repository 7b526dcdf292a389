#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gatehouse::{
    migrations, Gatehouse, LoginRequest, MailerError, NewTenant, OtpMailer, RegisterRequest,
    SigningSecret, SqliteTenantDirectory, TenantDirectory, TenantId,
};
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

/// Captures every (recipient, code) pair instead of delivering mail.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    /// The most recently dispatched code, regardless of recipient.
    pub fn last_code(&self) -> String {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, code)| code.clone())
            .expect("no code was sent")
    }

    /// Every code dispatched to one recipient, oldest first.
    pub fn codes_for(&self, email: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
            .collect()
    }

    /// The most recently dispatched code for one recipient.
    pub fn code_for(&self, email: &str) -> String {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
            .expect("no code was sent to that recipient")
    }
}

#[async_trait]
impl OtpMailer for RecordingMailer {
    async fn send_otp(&self, to: &str, code: &str) -> Result<(), MailerError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), code.to_string()));
        Ok(())
    }
}

/// A control-plane store plus an engine, all backed by files in one temp
/// directory so every tenant really gets a separate database.
pub struct TestEnv {
    pub gatehouse: Arc<Gatehouse>,
    pub mailer: Arc<RecordingMailer>,
    pub control: sqlx::SqlitePool,
    directory: Arc<SqliteTenantDirectory>,
    dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let control_url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("control.db").display()
        );
        let control = SqlitePoolOptions::new().connect(&control_url).await.unwrap();
        migrations::setup_control_plane(&control).await.unwrap();

        let directory = Arc::new(SqliteTenantDirectory::new(control.clone()));
        let mailer = Arc::new(RecordingMailer::default());
        let gatehouse =
            Arc::new(Gatehouse::new(directory.clone()).with_mailer(mailer.clone()));

        Self {
            gatehouse,
            mailer,
            control,
            directory,
            dir,
        }
    }

    /// Register a tenant with its own database file and an initialized
    /// user-store schema.
    pub async fn create_tenant(&self, name: &str) -> TenantId {
        let database_url = format!(
            "sqlite://{}?mode=rwc",
            self.dir.path().join(format!("{name}.db")).display()
        );

        let tenant = self
            .directory
            .register(NewTenant {
                name: name.to_string(),
                database_url: database_url.clone(),
                signing_secret: SigningSecret::new(
                    format!("{name}-signing-secret").into_bytes(),
                )
                .unwrap(),
            })
            .await
            .unwrap();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .unwrap();
        migrations::setup_tenant(&pool).await.unwrap();
        pool.close().await;

        tenant.id
    }

    /// Open a direct pool to one tenant's database, for assertions against
    /// the stored rows.
    pub async fn tenant_pool(&self, id: &TenantId) -> sqlx::SqlitePool {
        let database_url: String =
            sqlx::query_scalar("SELECT database_url FROM tenants WHERE id = ?1")
                .bind(id.as_str())
                .fetch_one(&self.control)
                .await
                .unwrap();

        SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .unwrap()
    }
}

pub fn register_request(name: &str, email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}
