//! The auth orchestrator: composes the credential store, the one-time-code
//! engine, the token issuer and the mail collaborator into the user-facing
//! flows.
//!
//! Per-user state machine: `Unregistered → Registered(unverified) →
//! Registered(verified)`, with the OTP sub-state `NoPendingCode ⇄
//! PendingCode(code, expiry)`. Every transition is one atomic repository
//! call; the orchestrator itself holds no conversation state and never
//! retries. These are request-scoped, single-attempt operations.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::AuthError,
    otp,
    repositories::{CredentialRepository, NewUser},
    services::mailer::OtpMailer,
    tenant::SigningSecret,
    token,
    validation::{validate_email, validate_name, validate_password},
    Error, User,
};

/// Tunable lifetimes for codes and tokens.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of a generated one-time code (default 10 minutes).
    pub otp_ttl: Duration,
    /// Lifetime of an issued bearer token (default 7 days).
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_ttl: otp::default_ttl(),
            token_ttl: token::default_ttl(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

#[derive(Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
}

impl std::fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("email", &self.email)
            .field("new_password", &"<redacted>")
            .finish()
    }
}

/// Success payload for flows that return only a human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct FlowMessage {
    pub message: String,
}

impl FlowMessage {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Success payload for a verified login: bearer token plus the user summary.
/// The summary never includes the password hash or OTP state.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedLogin {
    pub message: String,
    pub token: String,
    pub user: User,
}

/// Orchestrator for the authentication flows of one tenant.
///
/// Cheap to construct: the facade builds one per request around the
/// tenant-scoped repository handle.
pub struct AuthService<R: CredentialRepository> {
    credentials: R,
    mailer: Arc<dyn OtpMailer>,
    config: AuthConfig,
}

impl<R: CredentialRepository> AuthService<R> {
    pub fn new(credentials: R, mailer: Arc<dyn OtpMailer>) -> Self {
        Self::with_config(credentials, mailer, AuthConfig::default())
    }

    pub fn with_config(credentials: R, mailer: Arc<dyn OtpMailer>, config: AuthConfig) -> Self {
        Self {
            credentials,
            mailer,
            config,
        }
    }

    /// Register a new user: created unverified, with no pending code and no
    /// token. A duplicate email within the tenant fails with
    /// [`AuthError::DuplicateEmail`]; the same email in a different tenant is
    /// unaffected.
    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<FlowMessage, Error> {
        validate_name(&request.name)?;
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        let password_hash = hash_password(&request.password);
        self.credentials
            .create(NewUser::new(request.name, request.email, password_hash))
            .await?;

        Ok(FlowMessage::new("User registered"))
    }

    /// Password step of login. On success a one-time code is generated,
    /// stored (overwriting any pending one) and handed to the mailer; no
    /// token is issued yet.
    ///
    /// Unknown email and wrong password both fail with
    /// [`AuthError::InvalidCredentials`] so the response does not reveal
    /// whether an account exists.
    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<FlowMessage, Error> {
        let stored = self
            .credentials
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if password_auth::verify_password(&request.password, &stored.password_hash).is_err() {
            return Err(AuthError::InvalidCredentials.into());
        }

        self.issue_otp(&request.email).await?;

        Ok(FlowMessage::new("OTP sent. Please verify your login."))
    }

    /// OTP step of login. On success the code is cleared, the user is marked
    /// verified, and a bearer token is issued with the tenant's secret.
    ///
    /// The clear is guarded in the store, so a code is consumable exactly
    /// once even under concurrent submission.
    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn verify_login(
        &self,
        request: VerifyOtpRequest,
        secret: &SigningSecret,
    ) -> Result<VerifiedLogin, Error> {
        let stored = self
            .credentials
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let now = Utc::now();
        otp::verify(
            stored.otp_code.as_deref(),
            stored.otp_expires_at,
            &request.code,
            now,
        )?;

        // Re-checked inside the store; a concurrent consumer of the same
        // code loses here even though the check above passed.
        let user = self
            .credentials
            .clear_otp_and_verify(&request.email, &request.code, now)
            .await?
            .ok_or(AuthError::InvalidOrExpiredOtp)?;

        let token = token::issue(&user.id, secret, self.config.token_ttl)?;

        Ok(VerifiedLogin {
            message: "Login verified successfully".to_string(),
            token,
            user,
        })
    }

    /// Replace any pending code with a fresh one (last writer wins).
    #[tracing::instrument(skip_all, fields(email = %email))]
    pub async fn reset_otp(&self, email: &str) -> Result<FlowMessage, Error> {
        self.require_user(email).await?;
        self.issue_otp(email).await?;

        Ok(FlowMessage::new(
            "OTP reset successfully. Please verify your login.",
        ))
    }

    /// Start password recovery: generate and store a code for the account.
    #[tracing::instrument(skip_all, fields(email = %email))]
    pub async fn forgot_password(&self, email: &str) -> Result<FlowMessage, Error> {
        self.require_user(email).await?;
        self.issue_otp(email).await?;

        Ok(FlowMessage::new(
            "OTP sent for password reset. Please verify.",
        ))
    }

    /// Validate the recovery code without consuming it. The code is
    /// deliberately left pending so the reset step can be gated on it; the
    /// subsequent [`AuthService::reset_password`] clears it. The replay
    /// window this opens is bounded by the code's TTL.
    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn verify_forgot_otp(&self, request: VerifyOtpRequest) -> Result<FlowMessage, Error> {
        let stored = self
            .credentials
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        otp::verify(
            stored.otp_code.as_deref(),
            stored.otp_expires_at,
            &request.code,
            Utc::now(),
        )?;

        Ok(FlowMessage::new(
            "OTP verified successfully. You can now reset your password.",
        ))
    }

    /// Store a new password hash and clear any pending code in one atomic
    /// store operation.
    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<FlowMessage, Error> {
        validate_password(&request.new_password)?;

        let password_hash = hash_password(&request.new_password);
        self.credentials
            .set_password(&request.email, &password_hash)
            .await?;

        Ok(FlowMessage::new(
            "Password reset successfully. You can now log in with your new password.",
        ))
    }

    async fn require_user(&self, email: &str) -> Result<(), Error> {
        self.credentials
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(())
    }

    /// Generate, persist and dispatch a one-time code. The code is persisted
    /// before the send is attempted, so delivery failure is log-and-continue:
    /// the user can request a resend.
    async fn issue_otp(&self, email: &str) -> Result<(), Error> {
        let code = otp::generate_code();
        let expires_at = otp::expiry_from(Utc::now(), self.config.otp_ttl);

        self.credentials.set_otp(email, &code, expires_at).await?;

        if let Err(e) = self.mailer.send_otp(email, &code).await {
            tracing::warn!(recipient = %email, error = %e, "failed to deliver one-time code");
        }

        Ok(())
    }
}

fn hash_password(password: &str) -> String {
    password_auth::generate_hash(password)
}
