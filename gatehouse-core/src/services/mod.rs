//! Service layer for business logic
//!
//! This module contains the orchestrator driving the user-facing
//! authentication flows and the outbound mail collaborator contract.

pub mod auth;
pub mod mailer;

pub use auth::{
    AuthConfig, AuthService, FlowMessage, LoginRequest, RegisterRequest, ResetPasswordRequest,
    VerifiedLogin, VerifyOtpRequest,
};
pub use mailer::{LogMailer, MailerError, OtpMailer};
