//! Outbound one-time-code delivery.
//!
//! Mail transport is an external collaborator: the engine persists the code
//! first and only then attempts delivery, so a send failure never aborts a
//! flow; the user can request a resend.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Mail delivery failed: {0}")]
pub struct MailerError(pub String);

/// Delivers a one-time code to an end user.
///
/// Implementations must not log or otherwise persist the code value.
#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, to: &str, code: &str) -> Result<(), MailerError>;
}

/// Mailer that records the delivery attempt in the log and drops the message.
///
/// Useful for development and for deployments where delivery is handled by a
/// separate worker watching the store. The code value itself is never logged.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl OtpMailer for LogMailer {
    async fn send_otp(&self, to: &str, _code: &str) -> Result<(), MailerError> {
        tracing::info!(recipient = %to, "one-time code issued, delivery skipped (log mailer)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let mailer = LogMailer;
        assert!(mailer.send_otp("a@x.com", "123456").await.is_ok());
    }
}
