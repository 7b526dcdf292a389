//! End-to-end flow coverage against real per-tenant SQLite stores.

mod common;

use common::{login_request, register_request, TestEnv};
use gatehouse::{AuthError, Error, ResetPasswordRequest, ValidationError, VerifyOtpRequest};

#[tokio::test]
async fn test_full_login_journey() {
    let env = TestEnv::new().await;
    let tenant = env.create_tenant("acme").await;

    let outcome = env
        .gatehouse
        .register(&tenant, register_request("Alice", "alice@example.com", "a-long-password"))
        .await
        .unwrap();
    assert_eq!(outcome.message, "User registered");

    let outcome = env
        .gatehouse
        .login(&tenant, login_request("alice@example.com", "a-long-password"))
        .await
        .unwrap();
    assert_eq!(outcome.message, "OTP sent. Please verify your login.");

    let code = env.mailer.last_code();
    let verified = env
        .gatehouse
        .verify_login(
            &tenant,
            VerifyOtpRequest {
                email: "alice@example.com".to_string(),
                code: code.clone(),
            },
        )
        .await
        .unwrap();
    assert_eq!(verified.message, "Login verified successfully");
    assert!(verified.user.is_verified);

    // The token round-trips through bearer authentication.
    let user_id = env
        .gatehouse
        .authenticate(&tenant, &verified.token)
        .await
        .unwrap();
    assert_eq!(user_id, verified.user.id);

    // The code was consumed; replaying it fails.
    let replay = env
        .gatehouse
        .verify_login(
            &tenant,
            VerifyOtpRequest {
                email: "alice@example.com".to_string(),
                code,
            },
        )
        .await;
    assert!(matches!(
        replay,
        Err(Error::Auth(AuthError::InvalidOrExpiredOtp))
    ));
}

#[tokio::test]
async fn test_register_rejects_duplicate_email_and_bad_input() {
    let env = TestEnv::new().await;
    let tenant = env.create_tenant("acme").await;

    env.gatehouse
        .register(&tenant, register_request("Alice", "alice@example.com", "a-long-password"))
        .await
        .unwrap();

    let duplicate = env
        .gatehouse
        .register(&tenant, register_request("Alice Again", "alice@example.com", "other-password"))
        .await;
    assert!(matches!(
        duplicate,
        Err(Error::Auth(AuthError::DuplicateEmail))
    ));

    let bad_email = env
        .gatehouse
        .register(&tenant, register_request("Bob", "not-an-email", "a-long-password"))
        .await;
    assert!(matches!(
        bad_email,
        Err(Error::Validation(ValidationError::InvalidEmail(_)))
    ));
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_wrong_code() {
    let env = TestEnv::new().await;
    let tenant = env.create_tenant("acme").await;

    env.gatehouse
        .register(&tenant, register_request("Alice", "alice@example.com", "a-long-password"))
        .await
        .unwrap();

    let wrong_password = env
        .gatehouse
        .login(&tenant, login_request("alice@example.com", "not-the-password"))
        .await;
    assert!(matches!(
        wrong_password,
        Err(Error::Auth(AuthError::InvalidCredentials))
    ));

    env.gatehouse
        .login(&tenant, login_request("alice@example.com", "a-long-password"))
        .await
        .unwrap();
    let code = env.mailer.last_code();
    let wrong_code = if code == "000000" { "111111" } else { "000000" };

    let result = env
        .gatehouse
        .verify_login(
            &tenant,
            VerifyOtpRequest {
                email: "alice@example.com".to_string(),
                code: wrong_code.to_string(),
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(Error::Auth(AuthError::InvalidOrExpiredOtp))
    ));
}

#[tokio::test]
async fn test_reset_otp_issues_a_fresh_code() {
    let env = TestEnv::new().await;
    let tenant = env.create_tenant("acme").await;

    env.gatehouse
        .register(&tenant, register_request("Alice", "alice@example.com", "a-long-password"))
        .await
        .unwrap();
    env.gatehouse
        .login(&tenant, login_request("alice@example.com", "a-long-password"))
        .await
        .unwrap();

    let outcome = env.gatehouse.reset_otp(&tenant, "alice@example.com").await.unwrap();
    assert_eq!(outcome.message, "OTP reset successfully. Please verify your login.");

    env.gatehouse
        .verify_login(
            &tenant,
            VerifyOtpRequest {
                email: "alice@example.com".to_string(),
                code: env.mailer.last_code(),
            },
        )
        .await
        .unwrap();

    let unknown = env.gatehouse.reset_otp(&tenant, "nobody@example.com").await;
    assert!(matches!(unknown, Err(Error::Auth(AuthError::UserNotFound))));
}

#[tokio::test]
async fn test_forgot_password_roundtrip() {
    let env = TestEnv::new().await;
    let tenant = env.create_tenant("acme").await;

    env.gatehouse
        .register(&tenant, register_request("Alice", "alice@example.com", "a-long-password"))
        .await
        .unwrap();

    env.gatehouse
        .forgot_password(&tenant, "alice@example.com")
        .await
        .unwrap();
    let code = env.mailer.last_code();

    // Validation only: the code is still pending afterwards, so checking it
    // twice succeeds.
    for _ in 0..2 {
        env.gatehouse
            .verify_forgot_otp(
                &tenant,
                VerifyOtpRequest {
                    email: "alice@example.com".to_string(),
                    code: code.clone(),
                },
            )
            .await
            .unwrap();
    }

    env.gatehouse
        .reset_password(
            &tenant,
            ResetPasswordRequest {
                email: "alice@example.com".to_string(),
                new_password: "a-brand-new-password".to_string(),
            },
        )
        .await
        .unwrap();

    // The reset cleared the pending code.
    let stale = env
        .gatehouse
        .verify_forgot_otp(
            &tenant,
            VerifyOtpRequest {
                email: "alice@example.com".to_string(),
                code,
            },
        )
        .await;
    assert!(matches!(
        stale,
        Err(Error::Auth(AuthError::InvalidOrExpiredOtp))
    ));

    let old = env
        .gatehouse
        .login(&tenant, login_request("alice@example.com", "a-long-password"))
        .await;
    assert!(matches!(
        old,
        Err(Error::Auth(AuthError::InvalidCredentials))
    ));

    env.gatehouse
        .login(&tenant, login_request("alice@example.com", "a-brand-new-password"))
        .await
        .unwrap();
}
