//! Input validation shared by the flows.
//!
//! The HTTP boundary validates request shapes before calling in; these checks
//! are the core's own line of defense so a misbehaving boundary cannot write
//! malformed records.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

/// Practical subset of RFC 5322, compiled once.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(format!(
            "Invalid email format: {email}"
        )))
    }
}

/// Minimum 8 characters, maximum 128, not empty or whitespace-only.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    if password.trim().is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password cannot be only whitespace".to_string(),
        ));
    }

    if password.len() < 8 {
        return Err(ValidationError::InvalidPassword(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(ValidationError::InvalidPassword(
            "Password must be no more than 128 characters long".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidName(
            "Name cannot be empty or whitespace only".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(ValidationError::InvalidName(
            "Name must be no more than 100 characters long".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user.name+tag@sub.example.co").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(250))).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("securepassword123").is_ok());

        assert!(validate_password("").is_err());
        assert!(validate_password("        ").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("John Doe").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"a".repeat(101)).is_err());
    }
}
