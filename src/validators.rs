/// Input validators for credentials and chirps
///
/// Credential checks only apply when credentials are created or changed.
/// Login does not validate its input, so bad input and unknown users look
/// the same.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_PASSWORD_LENGTH: usize = 72; // bcrypt ignores bytes beyond 72
const MAX_CHIRP_LENGTH: usize = 140;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates password length bounds
pub fn validate_password_length(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        ));
    }

    Ok(())
}

/// Validates a chirp body: not blank, at most 140 characters
pub fn validate_chirp_body(body: &str) -> Result<(), ValidationError> {
    if body.trim().is_empty() {
        return Err(ValidationError::EmptyField("body".to_string()));
    }

    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ValidationError::TooLong("body".to_string(), MAX_CHIRP_LENGTH));
    }

    Ok(())
}
