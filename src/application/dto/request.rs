//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 20, message = "Username must be 3-20 characters"))]
    pub username: String,

    #[validate(
        length(min = 8, max = 24, message = "Password must be 8-24 characters"),
        custom(function = password_letter_and_digit)
    )]
    pub password: String,
}

/// Login request (same constraints as registration)
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 3, max = 20, message = "Username must be 3-20 characters"))]
    pub username: String,

    #[validate(
        length(min = 8, max = 24, message = "Password must be 8-24 characters"),
        custom(function = password_letter_and_digit)
    )]
    pub password: String,
}

/// Refresh token request. The token is optional at the type level so a
/// missing field surfaces as the NoToken auth error, not a decode failure.
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// DM target lookup query parameters
#[derive(Debug, Deserialize)]
pub struct DmQueryParams {
    pub username: String,
}

/// Passwords must carry at least one letter and one digit.
fn password_letter_and_digit(password: &str) -> Result<(), ValidationError> {
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if has_letter && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new("password_complexity")
            .with_message("Password must contain at least one letter and one digit".into()))
    }
}
