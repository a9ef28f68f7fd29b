use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::lifecycle::ANONYMOUS;

/// Request body for account registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique username (1-32 chars, alphanumeric and underscores).
    #[schema(example = "alice")]
    pub username: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    let username = payload.username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    if username.eq_ignore_ascii_case(ANONYMOUS) {
        return Err(AppError::Validation(format!(
            "The username '{ANONYMOUS}' is reserved"
        )));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful login. The token goes into the `auth-token` field of
/// insert, hide and delete requests.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(rename = "status-simple")]
    #[schema(example = "logged-in")]
    pub status: &'static str,
    #[serde(rename = "status-humanreadable")]
    pub status_readable: String,
    #[schema(example = "alice")]
    pub username: String,
    #[serde(rename = "auth-token")]
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub auth_token: String,
}
