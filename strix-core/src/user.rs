//! User accounts and the auth types shared with the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. Password material lives in a separate credentials
/// row and never travels with this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,   // User ID
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub jti: String, // JWT ID
}

/// Authentication errors
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token invalid or expired")]
    TokenInvalid,
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Internal authentication error")]
    InternalError,
}

/// Request validation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("username must be between 1 and 64 characters")]
    InvalidUsername,
    #[error("email address is not valid")]
    InvalidEmail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Passwords are deliberately unconstrained; argon2 has no input
    /// length limit, so any string (including empty) is accepted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let username = self.username.trim();
        if username.is_empty() || username.len() > 64 {
            return Err(ValidationError::InvalidUsername);
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued on successful registration or login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
