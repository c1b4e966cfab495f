use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State};
use chrono::{Duration, Utc};
use strix_core::{
    Error,
    api_types::ApiResponse,
    user::{AuthError, AuthToken, LoginRequest, RegisterRequest, User},
};
use uuid::Uuid;

use super::jwt::generate_access_token;
use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<AuthToken>>> {
    request
        .validate()
        .map_err(|e| AppError::bad_request(format!("Validation error: {}", e)))?;

    // Check if the email is already registered
    if let Ok(Some(_)) = state.users.get_user_by_email(&request.email).await {
        return Err(AppError::conflict(AuthError::EmailTaken.to_string()));
    }

    // Hash password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(request.password.as_bytes(), &salt)
        .map_err(|_| AppError::internal("Failed to hash password"))?
        .to_string();

    // Create user
    let user = User {
        id: Uuid::now_v7(),
        username: request.username.trim().to_lowercase(),
        email: request.email.trim().to_lowercase(),
        created_at: Utc::now(),
    };

    state
        .users
        .create_user(&user, &password_hash)
        .await
        .map_err(|e| match e {
            Error::Conflict(msg) => AppError::conflict(msg),
            _ => AppError::internal("Failed to create user"),
        })?;

    Ok(Json(ApiResponse::success(issue_token(&state, user.id)?)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthToken>>> {
    let user = state
        .users
        .get_user_by_email(&request.email.trim().to_lowercase())
        .await
        .map_err(|_| AppError::internal(AuthError::InternalError.to_string()))?
        .ok_or_else(|| AppError::unauthorized(AuthError::InvalidCredentials.to_string()))?;

    let password_hash = state
        .users
        .get_password_hash(user.id)
        .await
        .map_err(|_| AppError::internal("Failed to get password hash"))?
        .ok_or_else(|| AppError::unauthorized(AuthError::InvalidCredentials.to_string()))?;

    // Verify password
    let parsed_hash = PasswordHash::new(&password_hash)
        .map_err(|_| AppError::internal("Invalid password hash"))?;

    let argon2 = Argon2::default();
    argon2
        .verify_password(request.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::unauthorized(AuthError::InvalidCredentials.to_string()))?;

    Ok(Json(ApiResponse::success(issue_token(&state, user.id)?)))
}

pub async fn get_current_user(
    Extension(current_user): Extension<User>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(ApiResponse::success(current_user)))
}

fn issue_token(state: &AppState, user_id: Uuid) -> Result<AuthToken, AppError> {
    let ttl_secs = state.config.auth.token_ttl_secs;
    let access_token =
        generate_access_token(user_id, &state.config.auth.jwt_secret, Duration::seconds(ttl_secs))
            .map_err(|_| AppError::internal("Failed to generate access token"))?;

    Ok(AuthToken {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: ttl_secs,
    })
}
