use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::create_token;
use crate::AppState;

const RESET_TOKEN_LEN: usize = 32;
const RESET_TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    /// guest | service_provider; fixed at creation.
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

/// Register a new account. Role defaults to guest; service providers pick
/// their role at sign-up and it is immutable afterwards.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Check if email already exists
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&*state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    // Hash password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    // Create user
    let user_id = Uuid::new_v4();
    let new_user = user::ActiveModel {
        id: Set(user_id),
        email: Set(payload.email.clone()),
        password_hash: Set(password_hash),
        display_name: Set(payload.display_name.clone()),
        role: Set(payload.role.unwrap_or(UserRole::Guest)),
        ..Default::default()
    };

    let user = new_user.insert(&*state.db).await?;

    // Generate token
    let token = create_token(
        user.id,
        &user.email,
        user.role.clone(),
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        user: UserInfo {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
        },
    }))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Find user by email
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid email or password".to_string()))?;

    // Generate token
    let token = create_token(
        user.id,
        &user.email,
        user.role.clone(),
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        user: UserInfo {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Issue a password reset token. Always answers the same way so the endpoint
/// does not leak which emails have accounts. Token delivery (mail) sits
/// outside this service; the token is surfaced to the delivery pipeline via
/// the debug log.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let response = Json(serde_json::json!({
        "message": "If the account exists, a reset link has been sent"
    }));

    let Some(user) = user::Entity::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&*state.db)
        .await?
    else {
        return Ok(response);
    };

    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LEN)
        .map(char::from)
        .collect();

    let salt = SaltString::generate(&mut OsRng);
    let token_hash = Argon2::default()
        .hash_password(token.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash reset token: {}", e)))?
        .to_string();

    let mut am: user::ActiveModel = user.into();
    am.reset_token_hash = Set(Some(token_hash));
    am.reset_token_expires = Set(Some((Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS)).into()));
    am.update(&*state.db).await?;

    tracing::debug!(email = %payload.email, %token, "password reset token issued");

    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

/// Exchange a reset token for a new password. The token is single-use: both
/// reset fields are cleared on success.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let invalid = || AppError::Unauthorized("Invalid or expired reset token".to_string());

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&*state.db)
        .await?
        .ok_or_else(invalid)?;

    let token_hash = user.reset_token_hash.clone().ok_or_else(invalid)?;
    let expires = user.reset_token_expires.ok_or_else(invalid)?;

    if expires.with_timezone(&Utc) < Utc::now() {
        return Err(invalid());
    }

    let parsed_hash = PasswordHash::new(&token_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse reset token hash: {}", e)))?;

    Argon2::default()
        .verify_password(payload.token.as_bytes(), &parsed_hash)
        .map_err(|_| invalid())?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.new_password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    let mut am: user::ActiveModel = user.into();
    am.password_hash = Set(password_hash);
    am.reset_token_hash = Set(None);
    am.reset_token_expires = Set(None);
    am.update(&*state.db).await?;

    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}
