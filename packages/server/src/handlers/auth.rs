use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, OutcomeBody};
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, LoginResponse, RegisterRequest, validate_login_request,
    validate_register_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register an account",
    description = "Creates an account that can own images. The name `anonymous` is reserved.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created (registered)", body = OutcomeBody),
        (status = 400, description = "Validation error (malformed)", body = OutcomeBody),
        (status = 409, description = "Username taken (username-taken)", body = OutcomeBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let username = payload.username.trim().to_string();

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        username: Set(username),
        password: Set(hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Registration race condition: unique constraint caught on insert");
            AppError::UsernameTaken
        }
        _ => AppError::from(e),
    })?;

    tracing::info!(user_id = user.id, "Account registered");
    Ok((
        StatusCode::CREATED,
        Json(OutcomeBody::ok(
            "registered",
            format!("The account {} was successfully registered.", user.username),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in",
    description = "Exchanges a username and password for an auth token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in (logged-in)", body = LoginResponse),
        (status = 400, description = "Validation error (malformed)", body = OutcomeBody),
        (status = 401, description = "Wrong username or password (invalid-credentials)", body = OutcomeBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let username = payload.username.trim();

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(
        user.id,
        &user.username,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_days,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        success: true,
        status: "logged-in",
        status_readable: format!("Logged in as {}.", user.username),
        username: user.username,
        auth_token: token,
    }))
}
