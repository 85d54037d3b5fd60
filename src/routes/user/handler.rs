use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    error::{AppError, FieldError},
    utils::{generate_token, success_to_api_response, verify_password},
};

use super::model::{AuthResponse, LoginRequest, RegisterRequest, User, validate_username};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let mut errors = Vec::new();
    if let Err(e) = validate_username(&req.username) {
        errors.push(e);
    }
    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password must not be empty"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let user = User::create(&state.pool, &req.username, &req.password).await?;
    let token = generate_token(user.id, &user.username, &state.config)
        .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))?;

    tracing::info!("Registered user {}", user.username);
    Ok((
        StatusCode::CREATED,
        success_to_api_response(AuthResponse {
            user_id: user.id,
            username: user.username,
            token,
        }),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let user = User::find_by_username(&state.pool, &req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = verify_password(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    let token = generate_token(user.id, &user.username, &state.config)
        .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))?;

    Ok(success_to_api_response(AuthResponse {
        user_id: user.id,
        username: user.username,
        token,
    })
    .into_response())
}
