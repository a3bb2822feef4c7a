//! Authentication Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RefreshTokenRequest, RegisterRequest};
use crate::application::dto::response::{AccessTokenResponse, TokenPairResponse};
use crate::application::services::{AuthError, AuthService, AuthServiceImpl};
use crate::infrastructure::repositories::{RedisSessionStore, RedisUserRepository};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn auth_service(state: &AppState) -> AuthServiceImpl<RedisUserRepository, RedisSessionStore> {
    AuthServiceImpl::new(
        Arc::new(RedisUserRepository::new(state.redis.clone())),
        Arc::new(RedisSessionStore::new(state.redis.clone())),
        state.settings.jwt.clone(),
    )
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenPairResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let tokens = auth_service(&state)
        .register(&body.username, &body.password)
        .await
        .map_err(|e| match e {
            AuthError::UserExists => AppError::Conflict("User already exists".into()),
            e => AppError::Internal(e.to_string()),
        })?;

    Ok((StatusCode::CREATED, Json(tokens.into())))
}

/// Login with credentials
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let tokens = auth_service(&state)
        .login(&body.username, &body.password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("Invalid credentials".into())
            }
            e => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(tokens.into()))
}

/// Exchange a refresh token for a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let access_token = auth_service(&state)
        .refresh(body.refresh_token.as_deref())
        .await
        .map_err(|e| match e {
            AuthError::NoToken => AppError::Unauthorized("No token sent.".into()),
            // A rotated or lapsed session is indistinguishable from bad
            // credentials to the caller; a full login is required either way.
            AuthError::SessionExpired => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::InvalidToken => AppError::Unauthorized("Invalid token".into()),
            e => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(AccessTokenResponse { access_token }))
}
