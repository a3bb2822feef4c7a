//! Authentication Middleware
//!
//! Bearer-token validation for protected routes. Validation goes through
//! the auth service so the session version is re-checked on every request,
//! not just the token signature.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::application::services::{AuthError, AuthService, AuthServiceImpl};
use crate::infrastructure::repositories::{RedisSessionStore, RedisUserRepository};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

/// Middleware that validates the access token and session version
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    let auth_service = AuthServiceImpl::new(
        Arc::new(RedisUserRepository::new(state.redis.clone())),
        Arc::new(RedisSessionStore::new(state.redis.clone())),
        state.settings.jwt.clone(),
    );

    let claims = auth_service.validate_access(token).await.map_err(|e| match e {
        AuthError::SessionExpired => {
            AppError::Unauthorized("Session expired, please log in again.".into())
        }
        AuthError::InvalidToken => AppError::Unauthorized("Invalid token".into()),
        e => AppError::Internal(e.to_string()),
    })?;

    request.extensions_mut().insert(AuthUser {
        username: claims.username,
    });

    Ok(next.run(request).await)
}
