//! Messaging Handlers
//!
//! HTTP side of the messaging surface. The real traffic flows over the
//! socket; this only covers pre-flight checks a client performs before
//! opening a DM thread.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::application::dto::request::DmQueryParams;
use crate::application::dto::response::StatusResponse;
use crate::domain::UserRepository;
use crate::infrastructure::repositories::RedisUserRepository;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Check whether a DM target exists before the client opens the thread
pub async fn check_dm(
    State(state): State<AppState>,
    Query(params): Query<DmQueryParams>,
) -> Result<Json<StatusResponse>, AppError> {
    let users = Arc::new(RedisUserRepository::new(state.redis.clone()));

    if !users.exists(&params.username).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(Json(StatusResponse {
        message: "User found",
    }))
}
