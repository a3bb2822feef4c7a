//! User Repository Implementation
//!
//! Redis implementation of the UserRepository trait. Each user is a hash at
//! `user:<username>` holding the password hash and creation time.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::{User, UserRepository};
use crate::infrastructure::cache::keys;
use crate::shared::error::AppError;

/// Redis user repository implementation.
#[derive(Clone)]
pub struct RedisUserRepository {
    conn: ConnectionManager,
}

impl RedisUserRepository {
    /// Create a new RedisUserRepository with the given connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl UserRepository for RedisUserRepository {
    async fn create(&self, user: &User) -> Result<(), AppError> {
        let key = keys::user(&user.username);
        let mut conn = self.conn.clone();

        let fields: Vec<(&str, String)> = vec![
            ("password", user.password_hash.clone()),
            ("created_at", user.created_at.timestamp_millis().to_string()),
        ];
        let _: () = conn.hset_multiple(&key, &fields).await?;

        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let key = keys::user(username);
        let mut conn = self.conn.clone();

        let fields: HashMap<String, String> = conn.hgetall(&key).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        let password_hash = fields
            .get("password")
            .cloned()
            .ok_or_else(|| AppError::Internal(format!("User record {} missing password", key)))?;

        let created_at = fields
            .get("created_at")
            .and_then(|ms| ms.parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_else(Utc::now);

        Ok(Some(User {
            username: username.to_string(),
            password_hash,
            created_at,
        }))
    }

    async fn exists(&self, username: &str) -> Result<bool, AppError> {
        let key = keys::user(username);
        let mut conn = self.conn.clone();

        let exists: bool = conn.exists(&key).await?;
        Ok(exists)
    }
}
