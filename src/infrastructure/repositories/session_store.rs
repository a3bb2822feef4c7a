//! Session Store Implementation
//!
//! Redis implementation of the SessionStore trait. One string value per
//! username at `session:<username>`; SETEX replaces any previous version
//! atomically, which is what rotates a user's session.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use crate::domain::SessionStore;
use crate::infrastructure::cache::keys;
use crate::shared::error::AppError;

/// Redis session version store.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    /// Create a new RedisSessionStore with the given connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, username: &str, version: &str, ttl_seconds: u64) -> Result<(), AppError> {
        let key = keys::session(username);
        let mut conn = self.conn.clone();

        let _: () = conn.set_ex(&key, version, ttl_seconds).await?;
        debug!(username, ttl = ttl_seconds, "Session version stored");

        Ok(())
    }

    async fn current(&self, username: &str) -> Result<Option<String>, AppError> {
        let key = keys::session(username);
        let mut conn = self.conn.clone();

        let version: Option<String> = conn.get(&key).await?;
        Ok(version)
    }
}
