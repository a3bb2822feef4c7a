//! Message Store Implementation
//!
//! Redis implementation of the MessageStore trait. Each conversation is a
//! list at `chat:<conversation key>` of JSON-encoded messages, oldest first.
//! RPUSH + LTRIM keeps bounded logs at their retention limit; appends are
//! atomic per key, which is the only true ordering the system requires.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::{ChatMessage, ConversationKey, MessageStore};
use crate::infrastructure::cache::keys;
use crate::shared::error::AppError;

/// Redis message log store.
#[derive(Clone)]
pub struct RedisMessageStore {
    conn: ConnectionManager,
}

impl RedisMessageStore {
    /// Create a new RedisMessageStore with the given connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl MessageStore for RedisMessageStore {
    async fn append(
        &self,
        key: &ConversationKey,
        message: &ChatMessage,
        retention: Option<usize>,
    ) -> Result<(), AppError> {
        let list_key = keys::messages(key);
        let entry = serde_json::to_string(message)
            .map_err(|e| AppError::Internal(format!("Message serialization failed: {}", e)))?;

        let mut conn = self.conn.clone();
        let _: () = conn.rpush(&list_key, entry).await?;

        if let Some(limit) = retention {
            // Keep only the most recent `limit` entries
            let _: () = conn.ltrim(&list_key, -(limit as isize), -1).await?;
        }

        Ok(())
    }

    async fn len(&self, key: &ConversationKey) -> Result<usize, AppError> {
        let list_key = keys::messages(key);
        let mut conn = self.conn.clone();

        let len: usize = conn.llen(&list_key).await?;
        Ok(len)
    }

    async fn range(
        &self,
        key: &ConversationKey,
        start: i64,
        end: i64,
    ) -> Result<Vec<ChatMessage>, AppError> {
        if end < start {
            return Ok(Vec::new());
        }

        let list_key = keys::messages(key);
        let mut conn = self.conn.clone();

        let raw: Vec<String> = conn.lrange(&list_key, start as isize, end as isize).await?;

        raw.iter()
            .map(|entry| {
                serde_json::from_str(entry).map_err(|e| {
                    AppError::Internal(format!("Corrupt message entry in {}: {}", list_key, e))
                })
            })
            .collect()
    }
}
