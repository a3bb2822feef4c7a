//! Common Test Utilities
//!
//! In-memory implementations of the domain traits and a recording bus so
//! service-level tests run without a live Redis.

// Each test binary uses its own subset of these helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use chat_relay::config::{ChatSettings, JwtSettings};
use chat_relay::domain::{
    ChatMessage, ConversationKey, MessageStore, RecencyIndex, SessionStore, User, UserRepository,
};
use chat_relay::infrastructure::bus::{EventBus, FanoutEvent};
use chat_relay::shared::error::AppError;

/// JWT settings with generous expiries for tests
pub fn test_jwt_settings() -> JwtSettings {
    JwtSettings {
        access_secret: "test-access-secret-0123456789abcdef".into(),
        refresh_secret: "test-refresh-secret-0123456789abcdef".into(),
        access_token_expiry_minutes: 15,
        refresh_token_expiry_days: 7,
        session_ttl_days: 7,
    }
}

/// Chat settings mirroring the production defaults
pub fn test_chat_settings() -> ChatSettings {
    ChatSettings {
        room_history_limit: Some(500),
        dm_history_limit: None,
        default_page_limit: 10,
        refresh_nudge_interval_minutes: 14,
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), AppError> {
        self.users
            .lock()
            .unwrap()
            .insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.users.lock().unwrap().contains_key(username))
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    versions: Mutex<HashMap<String, String>>,
}

impl InMemorySessionStore {
    /// Drop a user's session record, as Redis would on TTL expiry
    pub fn expire(&self, username: &str) {
        self.versions.lock().unwrap().remove(username);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, username: &str, version: &str, _ttl_seconds: u64) -> Result<(), AppError> {
        self.versions
            .lock()
            .unwrap()
            .insert(username.to_string(), version.to_string());
        Ok(())
    }

    async fn current(&self, username: &str) -> Result<Option<String>, AppError> {
        Ok(self.versions.lock().unwrap().get(username).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryMessageStore {
    logs: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(
        &self,
        key: &ConversationKey,
        message: &ChatMessage,
        retention: Option<usize>,
    ) -> Result<(), AppError> {
        let mut logs = self.logs.lock().unwrap();
        let log = logs.entry(key.to_string()).or_default();
        log.push(message.clone());
        if let Some(limit) = retention {
            if log.len() > limit {
                let excess = log.len() - limit;
                log.drain(..excess);
            }
        }
        Ok(())
    }

    async fn len(&self, key: &ConversationKey) -> Result<usize, AppError> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .get(&key.to_string())
            .map_or(0, |log| log.len()))
    }

    async fn range(
        &self,
        key: &ConversationKey,
        start: i64,
        end: i64,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let logs = self.logs.lock().unwrap();
        let log = match logs.get(&key.to_string()) {
            Some(log) => log,
            None => return Ok(Vec::new()),
        };

        if end < start || end < 0 {
            return Ok(Vec::new());
        }

        let start = start.max(0) as usize;
        let end = (end as usize).min(log.len().saturating_sub(1));
        if start > end {
            return Ok(Vec::new());
        }
        Ok(log[start..=end].to_vec())
    }
}

#[derive(Default)]
pub struct InMemoryRecencyIndex {
    scores: Mutex<HashMap<String, i64>>,
}

#[async_trait]
impl RecencyIndex for InMemoryRecencyIndex {
    async fn touch(&self, key: &ConversationKey, at_ms: i64) -> Result<(), AppError> {
        self.scores.lock().unwrap().insert(key.to_string(), at_ms);
        Ok(())
    }

    async fn most_recent_first(&self) -> Result<Vec<String>, AppError> {
        let scores = self.scores.lock().unwrap();
        let mut entries: Vec<_> = scores.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        Ok(entries.into_iter().map(|(k, _)| k.clone()).collect())
    }
}

/// Bus double that records published events instead of fanning them out
#[derive(Default)]
pub struct RecordingBus {
    events: Mutex<Vec<FanoutEvent>>,
}

impl RecordingBus {
    pub fn events(&self) -> Vec<FanoutEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn channels(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.channel())
            .collect()
    }
}

#[async_trait]
impl EventBus for RecordingBus {
    async fn publish(&self, event: &FanoutEvent) -> Result<(), AppError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
