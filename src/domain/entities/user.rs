//! User entity and repository trait.
//!
//! Stored as a Redis hash at `user:<username>`. The username itself is the
//! stable identifier; there is no profile data beyond it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Represents a user account.
///
/// Authentication-only: the relay never exposes anything beyond the
/// username to other users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Username (3-20 characters, unique)
    pub username: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Data access contract for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user record.
    async fn create(&self, user: &User) -> Result<(), AppError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Check whether a username is already taken.
    async fn exists(&self, username: &str) -> Result<bool, AppError>;
}
