//! Session version store trait.
//!
//! One opaque version string per username, with expiry. Rotating the version
//! revokes every token minted under the previous one; validation re-checks
//! the stored value on each use, so no revocation list is needed.

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Single source of truth for per-user session versions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store `version` as the current session for `username`, replacing any
    /// previous value, with the given TTL.
    async fn put(&self, username: &str, version: &str, ttl_seconds: u64) -> Result<(), AppError>;

    /// Current session version for `username`, if one exists and has not
    /// expired.
    async fn current(&self, username: &str) -> Result<Option<String>, AppError>;
}
