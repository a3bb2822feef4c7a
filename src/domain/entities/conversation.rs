//! Conversation list entry and recency index trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ConversationKey, ConversationKind};
use crate::shared::error::AppError;

/// One entry in a user's conversation list.
///
/// `name` is what the viewer sees: the room name, or the DM peer's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ConversationKind,
}

/// Global mapping from conversation key to last-activity time, supporting
/// most-recent-first listing. Updated on every message write.
#[async_trait]
pub trait RecencyIndex: Send + Sync {
    /// Record activity for a conversation at the given epoch milliseconds.
    async fn touch(&self, key: &ConversationKey, at_ms: i64) -> Result<(), AppError>;

    /// All known conversation keys, most recently active first.
    async fn most_recent_first(&self) -> Result<Vec<String>, AppError>;
}
