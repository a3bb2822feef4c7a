//! Messaging Service
//!
//! Orchestrates persistence, pagination, and conversation-list refresh:
//! every write goes to the message store and the recency index, then out on
//! the fan-out bus so all instances deliver it to their local sockets.
//!
//! No in-process locks: the append and the recency touch are independent
//! operations with no client-visible partial state, and pagination reads
//! are eventually-consistent snapshots stabilized by the client-supplied
//! `skip` offset.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::config::ChatSettings;
use crate::domain::{
    ChatMessage, ConversationKey, ConversationSummary, MessageStore, RecencyIndex,
};
use crate::infrastructure::bus::{
    ChatPayload, ConversationsPayload, DmPayload, EventBus, FanoutEvent,
    PreviousMessagesPayload, RefreshTokenPayload, TypingPayload,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// One pagination window over a conversation log.
#[derive(Debug, Clone, Serialize)]
pub struct MessagePage {
    pub messages: Vec<ChatMessage>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

/// Messaging service trait for dependency injection
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Persist a room message and fan it out to room members everywhere
    async fn post_room_message(
        &self,
        socket_id: &str,
        sender: &str,
        room: &str,
        body: &str,
    ) -> Result<(), AppError>;

    /// Persist a DM and fan it out to both participants
    async fn post_direct_message(
        &self,
        socket_id: &str,
        sender: &str,
        to: &str,
        body: &str,
    ) -> Result<(), AppError>;

    /// Compute one pagination window. `page` is 1-based; page 1 holds the
    /// most recent `limit` messages. `skip` offsets the window by the
    /// number of messages the client has seen arrive since its snapshot.
    async fn fetch_page(
        &self,
        key: &ConversationKey,
        page: i64,
        limit: i64,
        skip: i64,
    ) -> Result<MessagePage, AppError>;

    /// Fetch a page and deliver it to the requesting socket via the bus
    async fn send_page(
        &self,
        socket_id: &str,
        key: &ConversationKey,
        page: i64,
        limit: i64,
        skip: i64,
    ) -> Result<(), AppError>;

    /// Conversation list for a user, most recently active first
    async fn conversations_for(&self, username: &str)
        -> Result<Vec<ConversationSummary>, AppError>;

    /// Compute `username`'s conversation list and deliver it to `to`
    /// (a username or socket id)
    async fn send_conversations(&self, to: &str, username: &str) -> Result<(), AppError>;

    /// Publish a typing indicator scoped to a room or recipient username
    async fn notify_typing(&self, username: &str, target: &str) -> Result<(), AppError>;

    /// Tell one specific connection to proactively refresh its access token
    async fn force_token_refresh(&self, socket_id: &str) -> Result<(), AppError>;
}

/// MessagingService implementation
pub struct MessagingServiceImpl<M, R>
where
    M: MessageStore,
    R: RecencyIndex,
{
    messages: Arc<M>,
    recency: Arc<R>,
    bus: Arc<dyn EventBus>,
    chat_settings: ChatSettings,
}

impl<M, R> MessagingServiceImpl<M, R>
where
    M: MessageStore,
    R: RecencyIndex,
{
    /// Create a new MessagingServiceImpl
    pub fn new(
        messages: Arc<M>,
        recency: Arc<R>,
        bus: Arc<dyn EventBus>,
        chat_settings: ChatSettings,
    ) -> Self {
        Self {
            messages,
            recency,
            bus,
            chat_settings,
        }
    }
}

#[async_trait]
impl<M, R> MessagingService for MessagingServiceImpl<M, R>
where
    M: MessageStore + 'static,
    R: RecencyIndex + 'static,
{
    async fn post_room_message(
        &self,
        socket_id: &str,
        sender: &str,
        room: &str,
        body: &str,
    ) -> Result<(), AppError> {
        let key = ConversationKey::room(room);
        let now = Utc::now().timestamp_millis();
        let message = ChatMessage::room(socket_id, sender, room, body, now);

        self.messages
            .append(&key, &message, self.chat_settings.retention_for(key.kind()))
            .await?;
        self.recency.touch(&key, now).await?;
        metrics::record_message("room");

        self.bus
            .publish(&FanoutEvent::Chat(ChatPayload {
                room: room.to_string(),
                username: sender.to_string(),
                message: body.to_string(),
            }))
            .await?;

        // Room membership is public, so any user's conversation list may
        // need updating; everyone gets the refresh signal.
        self.bus.publish(&FanoutEvent::RefreshConversations).await?;

        Ok(())
    }

    async fn post_direct_message(
        &self,
        socket_id: &str,
        sender: &str,
        to: &str,
        body: &str,
    ) -> Result<(), AppError> {
        let key = ConversationKey::dm(sender, to);
        let now = Utc::now().timestamp_millis();
        let message = ChatMessage::direct(socket_id, sender, to, body, now);

        self.messages
            .append(&key, &message, self.chat_settings.retention_for(key.kind()))
            .await?;
        self.recency.touch(&key, now).await?;
        metrics::record_message("dm");

        // Addressed to both username channels so the sender's other
        // connections see their own message too.
        self.bus
            .publish(&FanoutEvent::Dm(DmPayload {
                from: sender.to_string(),
                to: vec![to.to_string(), sender.to_string()],
                message: body.to_string(),
                timestamp: now,
            }))
            .await?;

        // DM visibility is private: refresh exactly the two participants'
        // lists, never a global broadcast.
        self.send_conversations(sender, sender).await?;
        self.send_conversations(to, to).await?;

        Ok(())
    }

    async fn fetch_page(
        &self,
        key: &ConversationKey,
        page: i64,
        limit: i64,
        skip: i64,
    ) -> Result<MessagePage, AppError> {
        let page = page.max(1);
        let limit = limit.max(1);
        let skip = skip.max(0);

        let total = self.messages.len(key).await? as i64;

        // Window over the oldest-first log, counted back from the end.
        // `skip` shifts the whole window past messages appended after the
        // client's snapshot, so page N+1 stays immediately older than the
        // rows the client already holds.
        let end = total - (page - 1) * limit - 1 - skip;
        let start = (total - page * limit - skip).max(0);

        let messages = if end < start || end < 0 {
            Vec::new()
        } else {
            self.messages.range(key, start, end).await?
        };

        Ok(MessagePage {
            messages,
            page,
            limit,
            total,
        })
    }

    async fn send_page(
        &self,
        socket_id: &str,
        key: &ConversationKey,
        page: i64,
        limit: i64,
        skip: i64,
    ) -> Result<(), AppError> {
        let window = self.fetch_page(key, page, limit, skip).await?;

        self.bus
            .publish(&FanoutEvent::PreviousMessages(PreviousMessagesPayload {
                socket_id: socket_id.to_string(),
                messages: window.messages,
                page: window.page,
                limit: window.limit,
                total_messages: window.total,
            }))
            .await
    }

    async fn conversations_for(
        &self,
        username: &str,
    ) -> Result<Vec<ConversationSummary>, AppError> {
        let keys = self.recency.most_recent_first().await?;

        Ok(keys
            .iter()
            .filter_map(|raw| ConversationKey::parse(raw))
            .filter(|key| key.involves(username))
            .map(|key| ConversationSummary {
                name: key.display_name_for(username),
                kind: key.kind(),
            })
            .collect())
    }

    async fn send_conversations(&self, to: &str, username: &str) -> Result<(), AppError> {
        let conversations = self.conversations_for(username).await?;

        self.bus
            .publish(&FanoutEvent::Conversations(ConversationsPayload {
                to: Some(to.to_string()),
                conversations,
            }))
            .await
    }

    async fn notify_typing(&self, username: &str, target: &str) -> Result<(), AppError> {
        self.bus
            .publish(&FanoutEvent::Typing(TypingPayload {
                user: username.to_string(),
                to: target.to_string(),
            }))
            .await
    }

    async fn force_token_refresh(&self, socket_id: &str) -> Result<(), AppError> {
        self.bus
            .publish(&FanoutEvent::RefreshToken(RefreshTokenPayload {
                socket_id: socket_id.to_string(),
            }))
            .await
    }
}
