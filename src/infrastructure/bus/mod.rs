//! Fan-out Bus
//!
//! Topic-based publish/subscribe relay over Redis. Any number of stateless
//! server instances present one logical chat space: instances never talk to
//! each other directly, only through topics.
//!
//! Each instance publishes events it produces locally via [`EventBus`] and
//! runs one [`run_subscriber`] task that feeds every received event,
//! including its own, to the local [`EventSink`] (the socket gateway).
//! Delivery is at-least-once to all currently subscribed instances; ordering
//! is FIFO per publisher per topic, nothing more.

mod events;

pub use events::{
    ChatPayload, ConversationsPayload, DmPayload, FanoutEvent, PreviousMessagesPayload,
    RefreshTokenPayload, TypingPayload,
};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, error, warn};

use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Publisher side of the fan-out bus.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an event to all subscribed instances.
    async fn publish(&self, event: &FanoutEvent) -> Result<(), AppError>;
}

/// Local delivery target for events received from the broker.
/// Implemented by the socket gateway.
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: FanoutEvent);
}

/// Redis-backed bus publisher.
#[derive(Clone)]
pub struct RedisBus {
    conn: ConnectionManager,
}

impl RedisBus {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl EventBus for RedisBus {
    async fn publish(&self, event: &FanoutEvent) -> Result<(), AppError> {
        let channel = event.channel();
        let payload = event
            .to_payload()
            .map_err(|e| AppError::Internal(format!("Event serialization failed: {}", e)))?;

        let mut conn = self.conn.clone();
        let _: () = conn.publish(channel, payload).await?;

        metrics::record_fanout_published(channel);
        debug!(channel, "Fan-out event published");
        Ok(())
    }
}

/// Run the per-instance subscriber loop. Subscribes to every bus topic and
/// hands decoded events to `sink`. Reconnects with a short backoff if the
/// broker connection drops; never returns under normal operation.
pub async fn run_subscriber(client: redis::Client, sink: Arc<dyn EventSink>) {
    loop {
        match pump_messages(&client, sink.as_ref()).await {
            Ok(()) => warn!("Pub/sub stream ended, reconnecting"),
            Err(e) => error!(error = %e, "Pub/sub subscriber failed, reconnecting"),
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

async fn pump_messages(client: &redis::Client, sink: &dyn EventSink) -> Result<(), AppError> {
    let mut pubsub = client.get_async_pubsub().await?;
    for channel in FanoutEvent::CHANNELS {
        pubsub.subscribe(channel).await?;
    }
    tracing::info!(topics = FanoutEvent::CHANNELS.len(), "Subscribed to fan-out topics");

    let mut stream = pubsub.on_message();
    while let Some(msg) = stream.next().await {
        let channel = msg.get_channel_name().to_string();
        let payload: String = match msg.get_payload() {
            Ok(p) => p,
            Err(e) => {
                warn!(channel = %channel, error = %e, "Dropping unreadable bus payload");
                continue;
            }
        };

        match FanoutEvent::decode(&channel, &payload) {
            Ok(Some(event)) => {
                metrics::record_fanout_received(event.channel());
                sink.deliver(event);
            }
            Ok(None) => warn!(channel = %channel, "Unknown subscriber channel"),
            Err(e) => warn!(channel = %channel, error = %e, "Dropping undecodable bus payload"),
        }
    }

    Ok(())
}
