//! Socket Connection Handler
//!
//! Accepts WebSocket upgrades, authenticates the handshake, and runs the
//! per-connection frame loop.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use uuid::Uuid;

use super::events::{ClientEvent, ServerEvent};
use crate::application::services::{
    AuthError, AuthService, AuthServiceImpl, MessagingService, MessagingServiceImpl,
};
use crate::domain::ConversationKey;
use crate::infrastructure::bus::EventBus;
use crate::infrastructure::repositories::{
    RedisMessageStore, RedisRecencyIndex, RedisSessionStore, RedisUserRepository,
};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Handshake query parameters
#[derive(Debug, Deserialize)]
pub struct HandshakeParams {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

/// WebSocket upgrade handler.
///
/// Authentication happens before the upgrade: clients pass their access
/// token as an `accessToken` query parameter because browser WebSocket
/// APIs cannot set an Authorization header. A failed handshake is a plain
/// 401 with a body distinguishing a lapsed token (refreshable) from a
/// rotated session (re-login required).
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HandshakeParams>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let auth_service = AuthServiceImpl::new(
        Arc::new(RedisUserRepository::new(state.redis.clone())),
        Arc::new(RedisSessionStore::new(state.redis.clone())),
        state.settings.jwt.clone(),
    );

    let validated = match params.access_token.as_deref() {
        Some(token) => auth_service.validate_access(token).await,
        None => Err(AuthError::NoToken),
    };

    let claims = validated.map_err(|e| match e {
        AuthError::NoToken => AppError::Unauthorized("No token provided".into()),
        AuthError::SessionExpired => AppError::Unauthorized("Invalid session".into()),
        _ => AppError::Unauthorized("Token expired".into()),
    })?;

    let username = claims.username;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, username)))
}

/// Per-connection loop: registers the socket with the gateway, pushes the
/// initial conversation list, then dispatches inbound frames until the
/// peer disconnects.
async fn handle_socket(socket: WebSocket, state: AppState, username: String) {
    let socket_id = Uuid::new_v4().to_string();
    let (mut sender, mut receiver) = socket.split();

    // Outbound frames funnel through a channel so the gateway and the bus
    // subscriber can enqueue without holding the socket.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize outbound frame");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    state.gateway.register(&socket_id, &username, tx);

    let messaging = MessagingServiceImpl::new(
        Arc::new(RedisMessageStore::new(state.redis.clone())),
        Arc::new(RedisRecencyIndex::new(state.redis.clone())),
        state.bus.clone() as Arc<dyn EventBus>,
        state.settings.chat.clone(),
    );

    // Fresh connections get their conversation list without asking.
    if let Err(e) = messaging.send_conversations(&socket_id, &username).await {
        tracing::warn!(error = %e, socket_id, "Initial conversation push failed");
    }

    // Long-lived sockets outlive their access token. Nudge the client to
    // refresh on a cadence shorter than the token expiry.
    let nudge_period =
        Duration::from_secs(state.settings.chat.refresh_nudge_interval_minutes * 60);
    let mut nudge = interval(nudge_period);
    nudge.set_missed_tick_behavior(MissedTickBehavior::Delay);
    nudge.tick().await; // First tick fires immediately; skip it.

    loop {
        tokio::select! {
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => {
                                if let Err(e) =
                                    dispatch(&event, &socket_id, &username, &state, &messaging).await
                                {
                                    tracing::warn!(
                                        error = %e,
                                        socket_id,
                                        "Frame handling failed"
                                    );
                                }
                            }
                            Err(e) => {
                                tracing::debug!(error = %e, socket_id, "Dropping malformed frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, socket_id, "Socket read error");
                        break;
                    }
                }
            }
            _ = nudge.tick() => {
                if let Err(e) = messaging.force_token_refresh(&socket_id).await {
                    tracing::warn!(error = %e, socket_id, "Token refresh nudge failed");
                }
            }
        }
    }

    state.gateway.unregister(&socket_id);
    sender_task.abort();
}

/// Route one inbound frame to the messaging service.
async fn dispatch(
    event: &ClientEvent,
    socket_id: &str,
    username: &str,
    state: &AppState,
    messaging: &impl MessagingService,
) -> Result<(), AppError> {
    let default_limit = state.settings.chat.default_page_limit as i64;

    match event {
        ClientEvent::GetConversations => {
            messaging.send_conversations(socket_id, username).await
        }
        ClientEvent::JoinRoom {
            room,
            page,
            limit,
            skip,
        } => {
            state.gateway.join(socket_id, room);
            let key = ConversationKey::room(room);
            messaging
                .send_page(socket_id, &key, *page, (*limit).unwrap_or(default_limit), *skip)
                .await
        }
        ClientEvent::JoinFriend {
            friend,
            page,
            limit,
            skip,
        } => {
            // No channel join: DMs route through the participants' mailbox
            // channels, which every socket is already in.
            let key = ConversationKey::dm(username, friend);
            messaging
                .send_page(socket_id, &key, *page, (*limit).unwrap_or(default_limit), *skip)
                .await
        }
        ClientEvent::Message { room, message } => {
            messaging
                .post_room_message(socket_id, username, room, message)
                .await
        }
        ClientEvent::Dm { to, content } => {
            messaging
                .post_direct_message(socket_id, username, to, content)
                .await
        }
        ClientEvent::Typing(target) => messaging.notify_typing(username, target).await,
    }
}
