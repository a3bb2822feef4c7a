//! Socket Gateway
//!
//! Registry of this instance's live socket connections and the channels
//! (rooms and per-user mailboxes) they belong to. The gateway is also the
//! local delivery end of the fan-out bus: every event received from the
//! broker, including ones this instance published itself, lands in
//! [`EventSink::deliver`] and is routed to whichever local sockets it
//! addresses. Sockets on other instances are reached the same way by
//! their own gateways.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::events::{ConversationEntry, ServerEvent};
use crate::infrastructure::bus::{EventSink, FanoutEvent};
use crate::infrastructure::metrics;

/// One live connection with its outbound frame queue.
pub struct ConnectedSocket {
    pub username: String,
    pub sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Socket registry for one server instance.
pub struct Gateway {
    /// Active sockets by socket id
    sockets: DashMap<String, Arc<ConnectedSocket>>,
    /// Channel name to member socket ids. Rooms and usernames share this
    /// namespace: joining a username channel is what makes a user
    /// addressable, and every socket joins its owner's channel on connect.
    channels: DashMap<String, Vec<String>>,
    /// Socket id to joined channel names, for disconnect cleanup
    memberships: DashMap<String, Vec<String>>,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            sockets: DashMap::new(),
            channels: DashMap::new(),
            memberships: DashMap::new(),
        }
    }

    /// Register a connected socket and join its owner's mailbox channel.
    pub fn register(
        &self,
        socket_id: &str,
        username: &str,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) {
        self.sockets.insert(
            socket_id.to_string(),
            Arc::new(ConnectedSocket {
                username: username.to_string(),
                sender,
            }),
        );
        self.join(socket_id, username);

        metrics::set_active_sockets(self.sockets.len());
        tracing::info!(username, socket_id, "Socket registered");
    }

    /// Remove a socket and all of its channel memberships.
    pub fn unregister(&self, socket_id: &str) {
        if let Some((_, socket)) = self.sockets.remove(socket_id) {
            if let Some((_, joined)) = self.memberships.remove(socket_id) {
                for channel in joined {
                    if let Some(mut members) = self.channels.get_mut(&channel) {
                        members.retain(|id| id != socket_id);
                    }
                }
            }

            metrics::set_active_sockets(self.sockets.len());
            tracing::info!(username = %socket.username, socket_id, "Socket unregistered");
        }
    }

    /// Add a socket to a channel. Idempotent.
    pub fn join(&self, socket_id: &str, channel: &str) {
        let mut members = self.channels.entry(channel.to_string()).or_default();
        if !members.iter().any(|id| id == socket_id) {
            members.push(socket_id.to_string());
            self.memberships
                .entry(socket_id.to_string())
                .or_default()
                .push(channel.to_string());
        }
    }

    /// Deliver a frame to one socket. Returns false if it is not local.
    pub fn send_to_socket(&self, socket_id: &str, event: ServerEvent) -> bool {
        match self.sockets.get(socket_id) {
            Some(socket) => socket.sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Deliver a frame to every local member of a channel.
    pub fn send_to_channel(&self, channel: &str, event: &ServerEvent) {
        if let Some(members) = self.channels.get(channel) {
            for socket_id in members.iter() {
                if let Some(socket) = self.sockets.get(socket_id) {
                    let _ = socket.sender.send(event.clone());
                }
            }
        }
    }

    /// Deliver a frame addressed by name: a socket id if one matches,
    /// otherwise a channel (username mailbox or room).
    pub fn send_to_name(&self, name: &str, event: ServerEvent) {
        if self.send_to_socket(name, event.clone()) {
            return;
        }
        self.send_to_channel(name, &event);
    }

    /// Deliver a frame to every local socket.
    pub fn broadcast(&self, event: &ServerEvent) {
        for socket in self.sockets.iter() {
            let _ = socket.sender.send(event.clone());
        }
    }

    /// Number of sockets connected to this instance.
    pub fn connection_count(&self) -> usize {
        self.sockets.len()
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for Gateway {
    fn deliver(&self, event: FanoutEvent) {
        match event {
            FanoutEvent::Chat(p) => {
                self.send_to_channel(
                    &p.room,
                    &ServerEvent::Message {
                        username: p.username,
                        message: p.message,
                    },
                );
            }
            FanoutEvent::Dm(p) => {
                // Addressed to both participants' mailboxes; only sockets
                // local to this instance resolve, the rest are handled by
                // their own instances receiving the same event.
                for name in &p.to {
                    self.send_to_name(
                        name,
                        ServerEvent::Dm {
                            username: p.from.clone(),
                            message: p.message.clone(),
                            timestamp: p.timestamp,
                        },
                    );
                }
            }
            FanoutEvent::PreviousMessages(p) => {
                self.send_to_socket(
                    &p.socket_id,
                    ServerEvent::PreviousMessages {
                        messages: p.messages,
                        page: p.page,
                        limit: p.limit,
                        total_messages: p.total_messages,
                    },
                );
            }
            FanoutEvent::Conversations(p) => {
                let entries: Vec<ConversationEntry> =
                    p.conversations.into_iter().map(Into::into).collect();
                match p.to {
                    Some(to) => self.send_to_name(&to, ServerEvent::Conversations(entries)),
                    None => self.broadcast(&ServerEvent::Conversations(entries)),
                }
            }
            FanoutEvent::RefreshConversations => {
                self.broadcast(&ServerEvent::RefreshConversations);
            }
            FanoutEvent::Typing(p) => {
                self.send_to_name(
                    &p.to.clone(),
                    ServerEvent::Typing {
                        username: p.user,
                        to: p.to,
                    },
                );
            }
            FanoutEvent::RefreshToken(p) => {
                self.send_to_socket(&p.socket_id, ServerEvent::RefreshToken);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::bus::{ChatPayload, DmPayload, RefreshTokenPayload};

    fn connect(gateway: &Gateway, socket_id: &str, username: &str) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        gateway.register(socket_id, username, tx);
        rx
    }

    #[test]
    fn room_messages_reach_members_only() {
        let gateway = Gateway::new();
        let mut alice = connect(&gateway, "s-alice", "alice");
        let mut bob = connect(&gateway, "s-bob", "bob");
        gateway.join("s-alice", "general");

        gateway.deliver(FanoutEvent::Chat(ChatPayload {
            room: "general".into(),
            username: "alice".into(),
            message: "hi".into(),
        }));

        assert!(matches!(
            alice.try_recv(),
            Ok(ServerEvent::Message { username, .. }) if username == "alice"
        ));
        assert!(bob.try_recv().is_err());
    }

    #[test]
    fn dms_reach_both_participants_mailboxes() {
        let gateway = Gateway::new();
        let mut alice = connect(&gateway, "s-alice", "alice");
        let mut bob = connect(&gateway, "s-bob", "bob");

        gateway.deliver(FanoutEvent::Dm(DmPayload {
            from: "alice".into(),
            to: vec!["bob".into(), "alice".into()],
            message: "hey".into(),
            timestamp: 1,
        }));

        for rx in [&mut alice, &mut bob] {
            assert!(matches!(
                rx.try_recv(),
                Ok(ServerEvent::Dm { username, .. }) if username == "alice"
            ));
        }
    }

    #[test]
    fn refresh_token_targets_one_socket() {
        let gateway = Gateway::new();
        let mut first = connect(&gateway, "s-1", "alice");
        let mut second = connect(&gateway, "s-2", "alice");

        gateway.deliver(FanoutEvent::RefreshToken(RefreshTokenPayload {
            socket_id: "s-2".into(),
        }));

        assert!(first.try_recv().is_err());
        assert!(matches!(second.try_recv(), Ok(ServerEvent::RefreshToken)));
    }

    #[test]
    fn unregister_cleans_channel_memberships() {
        let gateway = Gateway::new();
        let _rx = connect(&gateway, "s-alice", "alice");
        gateway.join("s-alice", "general");

        gateway.unregister("s-alice");
        assert_eq!(gateway.connection_count(), 0);

        // Delivering to the dead membership must be a no-op, not a panic.
        gateway.deliver(FanoutEvent::Chat(ChatPayload {
            room: "general".into(),
            username: "bob".into(),
            message: "anyone?".into(),
        }));
    }
}
