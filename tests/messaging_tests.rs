//! Messaging Service Tests
//!
//! Pagination windows, retention, conversation listing, and fan-out
//! publishing, exercised against in-memory stores and a recording bus.

mod common;

use std::sync::Arc;

use chat_relay::application::services::{MessagingService, MessagingServiceImpl};
use chat_relay::config::ChatSettings;
use chat_relay::domain::{ConversationKey, ConversationKind};
use chat_relay::infrastructure::bus::{EventBus, FanoutEvent};
use pretty_assertions::assert_eq;
use test_case::test_case;

use common::{test_chat_settings, InMemoryMessageStore, InMemoryRecencyIndex, RecordingBus};

struct Harness {
    service: MessagingServiceImpl<InMemoryMessageStore, InMemoryRecencyIndex>,
    bus: Arc<RecordingBus>,
}

fn harness(settings: ChatSettings) -> Harness {
    let bus = Arc::new(RecordingBus::default());
    let service = MessagingServiceImpl::new(
        Arc::new(InMemoryMessageStore::default()),
        Arc::new(InMemoryRecencyIndex::default()),
        bus.clone() as Arc<dyn EventBus>,
        settings,
    );
    Harness { service, bus }
}

async fn seed_room(h: &Harness, room: &str, count: usize) {
    for i in 0..count {
        h.service
            .post_room_message("s-1", "alice", room, &format!("msg-{}", i))
            .await
            .unwrap();
    }
}

#[test_case(1, 20, (27, 46); "page one holds the newest twenty")]
#[test_case(2, 20, (7, 26); "page two is the next older window")]
#[test_case(3, 20, (0, 6); "last page is the short remainder")]
#[tokio::test]
async fn pagination_windows(page: i64, limit: i64, expected: (usize, usize)) {
    let h = harness(test_chat_settings());
    seed_room(&h, "general", 47).await;

    let key = ConversationKey::room("general");
    let window = h.service.fetch_page(&key, page, limit, 0).await.unwrap();

    assert_eq!(window.total, 47);
    let bodies: Vec<String> = window.messages.iter().map(|m| m.message.clone()).collect();
    let expected: Vec<String> = (expected.0..=expected.1)
        .map(|i| format!("msg-{}", i))
        .collect();
    assert_eq!(bodies, expected);
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let h = harness(test_chat_settings());
    seed_room(&h, "general", 47).await;

    let key = ConversationKey::room("general");
    let window = h.service.fetch_page(&key, 4, 20, 0).await.unwrap();

    assert!(window.messages.is_empty());
    assert_eq!(window.total, 47);
}

#[tokio::test]
async fn skip_keeps_older_pages_stable_under_appends() {
    let h = harness(test_chat_settings());
    seed_room(&h, "general", 30).await;

    let key = ConversationKey::room("general");
    let before = h.service.fetch_page(&key, 2, 10, 0).await.unwrap();

    // Three messages arrive after the client took its snapshot.
    seed_room(&h, "general", 3).await;

    // Skipping the messages it watched arrive gives back the same window.
    let after = h.service.fetch_page(&key, 2, 10, 3).await.unwrap();

    let bodies = |w: &chat_relay::application::services::MessagePage| {
        w.messages.iter().map(|m| m.message.clone()).collect::<Vec<_>>()
    };
    assert_eq!(bodies(&after), bodies(&before));
}

#[tokio::test]
async fn room_retention_evicts_the_oldest() {
    let settings = ChatSettings {
        room_history_limit: Some(5),
        ..test_chat_settings()
    };
    let h = harness(settings);
    seed_room(&h, "general", 6).await;

    let key = ConversationKey::room("general");
    let window = h.service.fetch_page(&key, 1, 10, 0).await.unwrap();

    assert_eq!(window.total, 5);
    assert_eq!(window.messages.first().unwrap().message, "msg-1");
    assert_eq!(window.messages.last().unwrap().message, "msg-5");
}

#[tokio::test]
async fn dm_logs_are_unbounded_by_default() {
    let settings = ChatSettings {
        room_history_limit: Some(5),
        ..test_chat_settings()
    };
    let h = harness(settings);

    for i in 0..8 {
        h.service
            .post_direct_message("s-1", "alice", "bob", &format!("dm-{}", i))
            .await
            .unwrap();
    }

    let key = ConversationKey::dm("alice", "bob");
    let window = h.service.fetch_page(&key, 1, 20, 0).await.unwrap();
    assert_eq!(window.total, 8);
}

#[tokio::test]
async fn room_message_publishes_chat_and_global_refresh() {
    let h = harness(test_chat_settings());

    h.service
        .post_room_message("s-1", "alice", "general", "hi")
        .await
        .unwrap();

    assert_eq!(h.bus.channels(), vec!["chat", "refreshConversations"]);

    match &h.bus.events()[0] {
        FanoutEvent::Chat(p) => {
            assert_eq!(p.room, "general");
            assert_eq!(p.username, "alice");
            assert_eq!(p.message, "hi");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn dm_publishes_to_both_participants_not_globally() {
    let h = harness(test_chat_settings());

    h.service
        .post_direct_message("s-1", "alice", "bob", "hey")
        .await
        .unwrap();

    // One dm event plus one targeted conversations event per participant;
    // never the global refresh broadcast.
    assert_eq!(
        h.bus.channels(),
        vec!["dm", "conversations", "conversations"]
    );

    match &h.bus.events()[0] {
        FanoutEvent::Dm(p) => {
            assert_eq!(p.from, "alice");
            assert_eq!(p.to, vec!["bob".to_string(), "alice".to_string()]);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let targets: Vec<Option<String>> = h
        .bus
        .events()
        .iter()
        .filter_map(|e| match e {
            FanoutEvent::Conversations(p) => Some(p.to.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        targets,
        vec![Some("alice".to_string()), Some("bob".to_string())]
    );
}

#[tokio::test]
async fn conversation_list_is_scoped_and_most_recent_first() {
    let h = harness(test_chat_settings());

    h.service
        .post_room_message("s-1", "alice", "general", "one")
        .await
        .unwrap();
    h.service
        .post_direct_message("s-1", "alice", "bob", "two")
        .await
        .unwrap();
    // A DM between two other users must never appear for alice.
    h.service
        .post_direct_message("s-2", "carol", "dave", "three")
        .await
        .unwrap();

    let conversations = h.service.conversations_for("alice").await.unwrap();

    let entries: Vec<(String, ConversationKind)> = conversations
        .into_iter()
        .map(|c| (c.name, c.kind))
        .collect();

    // Rooms are visible to everyone; the only DM is alice's own, named
    // after the peer. Most recent activity sorts first.
    assert_eq!(
        entries,
        vec![
            ("bob".to_string(), ConversationKind::Dm),
            ("general".to_string(), ConversationKind::Room),
        ]
    );
}

#[tokio::test]
async fn send_page_targets_the_requesting_socket() {
    let h = harness(test_chat_settings());
    seed_room(&h, "general", 3).await;

    let key = ConversationKey::room("general");
    h.service.send_page("s-9", &key, 1, 10, 0).await.unwrap();

    let page_events: Vec<_> = h
        .bus
        .events()
        .into_iter()
        .filter_map(|e| match e {
            FanoutEvent::PreviousMessages(p) => Some(p),
            _ => None,
        })
        .collect();

    assert_eq!(page_events.len(), 1);
    assert_eq!(page_events[0].socket_id, "s-9");
    assert_eq!(page_events[0].total_messages, 3);
    assert_eq!(page_events[0].messages.len(), 3);
}

#[tokio::test]
async fn typing_and_refresh_directives_pass_through() {
    let h = harness(test_chat_settings());

    h.service.notify_typing("alice", "general").await.unwrap();
    h.service.force_token_refresh("s-1").await.unwrap();

    assert_eq!(h.bus.channels(), vec!["typing", "refreshToken"]);
}
