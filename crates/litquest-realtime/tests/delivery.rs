//! End-to-end delivery tests over the in-memory store.

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use litquest_core::config::RealtimeConfig;
use litquest_database::MemoryNotificationStore;
use litquest_entity::notification::{NotificationFilter, NotificationInput, NotificationKind};
use litquest_entity::user::UserRole;
use litquest_realtime::channel::registry::ChannelRegistry;
use litquest_realtime::connection::manager::ConnectionManager;
use litquest_realtime::coordinator::DeliveryCoordinator;
use litquest_realtime::dispatcher::FanoutDispatcher;
use litquest_realtime::message::events::ServerEvent;
use litquest_service::context::RequestContext;
use litquest_service::notification::NotificationService;

struct Harness {
    manager: Arc<ConnectionManager>,
    dispatcher: Arc<FanoutDispatcher>,
    coordinator: DeliveryCoordinator,
    service: Arc<NotificationService>,
}

fn harness() -> Harness {
    let channels = Arc::new(ChannelRegistry::new());
    let manager = Arc::new(ConnectionManager::new(
        RealtimeConfig {
            max_connections_per_user: 5,
            outbound_buffer_size: 32,
        },
        channels.clone(),
    ));
    let dispatcher = Arc::new(FanoutDispatcher::new(manager.pool().clone(), channels));
    let service = Arc::new(NotificationService::new(Arc::new(
        MemoryNotificationStore::new(),
    )));
    let coordinator = DeliveryCoordinator::new(service.clone(), dispatcher.clone());

    Harness {
        manager,
        dispatcher,
        coordinator,
        service,
    }
}

fn ctx_for(user_id: Uuid) -> RequestContext {
    RequestContext::new(
        user_id,
        "aoi@example.com".to_string(),
        UserRole::Student,
        Uuid::new_v4(),
    )
}

fn input_for(user_id: Uuid) -> NotificationInput {
    NotificationInput::new(
        user_id,
        NotificationKind::AchievementUnlocked,
        "Achievement unlocked",
        "You earned the Speed Reader badge",
    )
}

/// Drains every frame currently queued on a connection's receiver.
fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(serde_json::from_str(&frame).unwrap());
    }
    frames
}

#[tokio::test]
async fn send_reaches_every_device_in_order() {
    let h = harness();
    let user = Uuid::new_v4();

    let (_phone, mut phone_rx) = h.manager.register(user, UserRole::Student);
    let (_laptop, mut laptop_rx) = h.manager.register(user, UserRole::Student);

    let saved = h.coordinator.send(&input_for(user)).await.unwrap();

    for rx in [&mut phone_rx, &mut laptop_rx] {
        let frames = drain(rx);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["event"], "notification:new");
        assert_eq!(
            frames[0]["data"]["notification"]["id"],
            saved.id.to_string()
        );
        assert_eq!(frames[1]["event"], "notification:unread_count");
        assert_eq!(frames[1]["data"]["unreadCount"], 1);
    }
}

#[tokio::test]
async fn offline_recipient_still_gets_a_durable_record() {
    let h = harness();
    let user = Uuid::new_v4();

    let saved = h.coordinator.send(&input_for(user)).await.unwrap();
    assert!(!saved.read);

    let page = h
        .service
        .list(
            &ctx_for(user),
            &NotificationFilter::default(),
            &Default::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].id, saved.id);
}

#[tokio::test]
async fn bulk_send_pushes_one_unread_count_per_recipient() {
    let h = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let (_a, mut alice_rx) = h.manager.register(alice, UserRole::Student);
    let (_b, mut bob_rx) = h.manager.register(bob, UserRole::Student);

    // Alice appears twice in the batch, Bob once.
    let inputs = vec![input_for(alice), input_for(alice), input_for(bob)];
    let saved = h.coordinator.send_bulk(&inputs).await.unwrap();
    assert_eq!(saved.len(), 3);

    let alice_frames = drain(&mut alice_rx);
    let news = alice_frames
        .iter()
        .filter(|f| f["event"] == "notification:new")
        .count();
    let counts: Vec<_> = alice_frames
        .iter()
        .filter(|f| f["event"] == "notification:unread_count")
        .collect();
    assert_eq!(news, 2);
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0]["data"]["unreadCount"], 2);

    let bob_frames = drain(&mut bob_rx);
    let bob_counts: Vec<_> = bob_frames
        .iter()
        .filter(|f| f["event"] == "notification:unread_count")
        .collect();
    assert_eq!(bob_counts.len(), 1);
    assert_eq!(bob_counts[0]["data"]["unreadCount"], 1);
}

#[tokio::test]
async fn mark_read_pushes_ack_and_fresh_count() {
    let h = harness();
    let user = Uuid::new_v4();
    let ctx = ctx_for(user);

    let saved = h.coordinator.send(&input_for(user)).await.unwrap();

    let (_conn, mut rx) = h.manager.register(user, UserRole::Student);
    h.coordinator.mark_read(&ctx, saved.id).await.unwrap();

    let frames = drain(&mut rx);
    assert_eq!(frames[0]["event"], "notification:read");
    assert_eq!(
        frames[0]["data"]["notificationId"],
        saved.id.to_string()
    );
    assert_eq!(frames[0]["data"]["success"], true);
    assert_eq!(frames[1]["event"], "notification:unread_count");
    assert_eq!(frames[1]["data"]["unreadCount"], 0);
}

#[tokio::test]
async fn announcement_reaches_every_connection() {
    let h = harness();

    let (_a, mut rx1) = h.manager.register(Uuid::new_v4(), UserRole::Student);
    let (_b, mut rx2) = h.manager.register(Uuid::new_v4(), UserRole::Teacher);

    h.coordinator
        .announce("Maintenance".to_string(), "Back at 05:00 UTC".to_string());

    for rx in [&mut rx1, &mut rx2] {
        let frames = drain(rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["event"], "system:announcement");
        assert_eq!(frames[0]["data"]["title"], "Maintenance");
    }
}

#[tokio::test]
async fn dead_connection_does_not_block_delivery() {
    let h = harness();
    let user = Uuid::new_v4();

    let (_dead, dead_rx) = h.manager.register(user, UserRole::Student);
    drop(dead_rx);
    let (_live, mut live_rx) = h.manager.register(user, UserRole::Student);

    let saved = h.coordinator.send(&input_for(user)).await.unwrap();

    let frames = drain(&mut live_rx);
    assert_eq!(frames[0]["event"], "notification:new");
    assert_eq!(
        frames[0]["data"]["notification"]["id"],
        saved.id.to_string()
    );
}

#[tokio::test]
async fn gamification_events_reach_only_the_target_user() {
    let h = harness();
    let player = Uuid::new_v4();

    let (_p, mut player_rx) = h.manager.register(player, UserRole::Student);
    let (_o, mut other_rx) = h.manager.register(Uuid::new_v4(), UserRole::Student);

    h.dispatcher.emit_to_user(
        &player,
        &ServerEvent::XpGained {
            amount: 50,
            source: "exercise".to_string(),
            total_xp: 1250,
        },
    );

    let frames = drain(&mut player_rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["event"], "xp:gained");
    assert_eq!(frames[0]["data"]["totalXp"], 1250);
    assert!(drain(&mut other_rx).is_empty());
}

#[tokio::test]
async fn leaderboard_refresh_is_broadcast() {
    let h = harness();

    let (_a, mut rx1) = h.manager.register(Uuid::new_v4(), UserRole::Student);
    let (_b, mut rx2) = h.manager.register(Uuid::new_v4(), UserRole::Teacher);

    h.coordinator
        .publish_leaderboard(serde_json::json!({"season": 3, "entries": []}));

    for rx in [&mut rx1, &mut rx2] {
        let frames = drain(rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["event"], "leaderboard:updated");
        assert_eq!(frames[0]["data"]["leaderboard"]["season"], 3);
    }
}

#[tokio::test]
async fn mutations_by_non_owners_push_nothing() {
    let h = harness();
    let owner = Uuid::new_v4();
    let intruder = ctx_for(Uuid::new_v4());

    let saved = h.coordinator.send(&input_for(owner)).await.unwrap();

    let (_conn, mut rx) = h.manager.register(owner, UserRole::Student);
    assert!(h.coordinator.mark_read(&intruder, saved.id).await.is_err());

    assert!(drain(&mut rx).is_empty());
    assert_eq!(h.coordinator.unread_count_for(owner).await.unwrap(), 1);
}
