//! Tests for `SessionRegistry`.
//!
//! These exercise the registry directly, without any sockets. They verify
//! register/unregister semantics, last-connect-wins replacement, cleanup on
//! failed sends, and graceful shutdown behaviour.

use std::sync::Arc;

use depot_events::{SessionMessage, SessionRegistry};

// ---------------------------------------------------------------------------
// Test: new registry starts empty
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_registry_has_zero_sessions() {
    let registry = SessionRegistry::new();

    assert_eq!(registry.count().await, 0);
    assert!(!registry.is_online(1).await);
}

// ---------------------------------------------------------------------------
// Test: register() makes the user online
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_makes_user_online() {
    let registry = SessionRegistry::new();

    let (session_id, _rx) = registry.register(7).await;

    assert_eq!(registry.count().await, 1);
    assert!(registry.is_online(7).await);
    let handle = registry.get(7).await.expect("session should be registered");
    assert_eq!(handle.session_id, session_id);
    assert_eq!(handle.user_id, 7);
}

// ---------------------------------------------------------------------------
// Test: unregister() removes by session id and reports the owner
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unregister_removes_session_and_returns_owner() {
    let registry = SessionRegistry::new();

    let (session_id, _rx) = registry.register(7).await;
    assert_eq!(registry.unregister(session_id).await, Some(7));

    assert_eq!(registry.count().await, 0);
    assert!(registry.get(7).await.is_none());
}

#[tokio::test]
async fn unregister_unknown_id_is_noop() {
    let registry = SessionRegistry::new();

    let _keep = registry.register(7).await;
    assert_eq!(registry.unregister(uuid::Uuid::new_v4()).await, None);

    assert_eq!(registry.count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: a second connect replaces the first; the stale one cannot evict it
// ---------------------------------------------------------------------------

#[tokio::test]
async fn last_connect_wins_and_stale_unregister_keeps_new_session() {
    let registry = SessionRegistry::new();

    let (old_id, mut old_rx) = registry.register(7).await;
    let (new_id, mut new_rx) = registry.register(7).await;
    assert_ne!(old_id, new_id);
    assert_eq!(registry.count().await, 1);

    // The replaced session's queue is ended, so its writer closes the socket.
    assert_eq!(old_rx.recv().await, None);

    // The old connection closing later must not remove the new one.
    assert_eq!(registry.unregister(old_id).await, None);
    assert_eq!(registry.get(7).await.unwrap().session_id, new_id);

    assert!(registry.send_to_user(7, SessionMessage::Ping).await);
    assert_eq!(new_rx.recv().await, Some(SessionMessage::Ping));
}

// ---------------------------------------------------------------------------
// Test: a dropped receiver makes the user offline and is pruned on send
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_send_unregisters_dead_session() {
    let registry = SessionRegistry::new();

    let (_id, rx) = registry.register(7).await;
    drop(rx);

    assert!(!registry.is_online(7).await, "dead session is not online");
    assert!(!registry.send_to_user(7, SessionMessage::Ping).await);
    assert_eq!(registry.count().await, 0, "dead session must be removed");
}

#[tokio::test]
async fn send_to_offline_user_returns_false() {
    let registry = SessionRegistry::new();

    assert!(!registry.send_to_user(99, SessionMessage::Ping).await);
}

// ---------------------------------------------------------------------------
// Test: broadcast()/ping_all() reach live sessions and prune dead ones
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_reaches_live_sessions_and_prunes_dead_ones() {
    let registry = SessionRegistry::new();

    let (_a, mut rx_a) = registry.register(1).await;
    let (_b, mut rx_b) = registry.register(2).await;
    let (_c, rx_c) = registry.register(3).await;
    drop(rx_c);

    assert_eq!(registry.ping_all().await, 2);
    assert_eq!(rx_a.recv().await, Some(SessionMessage::Ping));
    assert_eq!(rx_b.recv().await, Some(SessionMessage::Ping));
    assert_eq!(registry.count().await, 2);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears every session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let registry = SessionRegistry::new();

    let (_a, mut rx1) = registry.register(1).await;
    let (_b, mut rx2) = registry.register(2).await;

    registry.shutdown_all().await;

    assert_eq!(registry.count().await, 0);
    assert_eq!(rx1.recv().await, Some(SessionMessage::Close));
    assert_eq!(rx2.recv().await, Some(SessionMessage::Close));

    // The registry dropped its senders, so the channels are now closed.
    assert!(rx1.recv().await.is_none());
}

#[tokio::test]
async fn clear_forgets_every_session() {
    let registry = SessionRegistry::new();

    let _a = registry.register(1).await;
    let _b = registry.register(2).await;
    registry.clear().await;

    assert_eq!(registry.count().await, 0);
    assert!(!registry.is_online(1).await);
}

// ---------------------------------------------------------------------------
// Test: concurrent registration from independent tasks
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_register_and_unregister_is_consistent() {
    let registry = Arc::new(SessionRegistry::new());

    let mut tasks = Vec::new();
    for user_id in 1..=50 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            let (id, rx) = registry.register(user_id).await;
            if user_id % 2 == 0 {
                registry.unregister(id).await;
            }
            rx
        }));
    }

    let mut receivers = Vec::new();
    for task in tasks {
        receivers.push(task.await.unwrap());
    }

    assert_eq!(registry.count().await, 25);
    assert!(registry.is_online(1).await);
    assert!(!registry.is_online(2).await);
}
