//! Unit tests for `WsManager` and its notification sink.
//!
//! These exercise the connection manager directly, without performing any
//! HTTP upgrades.

mod common;

use axum::extract::ws::Message;
use common::World;
use dashshare_api::notifications::{NotificationService, NotificationSink};
use dashshare_api::ws::WsManager;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Connection bookkeeping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_connections() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx1 = manager.add("conn-1".to_string(), 7).await;
    let _rx2 = manager.add("conn-2".to_string(), 7).await;
    let _rx3 = manager.add("conn-3".to_string(), 8).await;
    assert_eq!(manager.connection_count().await, 3);
    assert_eq!(manager.user_connection_count(7).await, 2);

    manager.remove("conn-1").await;
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 2);
    assert_eq!(manager.user_connection_count(7).await, 1);
}

#[tokio::test]
async fn send_to_connection_reports_missing_connections() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), 7).await;

    assert!(manager.send_to_connection("conn-1", Message::Text("hi".into())).await);
    assert!(!manager.send_to_connection("gone", Message::Text("hi".into())).await);
    assert_eq!(rx.recv().await, Some(Message::Text("hi".into())));
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), 1).await;
    let mut rx2 = manager.add("conn-2".to_string(), 2).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(matches!(rx1.recv().await, Some(Message::Close(None))));
    assert!(matches!(rx2.recv().await, Some(Message::Close(None))));
}

#[tokio::test]
async fn ping_all_reaches_every_connection() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), 1).await;

    manager.ping_all().await;

    assert!(matches!(rx.recv().await, Some(Message::Ping(_))));
}

// ---------------------------------------------------------------------------
// Notification push
// ---------------------------------------------------------------------------

fn text_json(message: Message) -> serde_json::Value {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn sink_pushes_to_every_connection_of_the_recipient_only() {
    let w = World::new().await;
    let manager = Arc::new(WsManager::new());
    let mut alice_tab_1 = manager.add("a1".to_string(), w.alice.id).await;
    let mut alice_tab_2 = manager.add("a2".to_string(), w.alice.id).await;
    let mut bob = manager.add("b1".to_string(), w.bob.id).await;

    let service = NotificationService::new(w.store.clone(), manager.clone());
    let dashboard = w.shared_dashboard("Revenue", &[]).await;
    let sent = service
        .send_dashboard_assigned_notification(&dashboard, &[w.alice.id], &w.admin)
        .await
        .unwrap();

    for rx in [&mut alice_tab_1, &mut alice_tab_2] {
        let frame = text_json(rx.recv().await.unwrap());
        assert_eq!(frame["type"], "new_notification");
        assert_eq!(frame["data"]["id"], sent[0].id);
        assert_eq!(frame["data"]["type"], "DASHBOARD_ASSIGNED");
    }
    assert!(bob.try_recv().is_err());
}

#[tokio::test]
async fn push_without_connections_is_silent() {
    let w = World::new().await;
    let manager = WsManager::new();
    let dashboard = w.shared_dashboard("Revenue", &[]).await;
    let sent = w
        .notifications
        .send_dashboard_assigned_notification(&dashboard, &[w.bob.id], &w.admin)
        .await
        .unwrap();

    // Nobody connected: nothing to deliver, nothing to fail.
    manager.send_to_user(w.bob.id, &sent[0]).await;
    assert_eq!(manager.connection_count().await, 0);
}
