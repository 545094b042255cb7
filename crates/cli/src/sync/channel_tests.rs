// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the real-time channel manager.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fls_core::protocol::{ClientMessage, ServerMessage};
use fls_core::{CacheKey, ConnectionStatus};
use serde_json::{json, Value};
use yare::parameterized;

use super::channel::{ChannelConfig, ChannelError, RealtimeChannel};
use super::state::{ConnectionState, StateChange};
use super::test_helpers::{eventually, wait_for_status, within, MockConnector, RecordingCache};
use super::transport::TransportError;

struct Harness {
    channel: RealtimeChannel<MockConnector>,
    connector: MockConnector,
    state: Arc<ConnectionState>,
    cache: Arc<RecordingCache>,
}

fn harness_with_delays(delays: Vec<Duration>) -> Harness {
    let connector = MockConnector::new();
    let state = Arc::new(ConnectionState::new());
    let cache = Arc::new(RecordingCache::default());
    let config = ChannelConfig::new("ws://mock/hub").with_delays(delays);
    let channel = RealtimeChannel::new(config, connector.clone(), Arc::clone(&state), cache.clone());
    Harness {
        channel,
        connector,
        state,
        cache,
    }
}

fn harness() -> Harness {
    harness_with_delays(vec![Duration::ZERO, Duration::from_millis(10)])
}

fn connection_changes(rx: &mut tokio::sync::mpsc::UnboundedReceiver<StateChange>) -> Vec<ConnectionStatus> {
    let mut out = Vec::new();
    while let Ok(change) = rx.try_recv() {
        if let StateChange::Connection(status) = change {
            out.push(status);
        }
    }
    out
}

fn joins(sent: &[ClientMessage]) -> usize {
    sent.iter()
        .filter(|m| matches!(m, ClientMessage::JoinGroup { .. }))
        .count()
}

#[parameterized(
    first = { 1, 0 },
    second = { 2, 2_000 },
    third = { 3, 5_000 },
    fourth = { 4, 10_000 },
    fifth = { 5, 30_000 },
    beyond_schedule = { 12, 30_000 },
)]
fn default_reconnect_schedule(attempt: usize, expected_ms: u64) {
    let config = ChannelConfig::new("ws://x");
    assert_eq!(config.delay_for(attempt), Duration::from_millis(expected_ms));
}

#[test]
fn empty_schedule_retries_immediately() {
    let config = ChannelConfig::new("ws://x").with_delays(Vec::new());
    assert_eq!(config.delay_for(3), Duration::ZERO);
}

#[tokio::test]
async fn connect_moves_through_connecting_to_connected() {
    let h = harness();
    let mut rx = h.state.subscribe();

    h.channel.connect("token").await.unwrap();

    assert_eq!(h.channel.status(), ConnectionStatus::Connected);
    assert_eq!(
        connection_changes(&mut rx),
        vec![ConnectionStatus::Connecting, ConnectionStatus::Connected]
    );
}

#[tokio::test]
async fn connect_without_credential_is_rejected() {
    let h = harness();

    let err = h.channel.connect("  ").await.unwrap_err();

    assert!(matches!(err, ChannelError::MissingCredential));
    assert_eq!(h.connector.attempts(), 0);
    assert_eq!(h.channel.status(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn connect_failure_is_surfaced_and_leaves_disconnected() {
    let h = harness();
    h.connector.fail_next_n(1);
    let mut rx = h.state.subscribe();

    let err = h.channel.connect("token").await.unwrap_err();

    assert!(matches!(err, ChannelError::Transport(TransportError::ConnectionFailed(_))));
    assert_eq!(
        connection_changes(&mut rx),
        vec![ConnectionStatus::Connecting, ConnectionStatus::Disconnected]
    );
}

#[tokio::test]
async fn connect_is_idempotent_while_connected() {
    let h = harness();
    h.channel.connect("token").await.unwrap();
    h.channel.connect("token").await.unwrap();

    assert_eq!(h.connector.attempts(), 1);
    assert_eq!(h.channel.status(), ConnectionStatus::Connected);
}

#[tokio::test]
async fn join_while_disconnected_is_ignored() {
    let h = harness();

    h.channel.join_group("dept-1").await.unwrap();
    h.channel.leave_group("dept-1").await.unwrap();
    h.channel.invoke("Ping", json!({})).await.unwrap();

    assert!(h.connector.sent().is_empty());
    assert_eq!(h.state.current_group(), None);
}

#[tokio::test]
async fn joining_a_new_group_leaves_the_old_one() {
    let h = harness();
    h.channel.connect("token").await.unwrap();

    h.channel.join_group("dept-1").await.unwrap();
    h.channel.join_group("dept-2").await.unwrap();

    assert_eq!(
        h.connector.sent(),
        vec![
            ClientMessage::join("dept-1"),
            ClientMessage::leave("dept-1"),
            ClientMessage::join("dept-2"),
        ]
    );
    assert_eq!(h.state.current_group().as_deref(), Some("dept-2"));
}

#[tokio::test]
async fn leave_clears_the_current_group() {
    let h = harness();
    h.channel.connect("token").await.unwrap();
    h.channel.join_group("dept-1").await.unwrap();

    h.channel.leave_group("dept-1").await.unwrap();

    assert_eq!(h.state.current_group(), None);
    assert_eq!(h.connector.sent().last(), Some(&ClientMessage::leave("dept-1")));
}

#[tokio::test]
async fn reconnect_rejoins_the_active_group() {
    let h = harness();
    h.channel.connect("token").await.unwrap();
    h.channel.join_group("dept-1").await.unwrap();
    let mut rx = h.state.subscribe();

    h.connector.drop_connection();
    eventually(|| h.connector.attempts() == 2).await;
    wait_for_status(&h.state, ConnectionStatus::Connected).await;

    assert_eq!(
        connection_changes(&mut rx),
        vec![ConnectionStatus::Reconnecting, ConnectionStatus::Connected]
    );
    let sent = h.connector.sent();
    assert_eq!(joins(&sent), 2);
    assert_eq!(sent.last(), Some(&ClientMessage::join("dept-1")));
    assert_eq!(h.state.current_group().as_deref(), Some("dept-1"));
    assert_eq!(h.connector.attempts(), 2);
}

#[tokio::test]
async fn reconnect_keeps_trying_through_failures() {
    let h = harness();
    h.channel.connect("token").await.unwrap();
    h.connector.fail_next_n(3);

    h.connector.fail_live(TransportError::ReceiveFailed("reset".into()));
    eventually(|| h.connector.attempts() == 5).await;
    wait_for_status(&h.state, ConnectionStatus::Connected).await;

    // Events flow on the new connection.
    h.connector.push(ServerMessage::event("OrderCreated", json!({})));
    eventually(|| h.cache.keys() == vec![CacheKey::Orders, CacheKey::Cards]).await;
}

#[tokio::test]
async fn server_error_is_fatal() {
    let h = harness();
    h.channel.connect("token").await.unwrap();
    h.channel.join_group("dept-1").await.unwrap();

    h.connector.push(ServerMessage::error("session expired"));
    wait_for_status(&h.state, ConnectionStatus::Disconnected).await;

    assert_eq!(h.state.current_group(), None);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(h.connector.attempts(), 1);
}

#[tokio::test]
async fn refused_credential_stops_reconnecting() {
    let h = harness();
    h.channel.connect("token").await.unwrap();
    h.connector.fail_next(TransportError::Unauthorized("401".into()));

    h.connector.drop_connection();
    eventually(|| h.connector.attempts() == 2).await;
    wait_for_status(&h.state, ConnectionStatus::Disconnected).await;

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(h.connector.attempts(), 2);
}

#[tokio::test]
async fn fresh_connect_after_fatal_close() {
    let h = harness();
    h.channel.connect("token").await.unwrap();
    h.connector.push(ServerMessage::error("kicked"));
    wait_for_status(&h.state, ConnectionStatus::Disconnected).await;

    h.channel.connect("token").await.unwrap();
    assert_eq!(h.channel.status(), ConnectionStatus::Connected);
}

#[tokio::test]
async fn domain_events_invalidate_cache() {
    let cases = [
        ("CardCreated", vec![CacheKey::Cards]),
        ("CardCompleted", vec![CacheKey::Cards, CacheKey::Orders]),
        ("OrderCompleted", vec![CacheKey::Orders, CacheKey::Cards]),
    ];
    for (name, expected) in cases {
        let h = harness();
        h.channel.connect("token").await.unwrap();

        h.connector.push(ServerMessage::event(name, json!({ "id": "c1" })));

        eventually(|| h.cache.keys() == expected).await;
    }
}

#[tokio::test]
async fn undecodable_message_keeps_the_session() {
    let h = harness();
    h.channel.connect("token").await.unwrap();
    h.channel.join_group("line-1").await.unwrap();
    let mut changes = h.state.subscribe();

    h.connector
        .fail_live(TransportError::SerializationError("unknown variant `digest`".into()));
    h.connector.push(ServerMessage::event("CardCreated", json!({ "id": "c1" })));

    eventually(|| h.cache.keys() == vec![CacheKey::Cards]).await;
    assert_eq!(h.channel.status(), ConnectionStatus::Connected);
    assert_eq!(h.connector.attempts(), 1);
    assert_eq!(joins(&h.connector.sent()), 1);
    assert!(connection_changes(&mut changes).is_empty());
}

#[tokio::test]
async fn handlers_receive_events_until_removed() {
    let h = harness();
    let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
    let id = {
        let seen = Arc::clone(&seen);
        h.channel
            .on("CardStarted", move |data| seen.lock().unwrap().push(data.clone()))
    };
    let other = Arc::new(AtomicUsize::new(0));
    {
        let other = Arc::clone(&other);
        h.channel.on("Unrelated", move |_| {
            other.fetch_add(1, Ordering::SeqCst);
        });
    }
    h.channel.connect("token").await.unwrap();

    h.connector.push(ServerMessage::event("CardStarted", json!({ "cardId": "c1" })));
    eventually(|| seen.lock().unwrap().len() == 1).await;
    assert_eq!(seen.lock().unwrap()[0]["cardId"], "c1");

    assert!(h.channel.off(id));
    assert!(!h.channel.off(id));

    h.connector.push(ServerMessage::event("CardStarted", json!({ "cardId": "c2" })));
    h.connector.push(ServerMessage::event("Unrelated", json!(null)));
    eventually(|| other.load(Ordering::SeqCst) == 1).await;
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(h.cache.keys(), vec![CacheKey::Cards, CacheKey::Cards]);
}

#[tokio::test]
async fn invoke_sends_when_connected() {
    let h = harness();
    h.channel.connect("token").await.unwrap();

    h.channel
        .invoke("CardStarted", json!({ "group": "dept-1" }))
        .await
        .unwrap();

    assert_eq!(
        h.connector.sent(),
        vec![ClientMessage::invoke("CardStarted", json!({ "group": "dept-1" }))]
    );
}

#[tokio::test]
async fn disconnect_closes_and_clears_group() {
    let h = harness();
    h.channel.connect("token").await.unwrap();
    h.channel.join_group("dept-1").await.unwrap();

    within(h.channel.disconnect()).await;

    assert_eq!(h.channel.status(), ConnectionStatus::Disconnected);
    assert_eq!(h.state.current_group(), None);
    assert_eq!(h.connector.closes(), 1);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(h.connector.attempts(), 1);
}

#[tokio::test]
async fn disconnect_interrupts_reconnect_backoff() {
    let h = harness_with_delays(vec![Duration::from_secs(60)]);
    h.channel.connect("token").await.unwrap();

    h.connector.drop_connection();
    wait_for_status(&h.state, ConnectionStatus::Reconnecting).await;

    within(h.channel.disconnect()).await;

    assert_eq!(h.channel.status(), ConnectionStatus::Disconnected);
    assert_eq!(h.connector.attempts(), 1);
}
