// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

use ConnectionStatus::*;

#[parameterized(
    first_connect = { Disconnected, Connecting },
    established = { Connecting, Connected },
    dropped = { Connected, Reconnecting },
    recovered = { Reconnecting, Connected },
    connect_failed = { Connecting, Disconnected },
    fatal_close = { Connected, Disconnected },
    gave_up = { Reconnecting, Disconnected },
    unchanged = { Connected, Connected },
)]
fn allowed_transition(from: ConnectionStatus, to: ConnectionStatus) {
    assert!(from.can_transition_to(to), "{from} -> {to} should be allowed");
}

#[parameterized(
    skip_connecting = { Disconnected, Connected },
    skip_to_reconnecting = { Disconnected, Reconnecting },
    connecting_to_reconnecting = { Connecting, Reconnecting },
    reconnecting_to_connecting = { Reconnecting, Connecting },
    connected_to_connecting = { Connected, Connecting },
)]
fn rejected_transition(from: ConnectionStatus, to: ConnectionStatus) {
    assert!(!from.can_transition_to(to), "{from} -> {to} should be rejected");
}

#[test]
fn valid_targets_agree_with_transitions() {
    for from in [Disconnected, Connecting, Connected, Reconnecting] {
        for to in from.valid_targets() {
            assert!(from.can_transition_to(*to));
        }
    }
}

#[parameterized(
    disconnected = { "disconnected", Disconnected },
    connecting = { "connecting", Connecting },
    connected = { "CONNECTED", Connected },
    reconnecting = { "reconnecting", Reconnecting },
)]
fn connection_status_from_str(input: &str, expected: ConnectionStatus) {
    assert_eq!(input.parse::<ConnectionStatus>().unwrap(), expected);
}

#[test]
fn connection_status_from_str_invalid() {
    let err = "open".parse::<ConnectionStatus>().unwrap_err();
    assert!(matches!(err, Error::InvalidConnectionStatus(_)));
}

#[parameterized(
    synced = { "synced", SyncStatus::Synced },
    syncing = { "syncing", SyncStatus::Syncing },
    pending = { "Pending", SyncStatus::Pending },
    error = { "error", SyncStatus::Error },
)]
fn sync_status_from_str(input: &str, expected: SyncStatus) {
    assert_eq!(input.parse::<SyncStatus>().unwrap(), expected);
    assert_eq!(expected.to_string(), input.to_lowercase());
}

#[test]
fn defaults() {
    assert_eq!(ConnectionStatus::default(), Disconnected);
    assert_eq!(SyncStatus::default(), SyncStatus::Synced);
}

#[test]
fn serde_uses_snake_case() {
    let json = serde_json::to_string(&Reconnecting).unwrap();
    assert_eq!(json, "\"reconnecting\"");
    let status: SyncStatus = serde_json::from_str("\"syncing\"").unwrap();
    assert_eq!(status, SyncStatus::Syncing);
}
