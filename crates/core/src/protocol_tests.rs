// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;

#[test]
fn client_wire_format() {
    assert_eq!(
        ClientMessage::join("dept-1").to_json().unwrap(),
        r#"{"type":"join_group","group":"dept-1"}"#
    );
    assert_eq!(
        ClientMessage::leave("dept-1").to_json().unwrap(),
        r#"{"type":"leave_group","group":"dept-1"}"#
    );
    assert_eq!(
        ClientMessage::ping(7).to_json().unwrap(),
        r#"{"type":"ping","id":7}"#
    );
}

#[test]
fn invoke_roundtrip() {
    let msg = ClientMessage::invoke("CardStarted", json!({"group": "dept-1", "cardId": "c1"}));
    let parsed = ClientMessage::from_json(&msg.to_json().unwrap()).unwrap();
    assert_eq!(msg, parsed);
}

#[test]
fn invoke_args_default_to_null() {
    let parsed = ClientMessage::from_json(r#"{"type":"invoke","method":"Refresh"}"#).unwrap();
    assert_eq!(parsed, ClientMessage::invoke("Refresh", serde_json::Value::Null));
}

#[test]
fn server_event_parses() {
    let parsed =
        ServerMessage::from_json(r#"{"type":"event","name":"CardPaused","data":{"cardId":"c1"}}"#)
            .unwrap();
    assert_eq!(parsed, ServerMessage::event("CardPaused", json!({"cardId": "c1"})));
}

#[test]
fn server_error_roundtrip() {
    let msg = ServerMessage::error("unauthorized");
    let parsed = ServerMessage::from_json(&msg.to_json().unwrap()).unwrap();
    assert_eq!(msg, parsed);
}

#[test]
fn unknown_type_is_rejected() {
    assert!(ServerMessage::from_json(r#"{"type":"snapshot"}"#).is_err());
}
