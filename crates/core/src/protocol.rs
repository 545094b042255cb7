// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for the real-time push channel.
//!
//! The protocol is small:
//! - Client joins and leaves named groups and invokes named server methods
//! - Server pushes named events to the groups a connection belongs to

use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe this connection to a group's events.
    JoinGroup { group: String },

    /// Unsubscribe this connection from a group.
    LeaveGroup { group: String },

    /// Call a named server method.
    Invoke {
        method: String,
        #[serde(default)]
        args: serde_json::Value,
    },

    /// Ping message for keepalive.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A named event pushed to this connection.
    Event {
        name: String,
        #[serde(default)]
        data: serde_json::Value,
    },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// Error message. Terminates the session.
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates a JoinGroup message.
    pub fn join(group: impl Into<String>) -> Self {
        ClientMessage::JoinGroup {
            group: group.into(),
        }
    }

    /// Creates a LeaveGroup message.
    pub fn leave(group: impl Into<String>) -> Self {
        ClientMessage::LeaveGroup {
            group: group.into(),
        }
    }

    /// Creates an Invoke message.
    pub fn invoke(method: impl Into<String>, args: serde_json::Value) -> Self {
        ClientMessage::Invoke {
            method: method.into(),
            args,
        }
    }

    /// Creates a Ping message.
    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates an Event message.
    pub fn event(name: impl Into<String>, data: serde_json::Value) -> Self {
        ServerMessage::Event {
            name: name.into(),
            data,
        }
    }

    /// Creates a Pong message.
    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
