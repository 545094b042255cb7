// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hub state shared by every connection.

use std::sync::Arc;

use fls_core::protocol::ServerMessage;
use tokio::sync::broadcast;

/// A message on its way to every connection in `group`, or to all
/// connections when `group` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub group: Option<String>,
    pub message: ServerMessage,
}

/// Shared hub state: the broadcast fanout and the accepted credential.
#[derive(Clone)]
pub struct HubState {
    inner: Arc<HubStateInner>,
}

struct HubStateInner {
    /// Broadcast channel for fanning events out to connections.
    broadcast_tx: broadcast::Sender<Envelope>,
    /// Required bearer token; any non-empty token when unset.
    token: Option<String>,
}

impl HubState {
    pub fn new(token: Option<String>) -> Self {
        // Create broadcast channel with reasonable buffer
        let (broadcast_tx, _) = broadcast::channel(1024);
        HubState {
            inner: Arc::new(HubStateInner {
                broadcast_tx,
                token: token.filter(|t| !t.trim().is_empty()),
            }),
        }
    }

    /// Whether an `Authorization` header value grants access.
    pub fn authorize(&self, header: Option<&str>) -> bool {
        let presented = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .unwrap_or("");
        if presented.is_empty() {
            return false;
        }
        match &self.inner.token {
            Some(expected) => presented == expected,
            None => true,
        }
    }

    /// Fan `message` out to `group`, or to everyone.
    ///
    /// Returns the number of connections that will see it.
    pub fn publish(&self, group: Option<String>, message: ServerMessage) -> usize {
        self.inner
            .broadcast_tx
            .send(Envelope { group, message })
            .unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.inner.broadcast_tx.subscribe()
    }
}
