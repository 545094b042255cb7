// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fls_core::protocol::{ClientMessage, ServerMessage};
use fls_core::{CacheKey, ConnectionStatus};
use tokio::sync::mpsc;

use super::cache::QueryCache;
use super::state::ConnectionState;
use super::transport::{BoxFuture, Connector, Transport, TransportError, TransportResult};

/// Something the mock server pushes down the current connection.
pub enum Incoming {
    Message(ServerMessage),
    Fail(TransportError),
}

#[derive(Default)]
struct Hub {
    attempts: AtomicUsize,
    /// Outcomes for upcoming connect attempts; empty means success.
    scripted: Mutex<VecDeque<TransportError>>,
    sent: Mutex<Vec<ClientMessage>>,
    current: Mutex<Option<mpsc::UnboundedSender<Incoming>>>,
    closes: AtomicUsize,
}

/// Connector that hands out in-memory transports driven by the test.
#[derive(Clone, Default)]
pub struct MockConnector {
    hub: Arc<Hub>,
}

/// Transport half returned by [`MockConnector`].
pub struct MockTransport {
    hub: Arc<Hub>,
    incoming: tokio::sync::Mutex<mpsc::UnboundedReceiver<Incoming>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next connect attempt fail with `err`.
    pub fn fail_next(&self, err: TransportError) {
        self.hub.scripted.lock().unwrap().push_back(err);
    }

    /// Make the next `n` connect attempts fail as unreachable.
    pub fn fail_next_n(&self, n: usize) {
        for _ in 0..n {
            self.fail_next(TransportError::ConnectionFailed("mock refused".into()));
        }
    }

    /// Total connect attempts so far.
    pub fn attempts(&self) -> usize {
        self.hub.attempts.load(Ordering::SeqCst)
    }

    /// Number of times a transport was closed by the client.
    pub fn closes(&self) -> usize {
        self.hub.closes.load(Ordering::SeqCst)
    }

    /// Every message sent on any transport, in order.
    pub fn sent(&self) -> Vec<ClientMessage> {
        self.hub.sent.lock().unwrap().clone()
    }

    /// Push a server message down the live connection.
    pub fn push(&self, msg: ServerMessage) {
        self.deliver(Incoming::Message(msg));
    }

    /// Inject a receive error on the live connection.
    pub fn fail_live(&self, err: TransportError) {
        self.deliver(Incoming::Fail(err));
    }

    /// Drop the live connection as if the network went away.
    pub fn drop_connection(&self) {
        self.hub.current.lock().unwrap().take();
    }

    fn deliver(&self, incoming: Incoming) {
        if let Some(tx) = self.hub.current.lock().unwrap().as_ref() {
            let _ = tx.send(incoming);
        }
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn connect<'a>(
        &'a self,
        _url: &'a str,
        _token: &'a str,
    ) -> BoxFuture<'a, TransportResult<MockTransport>> {
        Box::pin(async move {
            self.hub.attempts.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.hub.scripted.lock().unwrap().pop_front() {
                return Err(err);
            }
            let (tx, rx) = mpsc::unbounded_channel();
            *self.hub.current.lock().unwrap() = Some(tx);
            Ok(MockTransport {
                hub: Arc::clone(&self.hub),
                incoming: tokio::sync::Mutex::new(rx),
            })
        })
    }
}

impl Transport for MockTransport {
    fn send(&self, msg: ClientMessage) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            self.hub.sent.lock().unwrap().push(msg);
            Ok(())
        })
    }

    fn recv(&self) -> BoxFuture<'_, TransportResult<Option<ServerMessage>>> {
        Box::pin(async move {
            match self.incoming.lock().await.recv().await {
                Some(Incoming::Message(msg)) => Ok(Some(msg)),
                Some(Incoming::Fail(err)) => Err(err),
                None => Ok(None),
            }
        })
    }

    fn close(&self) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            self.hub.closes.fetch_add(1, Ordering::SeqCst);
            self.hub.current.lock().unwrap().take();
            Ok(())
        })
    }
}

/// Query cache that records every invalidation.
#[derive(Default)]
pub struct RecordingCache {
    keys: Mutex<Vec<CacheKey>>,
}

impl RecordingCache {
    pub fn keys(&self) -> Vec<CacheKey> {
        self.keys.lock().unwrap().clone()
    }
}

impl QueryCache for RecordingCache {
    fn invalidate(&self, key: CacheKey) {
        self.keys.lock().unwrap().push(key);
    }
}

/// Poll `cond` until it holds, panicking after two seconds.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Wait until the connection status reaches `want`.
pub async fn wait_for_status(state: &ConnectionState, want: ConnectionStatus) {
    eventually(|| state.connection_status() == want).await;
}

/// Run `fut` with a two second ceiling.
pub async fn within<T>(fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), fut)
        .await
        .unwrap()
}
