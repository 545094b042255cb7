// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Real-time push channel.
//!
//! Owns one push connection at a time. After a successful [`connect`], a
//! session task reads server messages, dispatches events, and reconnects on
//! drops following the configured delay schedule. Connection status is
//! published through [`ConnectionState`]; failures inside a live session
//! never surface to callers.
//!
//! [`connect`]: RealtimeChannel::connect

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use fls_core::protocol::{ClientMessage, ServerMessage};
use fls_core::{ConnectionStatus, PushEvent};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::cache::QueryCache;
use super::state::ConnectionState;
use super::transport::{Connector, Transport, TransportError};

/// Default reconnect schedule in milliseconds; the last entry repeats.
pub const RECONNECT_DELAYS_MS: [u64; 5] = [0, 2_000, 5_000, 10_000, 30_000];

/// Errors surfaced by channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("a session credential is required to connect")]
    MissingCredential,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Endpoint and reconnect schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub url: String,
    pub reconnect_delays: Vec<Duration>,
}

impl ChannelConfig {
    pub fn new(url: impl Into<String>) -> Self {
        ChannelConfig {
            url: url.into(),
            reconnect_delays: RECONNECT_DELAYS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }

    pub fn with_delays(mut self, delays: Vec<Duration>) -> Self {
        self.reconnect_delays = delays;
        self
    }

    /// Wait before reconnect attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let index = attempt.saturating_sub(1);
        self.reconnect_delays
            .get(index)
            .or_else(|| self.reconnect_delays.last())
            .copied()
            .unwrap_or_default()
    }
}

/// Identifies a registered event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

struct SessionTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct Inner<C: Connector> {
    config: ChannelConfig,
    connector: C,
    state: Arc<ConnectionState>,
    cache: Arc<dyn QueryCache>,
    handlers: Mutex<HashMap<String, Vec<(HandlerId, Handler)>>>,
    next_handler: AtomicU64,
    transport: Mutex<Option<Arc<C::Transport>>>,
    session: Mutex<Option<SessionTask>>,
    /// Serializes connect and disconnect.
    lifecycle: tokio::sync::Mutex<()>,
}

/// Manages the push connection lifecycle.
pub struct RealtimeChannel<C: Connector> {
    inner: Arc<Inner<C>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<C: Connector> RealtimeChannel<C> {
    pub fn new(
        config: ChannelConfig,
        connector: C,
        state: Arc<ConnectionState>,
        cache: Arc<dyn QueryCache>,
    ) -> Self {
        RealtimeChannel {
            inner: Arc::new(Inner {
                config,
                connector,
                state,
                cache,
                handlers: Mutex::new(HashMap::new()),
                next_handler: AtomicU64::new(1),
                transport: Mutex::new(None),
                session: Mutex::new(None),
                lifecycle: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.state.connection_status()
    }

    pub fn state(&self) -> &Arc<ConnectionState> {
        &self.inner.state
    }

    /// Open the push connection with `token` as the bearer credential.
    ///
    /// Returns immediately if already connected. A fresh call while
    /// reconnecting abandons the old session and starts over.
    pub async fn connect(&self, token: &str) -> Result<(), ChannelError> {
        if token.trim().is_empty() {
            return Err(ChannelError::MissingCredential);
        }
        let _lifecycle = self.inner.lifecycle.lock().await;

        if self.status() == ConnectionStatus::Connected && lock(&self.inner.transport).is_some() {
            return Ok(());
        }

        self.stop_session().await;
        self.inner.state.set_connection_status(ConnectionStatus::Disconnected);
        self.inner.state.set_connection_status(ConnectionStatus::Connecting);

        let transport = match self.inner.connector.connect(&self.inner.config.url, token).await {
            Ok(transport) => Arc::new(transport),
            Err(e) => {
                tracing::warn!(url = %self.inner.config.url, error = %e, "connect failed");
                self.inner.state.set_connection_status(ConnectionStatus::Disconnected);
                return Err(e.into());
            }
        };

        *lock(&self.inner.transport) = Some(Arc::clone(&transport));
        self.inner.state.set_connection_status(ConnectionStatus::Connected);
        tracing::info!(url = %self.inner.config.url, "real-time channel connected");

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_session(
            Arc::clone(&self.inner),
            transport,
            cancel.clone(),
            token.to_string(),
        ));
        *lock(&self.inner.session) = Some(SessionTask { cancel, handle });
        Ok(())
    }

    /// Tear the connection down.
    ///
    /// Always ends `Disconnected` with no group; close errors are logged.
    pub async fn disconnect(&self) {
        let _lifecycle = self.inner.lifecycle.lock().await;
        self.stop_session().await;

        let transport = lock(&self.inner.transport).take();
        if let Some(transport) = transport {
            if let Err(e) = transport.close().await {
                tracing::warn!(error = %e, "error closing real-time channel");
            }
        }
        self.inner.state.set_current_group(None);
        self.inner.state.set_connection_status(ConnectionStatus::Disconnected);
        tracing::info!("real-time channel disconnected");
    }

    async fn stop_session(&self) {
        let task = lock(&self.inner.session).take();
        if let Some(task) = task {
            task.cancel.cancel();
            if let Err(e) = task.handle.await {
                tracing::warn!(error = %e, "session task ended abnormally");
            }
        }
    }

    fn live_transport(&self) -> Option<Arc<C::Transport>> {
        if self.status() != ConnectionStatus::Connected {
            return None;
        }
        lock(&self.inner.transport).clone()
    }

    /// Join `group`, leaving the current one first.
    ///
    /// Ignored with a warning when not connected.
    pub async fn join_group(&self, group: &str) -> Result<(), ChannelError> {
        let Some(transport) = self.live_transport() else {
            tracing::warn!(group, "not connected, ignoring group join");
            return Ok(());
        };

        if let Some(previous) = self.inner.state.current_group() {
            if previous == group {
                return Ok(());
            }
            transport.send(ClientMessage::leave(previous)).await?;
        }
        transport.send(ClientMessage::join(group)).await?;
        self.inner.state.set_current_group(Some(group.to_string()));
        tracing::info!(group, "joined group");
        Ok(())
    }

    /// Leave `group`. Ignored with a warning when not connected.
    pub async fn leave_group(&self, group: &str) -> Result<(), ChannelError> {
        let Some(transport) = self.live_transport() else {
            tracing::warn!(group, "not connected, ignoring group leave");
            return Ok(());
        };

        transport.send(ClientMessage::leave(group)).await?;
        if self.inner.state.current_group().as_deref() == Some(group) {
            self.inner.state.set_current_group(None);
        }
        Ok(())
    }

    /// Call a named server method. Ignored with a warning when not connected.
    pub async fn invoke(&self, method: &str, args: Value) -> Result<(), ChannelError> {
        let Some(transport) = self.live_transport() else {
            tracing::warn!(method, "not connected, ignoring invocation");
            return Ok(());
        };
        transport.send(ClientMessage::invoke(method, args)).await?;
        Ok(())
    }

    /// Register a handler for server events named `event`.
    pub fn on(&self, event: &str, handler: impl Fn(&Value) + Send + Sync + 'static) -> HandlerId {
        let id = HandlerId(self.inner.next_handler.fetch_add(1, Ordering::Relaxed));
        lock(&self.inner.handlers)
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn off(&self, id: HandlerId) -> bool {
        let mut handlers = lock(&self.inner.handlers);
        for list in handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(h, _)| *h == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }
}

impl<C: Connector> Drop for RealtimeChannel<C> {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.inner.session).take() {
            task.cancel.cancel();
        }
    }
}

impl<C: Connector> Inner<C> {
    fn dispatch(&self, name: &str, data: &Value) {
        if let Some(event) = PushEvent::from_name(name) {
            for key in event.invalidates() {
                self.cache.invalidate(*key);
            }
        }

        // Clone out so handlers may register or remove handlers.
        let handlers: Vec<Handler> = lock(&self.handlers)
            .get(name)
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();
        tracing::debug!(event = name, handlers = handlers.len(), "server event");
        for handler in handlers {
            handler(data);
        }
    }

    /// The session cannot continue; stop without reconnecting.
    fn fail(&self) {
        lock(&self.transport).take();
        self.state.set_current_group(None);
        self.state.set_connection_status(ConnectionStatus::Disconnected);
    }

    /// Reconnect until it works, the credential is refused, or `cancel` fires.
    async fn reconnect(
        &self,
        cancel: &CancellationToken,
        token: &str,
    ) -> Option<Arc<C::Transport>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let delay = self.config.delay_for(attempt);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(delay) => {}
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                result = self.connector.connect(&self.config.url, token) => result,
            };

            let transport = match result {
                Ok(transport) => Arc::new(transport),
                Err(TransportError::SerializationError(e)) => {
                tracing::warn!(error = %e, "skipping undecodable server message");
                false
            }
            Err(e) if e.is_fatal() => {
                    tracing::error!(error = %e, "reconnect refused, giving up");
                    self.fail();
                    return None;
                }
                Err(e) => {
                    tracing::warn!(attempt, ?delay, error = %e, "reconnect attempt failed");
                    continue;
                }
            };

            if let Some(group) = self.state.current_group() {
                if let Err(e) = transport.send(ClientMessage::join(group.clone())).await {
                    tracing::warn!(attempt, group = %group, error = %e, "rejoin failed");
                    continue;
                }
            }

            *lock(&self.transport) = Some(Arc::clone(&transport));
            self.state.set_connection_status(ConnectionStatus::Connected);
            tracing::info!(attempt, "real-time channel reconnected");
            return Some(transport);
        }
    }
}

async fn run_session<C: Connector>(
    inner: Arc<Inner<C>>,
    mut transport: Arc<C::Transport>,
    cancel: CancellationToken,
    token: String,
) {
    loop {
        let received = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            received = transport.recv() => received,
        };

        let dropped = match received {
            Ok(Some(ServerMessage::Event { name, data })) => {
                inner.dispatch(&name, &data);
                false
            }
            Ok(Some(ServerMessage::Pong { .. })) => false,
            Ok(Some(ServerMessage::Error { message })) => {
                tracing::error!(message = %message, "server ended the session");
                inner.fail();
                if let Err(e) = transport.close().await {
                    tracing::debug!(error = %e, "close after server error");
                }
                return;
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "session refused");
                inner.fail();
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "connection lost");
                true
            }
            Ok(None) => {
                tracing::warn!("connection closed by server");
                true
            }
        };

        if dropped {
            lock(&inner.transport).take();
            inner.state.set_connection_status(ConnectionStatus::Reconnecting);
            match inner.reconnect(&cancel, &token).await {
                Some(next) => transport = next,
                None => return,
            }
        }
    }
}
