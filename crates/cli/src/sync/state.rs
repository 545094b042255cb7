// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Observable connection and sync state.
//!
//! [`ConnectionState`] is the single source of truth for whether the device
//! is online, how the push channel is doing, and how much work is waiting in
//! the queue. Every setter notifies subscribers only when the value changes,
//! and notifications are sent while the state lock is held so subscribers
//! see changes in the order they were applied.

use std::sync::{Mutex, MutexGuard, PoisonError};

use fls_core::{ConnectionStatus, SyncStatus};
use tokio::sync::mpsc;

/// A point-in-time copy of the shared state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub is_online: bool,
    pub connection_status: ConnectionStatus,
    pub sync_status: SyncStatus,
    pub pending_actions: usize,
    pub current_group: Option<String>,
}

/// A single field change, delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    Online(bool),
    Connection(ConnectionStatus),
    Sync(SyncStatus),
    PendingActions(usize),
    Group(Option<String>),
}

#[derive(Default)]
struct Inner {
    snapshot: Snapshot,
    observers: Vec<mpsc::UnboundedSender<StateChange>>,
}

impl Inner {
    fn notify(&mut self, change: StateChange) {
        self.observers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

/// Shared, observable connection and sync state.
#[derive(Default)]
pub struct ConnectionState {
    inner: Mutex<Inner>,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    /// Subscribe to every subsequent change.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StateChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().observers.push(tx);
        rx
    }

    pub fn is_online(&self) -> bool {
        self.lock().snapshot.is_online
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.lock().snapshot.connection_status
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.lock().snapshot.sync_status
    }

    pub fn pending_actions(&self) -> usize {
        self.lock().snapshot.pending_actions
    }

    pub fn current_group(&self) -> Option<String> {
        self.lock().snapshot.current_group.clone()
    }

    pub fn set_online(&self, online: bool) {
        let mut inner = self.lock();
        if inner.snapshot.is_online != online {
            inner.snapshot.is_online = online;
            tracing::info!(online, "network reachability changed");
            inner.notify(StateChange::Online(online));
        }
    }

    /// Move the push channel to `status`.
    ///
    /// Transitions outside the channel lifecycle are logged but still applied.
    pub fn set_connection_status(&self, status: ConnectionStatus) {
        let mut inner = self.lock();
        let current = inner.snapshot.connection_status;
        if current == status {
            return;
        }
        if !current.can_transition_to(status) {
            tracing::warn!(from = %current, to = %status, "unexpected connection transition");
        } else {
            tracing::debug!(from = %current, to = %status, "connection status");
        }
        inner.snapshot.connection_status = status;
        inner.notify(StateChange::Connection(status));
    }

    pub fn set_sync_status(&self, status: SyncStatus) {
        let mut inner = self.lock();
        if inner.snapshot.sync_status != status {
            inner.snapshot.sync_status = status;
            inner.notify(StateChange::Sync(status));
        }
    }

    /// Record the queue depth and derive the sync status from it.
    ///
    /// An empty queue is always `Synced`. A non-empty queue keeps `Syncing`
    /// and `Error`, and otherwise reads as `Pending`.
    pub fn set_pending_actions(&self, count: usize) {
        let mut inner = self.lock();
        if inner.snapshot.pending_actions != count {
            inner.snapshot.pending_actions = count;
            inner.notify(StateChange::PendingActions(count));
        }
        let derived = match (count, inner.snapshot.sync_status) {
            (0, _) => SyncStatus::Synced,
            (_, s @ (SyncStatus::Syncing | SyncStatus::Error)) => s,
            _ => SyncStatus::Pending,
        };
        if inner.snapshot.sync_status != derived {
            inner.snapshot.sync_status = derived;
            inner.notify(StateChange::Sync(derived));
        }
    }

    pub fn set_current_group(&self, group: Option<String>) {
        let mut inner = self.lock();
        if inner.snapshot.current_group != group {
            inner.snapshot.current_group = group.clone();
            inner.notify(StateChange::Group(group));
        }
    }
}
