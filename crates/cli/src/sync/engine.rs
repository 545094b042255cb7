// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Execute-or-queue submission and ordered replay of the durable queue.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use fls_core::{CardAction, QueuedAction, Store, SyncStatus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::cache::QueryCache;
use super::registry::Registry;
use super::state::ConnectionState;

/// Retries granted to an action before it is evicted.
pub const MAX_RETRIES: u32 = 3;

/// Errors from queue operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("cannot process the queue while offline")]
    Offline,

    #[error("a queue pass is already running")]
    Busy,

    #[error(transparent)]
    Store(#[from] fls_core::Error),

    #[error("could not encode payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Tenant and user that newly queued actions are tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub tenant_id: String,
    pub user_id: String,
}

impl Session {
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Session {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Outcome of [`SyncQueue::execute_or_queue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub executed_immediately: bool,
    /// Store id when the action was queued instead.
    pub queued_id: Option<i64>,
}

/// Counts from one replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub processed: usize,
    pub failed: usize,
}

/// Clears the in-flight flag when a pass ends, however it ends.
struct PassGuard<'a>(&'a AtomicBool);

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The sync queue engine.
///
/// Generic over the payload type so the engine never needs to know the
/// action variants; payloads are stored as JSON and decoded at replay.
pub struct SyncQueue<P = CardAction> {
    store: Mutex<Store>,
    state: Arc<ConnectionState>,
    registry: Registry<P>,
    cache: Arc<dyn QueryCache>,
    session: Mutex<Session>,
    processing: AtomicBool,
    /// Bumped on every enqueue so auto sync can tell new work from old.
    enqueued: AtomicU64,
    max_retries: u32,
}

impl<P> SyncQueue<P>
where
    P: Serialize + DeserializeOwned + Send + 'static,
{
    /// Build the engine and seed the pending count from the store.
    pub fn new(
        store: Store,
        state: Arc<ConnectionState>,
        registry: Registry<P>,
        cache: Arc<dyn QueryCache>,
        session: Session,
    ) -> Result<Self, SyncError> {
        let pending = store.count()?;
        state.set_pending_actions(pending);
        Ok(SyncQueue {
            store: Mutex::new(store),
            state,
            registry,
            cache,
            session: Mutex::new(session),
            processing: AtomicBool::new(false),
            enqueued: AtomicU64::new(0),
            max_retries: MAX_RETRIES,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> &Arc<ConnectionState> {
        &self.state
    }

    pub fn session(&self) -> Session {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the session used to tag newly queued actions.
    pub fn set_session(&self, session: Session) {
        tracing::info!(tenant = %session.tenant_id, user = %session.user_id, "session changed");
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Run the action now when online, otherwise queue it.
    ///
    /// A failed immediate run falls back to queueing, so the action is never
    /// dropped. Only a failure to record it durably is returned as an error.
    pub async fn execute_or_queue(&self, kind: &str, payload: P) -> Result<Submission, SyncError> {
        let value = serde_json::to_value(&payload)?;

        if self.state.is_online() {
            match self.registry.resolve(kind) {
                Some(executor) => match executor.execute(payload).await {
                    Ok(()) => {
                        tracing::info!(kind, "action executed");
                        self.invalidate(kind);
                        return Ok(Submission {
                            executed_immediately: true,
                            queued_id: None,
                        });
                    }
                    Err(e) => tracing::warn!(kind, error = %e, "immediate execution failed, queueing"),
                },
                None => tracing::warn!(kind, "no executor registered, queueing"),
            }
        }

        let id = self.enqueue(kind, &value)?;
        Ok(Submission {
            executed_immediately: false,
            queued_id: Some(id),
        })
    }

    fn enqueue(&self, kind: &str, payload: &serde_json::Value) -> Result<i64, SyncError> {
        let session = self.session();
        let (id, count) = {
            let store = self.store();
            let id = store.enqueue(kind, payload, &session.tenant_id, &session.user_id)?;
            (id, store.count()?)
        };
        self.enqueued.fetch_add(1, Ordering::AcqRel);
        self.state.set_pending_actions(count);
        tracing::info!(id, kind, pending = count, "action queued");
        Ok(id)
    }

    /// Replay queued actions in order.
    ///
    /// Stops at the first action that fails with retries left, so nothing
    /// behind it runs first. Actions out of retries, with no executor, or
    /// with an undecodable payload are evicted and counted as failed.
    pub async fn process_queue(&self) -> Result<ProcessReport, SyncError> {
        if !self.state.is_online() {
            return Err(SyncError::Offline);
        }
        let _guard = PassGuard::acquire(&self.processing).ok_or(SyncError::Busy)?;

        self.state.set_sync_status(SyncStatus::Syncing);
        let mut report = ProcessReport::default();

        let result = self.replay(&mut report).await.and_then(|()| {
            let remaining = self.store().count()?;
            Ok(remaining)
        });

        let remaining = match result {
            Ok(remaining) => remaining,
            Err(e) => {
                self.state.set_sync_status(SyncStatus::Error);
                return Err(e);
            }
        };

        self.state.set_pending_actions(remaining);
        let status = if remaining == 0 {
            SyncStatus::Synced
        } else if report.failed > 0 {
            SyncStatus::Error
        } else {
            SyncStatus::Pending
        };
        self.state.set_sync_status(status);

        tracing::info!(
            processed = report.processed,
            failed = report.failed,
            remaining,
            "queue pass finished"
        );
        Ok(report)
    }

    async fn replay(&self, report: &mut ProcessReport) -> Result<(), SyncError> {
        let entries = self.store().entries()?;

        for entry in entries {
            let id = entry.id;
            let kind = entry.kind;

            let raw = match entry.action {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!(id, kind = %kind, error = %e, "unreadable queue row, evicting action");
                    self.evict(id)?;
                    report.failed += 1;
                    continue;
                }
            };

            let Some(executor) = self.registry.resolve(&kind) else {
                tracing::error!(id, kind = %kind, "no executor registered, evicting action");
                self.evict(id)?;
                report.failed += 1;
                continue;
            };

            let action: QueuedAction<P> = match raw.map_payload(serde_json::from_value) {
                Ok(action) => action,
                Err(e) => {
                    tracing::error!(id, kind = %kind, error = %e, "undecodable payload, evicting action");
                    self.evict(id)?;
                    report.failed += 1;
                    continue;
                }
            };

            match executor.execute(action.payload).await {
                Ok(()) => {
                    self.evict(id)?;
                    report.processed += 1;
                    self.invalidate(&kind);
                    tracing::debug!(id, kind = %kind, "action replayed");
                }
                Err(e) if action.retry_count >= self.max_retries => {
                    tracing::error!(
                        id,
                        kind = %kind,
                        retries = action.retry_count,
                        last_error = action.last_error.as_deref().unwrap_or(""),
                        error = %e,
                        "action exhausted retries, evicting"
                    );
                    self.evict(id)?;
                    report.failed += 1;
                }
                Err(e) => {
                    let retry_count = action.retry_count + 1;
                    tracing::warn!(id, kind = %kind, retry_count, error = %e, "action failed, retrying on a later pass");
                    self.store()
                        .update_retry(id, retry_count, Some(&e.to_string()))?;
                    break;
                }
            }
        }
        Ok(())
    }

    /// Remove an action and publish the new queue length.
    fn evict(&self, id: i64) -> Result<(), SyncError> {
        let count = {
            let store = self.store();
            store.remove(id)?;
            store.count()?
        };
        self.state.set_pending_actions(count);
        Ok(())
    }

    fn invalidate(&self, kind: &str) {
        for key in self.registry.invalidations(kind) {
            self.cache.invalidate(*key);
        }
    }

    /// Every queued action in replay order.
    pub fn pending(&self) -> Result<Vec<QueuedAction>, SyncError> {
        Ok(self.store().dequeue_all()?)
    }

    /// Drop every queued action. Only for explicit resets such as logout.
    pub fn clear(&self) -> Result<(), SyncError> {
        self.store().clear()?;
        self.state.set_pending_actions(0);
        self.state.set_sync_status(SyncStatus::Synced);
        tracing::info!("queue cleared");
        Ok(())
    }

    /// Replay automatically until `cancel` fires.
    ///
    /// A pass starts whenever the device is online with work queued and
    /// either reachability changed, an action was queued, or `recheck`
    /// elapsed. Actions queued while a pass runs get a follow-up pass. A pass
    /// in progress always runs to completion.
    pub async fn run_auto_sync(&self, cancel: CancellationToken, recheck: Option<Duration>) {
        let mut changes = self.state.subscribe();
        let mut ticker = recheck.map(|period| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.reset();
            ticker
        });

        let mut last_seen = self.auto_drain().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                change = changes.recv() => {
                    if change.is_none() {
                        break;
                    }
                    if last_seen != Some(self.trigger_inputs()) {
                        last_seen = self.auto_drain().await;
                    }
                }
                _ = tick(&mut ticker) => {
                    last_seen = self.auto_drain().await;
                }
            }
        }
        tracing::debug!("auto sync stopped");
    }

    /// Reachability and the enqueue generation.
    fn trigger_inputs(&self) -> (bool, u64) {
        (self.state.is_online(), self.enqueued.load(Ordering::Acquire))
    }

    /// Pass until one starts and ends with the same inputs.
    ///
    /// Returns the inputs the last pass saw, or `None` when another pass
    /// held the queue and this one was skipped.
    async fn auto_drain(&self) -> Option<(bool, u64)> {
        loop {
            let before = self.trigger_inputs();
            if !self.auto_pass().await {
                return None;
            }
            if self.trigger_inputs() == before {
                return Some(before);
            }
        }
    }

    /// One guarded pass. Returns false only when another pass was running.
    async fn auto_pass(&self) -> bool {
        if !self.state.is_online() || self.state.pending_actions() == 0 {
            return true;
        }
        match self.process_queue().await {
            Ok(report) => tracing::debug!(?report, "auto sync pass"),
            Err(SyncError::Busy) => {
                tracing::debug!("auto sync skipped, pass already running");
                return false;
            }
            Err(SyncError::Offline) => tracing::debug!("auto sync skipped, offline"),
            Err(e) => tracing::error!(error = %e, "auto sync pass failed"),
        }
        true
    }
}

impl SyncQueue<CardAction> {
    /// Execute or queue a production-card action under its own type tag.
    pub async fn submit(&self, action: CardAction) -> Result<Submission, SyncError> {
        let kind = action.kind();
        self.execute_or_queue(kind, action).await
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
