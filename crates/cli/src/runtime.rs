// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Composition root.
//!
//! Builds one store, one [`ConnectionState`], the engine with its HTTP
//! executors, and the push channel, and wires them together. Nothing in the
//! sync core is a global; tests build as many runtimes as they like.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use fls_core::Store;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Result;
use crate::executors::{card_registry, HttpApi};
use crate::reachability;
use crate::sync::{
    ChannelConfig, ConnectionState, RealtimeChannel, Session, SyncQueue, TracingCache,
    WebSocketConnector,
};

pub struct Runtime {
    config: Config,
    state: Arc<ConnectionState>,
    queue: Arc<SyncQueue>,
    token: Option<String>,
}

impl Runtime {
    /// Open the store at `db_path` and assemble the engine.
    pub fn open(config: Config, db_path: &Path, token: Option<String>) -> Result<Self> {
        let store = Store::open(db_path)?;
        let state = Arc::new(ConnectionState::new());
        let api = Arc::new(HttpApi::new(
            &config.api.base_url,
            Duration::from_secs(config.api.request_timeout_secs),
            token.clone(),
        )?);
        let session = Session::new(&config.session.tenant_id, &config.session.user_id);
        let queue = SyncQueue::new(
            store,
            Arc::clone(&state),
            card_registry(api),
            Arc::new(TracingCache),
            session,
        )?
        .with_max_retries(config.sync.max_retries);

        Ok(Runtime {
            config,
            state,
            queue: Arc::new(queue),
            token,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &Arc<ConnectionState> {
        &self.state
    }

    pub fn queue(&self) -> &SyncQueue {
        &self.queue
    }

    /// Probe the API once and publish reachability.
    pub async fn refresh_online(&self) -> bool {
        reachability::refresh(&self.state, &self.config.api.base_url).await
    }

    pub fn channel(&self) -> RealtimeChannel<WebSocketConnector> {
        let config = ChannelConfig::new(&self.config.realtime.url)
            .with_delays(self.config.realtime.reconnect_delays());
        RealtimeChannel::new(
            config,
            WebSocketConnector,
            Arc::clone(&self.state),
            Arc::new(TracingCache),
        )
    }

    /// Run the sync service until `shutdown` completes.
    ///
    /// A missing or refused credential leaves the push channel down; the
    /// queue keeps working without it.
    pub async fn serve(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let cancel = CancellationToken::new();

        let online = self.refresh_online().await;
        tracing::info!(online, api = %self.config.api.base_url, "floorsync starting");

        let monitor = reachability::spawn_monitor(
            Arc::clone(&self.state),
            self.config.api.base_url.clone(),
            self.config.sync.probe_interval(),
            cancel.clone(),
        );

        let channel = self.channel();
        match &self.token {
            Some(token) => match channel.connect(token).await {
                Ok(()) => {
                    if let Some(group) = &self.config.session.group {
                        if let Err(e) = channel.join_group(group).await {
                            tracing::warn!(group = %group, error = %e, "could not join group");
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "continuing without real-time channel"),
            },
            None => tracing::warn!("no credential set, real-time channel disabled"),
        }

        let auto_sync = tokio::spawn({
            let queue = Arc::clone(&self.queue);
            let cancel = cancel.clone();
            let recheck = self.config.sync.auto_retry_interval();
            async move { queue.run_auto_sync(cancel, recheck).await }
        });

        shutdown.await;
        tracing::info!("shutting down");

        cancel.cancel();
        channel.disconnect().await;
        for (name, task) in [("reachability monitor", monitor), ("auto sync", auto_sync)] {
            if let Err(e) = task.await {
                tracing::warn!(task = name, error = %e, "background task ended abnormally");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
