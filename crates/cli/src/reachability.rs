// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network reachability for a headless host.
//!
//! There is no OS online/offline signal to subscribe to, so reachability is
//! a TCP connect to the API host, repeated on an interval.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::sync::ConnectionState;

/// Upper bound on a single probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Host and port to probe for `url`, using the scheme's default port.
pub fn probe_target(url: &str) -> Option<(String, u16)> {
    let url = Url::parse(url).ok()?;
    let host = url.host_str()?.to_string();
    let port = url.port_or_known_default()?;
    Some((host, port))
}

/// Whether the host behind `url` accepts TCP connections within `timeout`.
pub async fn probe(url: &str, timeout: Duration) -> bool {
    let Some((host, port)) = probe_target(url) else {
        tracing::warn!(url, "cannot probe URL without host and port");
        return false;
    };
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await,
        Ok(Ok(_))
    )
}

/// Probe once and publish the result.
pub async fn refresh(state: &ConnectionState, url: &str) -> bool {
    let online = probe(url, PROBE_TIMEOUT).await;
    state.set_online(online);
    online
}

/// Probe `url` every `interval` until `cancel` fires.
pub fn spawn_monitor(
    state: Arc<ConnectionState>,
    url: String,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    refresh(&state, &url).await;
                }
            }
        }
        tracing::debug!("reachability monitor stopped");
    })
}

#[cfg(test)]
#[path = "reachability_tests.rs"]
mod tests;
