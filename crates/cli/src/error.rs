// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{ChannelError, SyncError, TransportError};

/// All possible errors that can occur in the flsync library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("offline: the API at {url} is not reachable\n  hint: the action stays queued; run 'floorsync sync' once the network is back")]
    Offline { url: String },

    #[error("no credential: set FLOORSYNC_TOKEN to connect the real-time channel")]
    MissingToken,

    #[error("{field} is required for {action}")]
    FieldRequired {
        field: &'static str,
        action: &'static str,
    },

    #[error("store error: {0}")]
    Store(#[from] fls_core::Error),

    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("real-time channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for flsync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
