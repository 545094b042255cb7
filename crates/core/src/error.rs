// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for fls-core operations.

use thiserror::Error;

/// All possible errors that can occur in fls-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("queued action not found: {0}")]
    ActionNotFound(i64),

    #[error("invalid connection status: '{0}'\n  hint: valid statuses are: disconnected, connecting, connected, reconnecting")]
    InvalidConnectionStatus(String),

    #[error("invalid sync status: '{0}'\n  hint: valid statuses are: synced, syncing, pending, error")]
    InvalidSyncStatus(String),

    #[error("invalid entity kind: '{0}'\n  hint: valid kinds are: card, step, department")]
    InvalidEntityKind(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for fls-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
