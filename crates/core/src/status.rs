// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection and sync status types.
//!
//! [`ConnectionStatus`] is the real-time channel's own lifecycle and is
//! independent of network reachability. [`SyncStatus`] summarises the state
//! of the offline action queue.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Lifecycle of the real-time push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No channel. Initial state, and the state after a fatal close.
    #[default]
    Disconnected,
    /// First connection attempt in flight.
    Connecting,
    /// Channel established.
    Connected,
    /// Channel dropped; automatic re-establishment in progress.
    Reconnecting,
}

impl ConnectionStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Reconnecting => "reconnecting",
        }
    }

    /// Checks whether the channel may move from this status to `next`.
    ///
    /// Establishment always passes through `Connecting` (first connect) or
    /// `Reconnecting` (after a drop). Any status may fall to `Disconnected`.
    pub fn can_transition_to(&self, next: ConnectionStatus) -> bool {
        use ConnectionStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (_, Disconnected)
                | (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connected, Reconnecting)
                | (Reconnecting, Connected)
        )
    }

    /// Returns the statuses reachable from this one (for diagnostics).
    pub fn valid_targets(&self) -> &'static [ConnectionStatus] {
        use ConnectionStatus::*;
        match self {
            Disconnected => &[Connecting],
            Connecting => &[Connected, Disconnected],
            Connected => &[Reconnecting, Disconnected],
            Reconnecting => &[Connected, Disconnected],
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "disconnected" => Ok(ConnectionStatus::Disconnected),
            "connecting" => Ok(ConnectionStatus::Connecting),
            "connected" => Ok(ConnectionStatus::Connected),
            "reconnecting" => Ok(ConnectionStatus::Reconnecting),
            _ => Err(Error::InvalidConnectionStatus(s.to_string())),
        }
    }
}

/// Summary of the offline action queue's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Nothing queued.
    #[default]
    Synced,
    /// A replay pass is running.
    Syncing,
    /// Actions are queued and waiting for a pass.
    Pending,
    /// The last pass evicted at least one action.
    Error,
}

impl SyncStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Pending => "pending",
            SyncStatus::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "synced" => Ok(SyncStatus::Synced),
            "syncing" => Ok(SyncStatus::Syncing),
            "pending" => Ok(SyncStatus::Pending),
            "error" => Ok(SyncStatus::Error),
            _ => Err(Error::InvalidSyncStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
